//! Directory reads: team membership and activity status.
//!
//! Every function takes a connection so the engine can run it inside the
//! transaction that performs the write. Nothing here is cached.

use sqlx::SqliteConnection;

/// Team of `user_id`, or `None` for an unknown user.
pub async fn team_of(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT team_name FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Ids of the active members of `team_name`.
///
/// Returned in storage order; callers that choose among them must not rely
/// on it.
pub async fn active_members_of(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM users WHERE team_name = ? AND is_active = 1")
        .bind(team_name)
        .fetch_all(&mut *conn)
        .await
}
