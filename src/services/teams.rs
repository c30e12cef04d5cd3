//! Team upsert and lookup.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{Team, TeamMember};

/// Create the team if needed and upsert every member into it.
///
/// Existing users are moved to this team and take the submitted username
/// and activity flag. Runs as one transaction.
pub async fn add_team(pool: &DbPool, team: &Team) -> Result<Team, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO teams (team_name) VALUES (?) ON CONFLICT (team_name) DO NOTHING")
        .bind(&team.team_name)
        .execute(&mut *tx)
        .await?;

    for member in &team.members {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, team_name, is_active)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                username = excluded.username,
                team_name = excluded.team_name,
                is_active = excluded.is_active
            "#,
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(&team.team_name)
        .bind(member.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::database_with_op(e.to_string(), format!("upsert user {}", member.user_id))
        })?;
    }

    tx.commit().await?;

    log::info!(
        "[teams] Upserted team {} with {} members",
        team.team_name,
        team.members.len()
    );

    Ok(team.clone())
}

/// Look up a team and its members, ordered by username.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<Team, AppError> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(pool)
        .await?;

    if exists.is_none() {
        return Err(AppError::team_not_found(team_name));
    }

    let members: Vec<TeamMember> = sqlx::query_as(
        r#"
        SELECT user_id, username, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY username
        "#,
    )
    .bind(team_name)
    .fetch_all(pool)
    .await?;

    Ok(Team {
        team_name: team_name.to_string(),
        members,
    })
}
