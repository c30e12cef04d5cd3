//! User activation and review listings.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{PullRequestShort, User};

/// Set a user's activity flag.
///
/// Later assignment decisions read the flag fresh, so this takes effect for
/// the next pull request or reassignment without further action.
pub async fn set_is_active(
    pool: &DbPool,
    user_id: &str,
    is_active: bool,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET is_active = ?
        WHERE user_id = ?
        RETURNING user_id, username, team_name, is_active
        "#,
    )
    .bind(is_active)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::user_not_found(user_id))?;

    log::info!("[users] {} is_active={}", user_id, is_active);

    Ok(user)
}

/// Pull requests on which `user_id` is currently a reviewer.
///
/// Unknown users simply have no reviews.
pub async fn get_reviews(pool: &DbPool, user_id: &str) -> Result<Vec<PullRequestShort>, AppError> {
    let prs = sqlx::query_as::<_, PullRequestShort>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        FROM pull_requests pr
        JOIN pr_reviewers prr ON pr.pull_request_id = prr.pull_request_id
        WHERE prr.reviewer_id = ?
        ORDER BY pr.created_at DESC, pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(prs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_is_active() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        sqlx::query("INSERT INTO teams (team_name) VALUES ('core')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (user_id, username, team_name, is_active) VALUES ('u1', 'Ann', 'core', 1)")
            .execute(&pool)
            .await
            .unwrap();

        let user = set_is_active(&pool, "u1", false).await.unwrap();
        assert_eq!(user.team_name, "core");
        assert!(!user.is_active);

        let err = set_is_active(&pool, "nobody", true).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn test_reviews_of_unknown_user_is_empty() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();

        assert!(get_reviews(&pool, "nobody").await.unwrap().is_empty());
    }
}
