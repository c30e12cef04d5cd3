//! Read-only reporting over users and pull requests.
//!
//! The queries run independently and without a transaction; the snapshot
//! may mix states from concurrent writes.

use crate::db::pool::DbPool;
use crate::error::AppError;
use crate::models::{PrStats, ReviewerStats, Statistics};

pub async fn get_statistics(pool: &DbPool) -> Result<Statistics, AppError> {
    let reviewers_stats = sqlx::query_as::<_, ReviewerStats>(
        r#"
        SELECT
            u.user_id,
            u.username,
            u.team_name,
            COUNT(DISTINCT pr.pull_request_id) AS total_reviews,
            COUNT(DISTINCT CASE WHEN pr.status = 'OPEN' THEN pr.pull_request_id END) AS open_reviews,
            COUNT(DISTINCT CASE WHEN pr.status = 'MERGED' THEN pr.pull_request_id END) AS merged_reviews
        FROM users u
        LEFT JOIN pr_reviewers prr ON u.user_id = prr.reviewer_id
        LEFT JOIN pull_requests pr ON prr.pull_request_id = pr.pull_request_id
        GROUP BY u.user_id, u.username, u.team_name
        ORDER BY total_reviews DESC, u.user_id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database_with_op(e.to_string(), "reviewer stats"))?;

    let pr_stats = sqlx::query_as::<_, PrStats>(
        r#"
        SELECT
            pr.pull_request_id,
            pr.pull_request_name,
            pr.author_id,
            pr.status,
            COUNT(prr.reviewer_id) AS reviewers_count
        FROM pull_requests pr
        LEFT JOIN pr_reviewers prr ON pr.pull_request_id = prr.pull_request_id
        GROUP BY pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        ORDER BY pr.created_at DESC, pr.pull_request_id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database_with_op(e.to_string(), "pull request stats"))?;

    let total_prs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pull_requests")
        .fetch_one(pool)
        .await?;
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(Statistics {
        total_prs,
        total_users,
        reviewers_stats,
        pr_stats,
    })
}
