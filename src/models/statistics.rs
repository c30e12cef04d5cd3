//! Reporting models.

use serde::Serialize;
use sqlx::FromRow;

/// Review load of one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewerStats {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub total_reviews: i64,
    pub open_reviews: i64,
    pub merged_reviews: i64,
}

/// Reviewer count of one pull request.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PrStats {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub reviewers_count: i64,
}

/// Snapshot returned by the statistics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_prs: i64,
    pub total_users: i64,
    pub reviewers_stats: Vec<ReviewerStats>,
    pub pr_stats: Vec<PrStats>,
}
