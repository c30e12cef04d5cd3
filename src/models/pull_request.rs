//! Pull request model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a pull request. OPEN -> MERGED happens once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl From<&str> for PullRequestStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MERGED" => Self::Merged,
            _ => Self::Open,
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `pull_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct PullRequestRecord {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    /// `OPEN` or `MERGED`.
    pub status: String,
    /// Creation timestamp (Unix).
    pub created_at: i64,
    /// First merge timestamp (Unix).
    pub merged_at: Option<i64>,
}

impl PullRequestRecord {
    pub fn status_enum(&self) -> PullRequestStatus {
        PullRequestStatus::from(self.status.as_str())
    }

    pub fn is_merged(&self) -> bool {
        self.status_enum() == PullRequestStatus::Merged
    }
}

/// A pull request together with its current reviewer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    pub created_at: i64,
    pub merged_at: Option<i64>,
}

impl PullRequest {
    pub fn from_record(record: PullRequestRecord, assigned_reviewers: Vec<String>) -> Self {
        Self {
            status: record.status_enum(),
            pull_request_id: record.pull_request_id,
            pull_request_name: record.pull_request_name,
            author_id: record.author_id,
            assigned_reviewers,
            created_at: record.created_at,
            merged_at: record.merged_at,
        }
    }
}

/// Input for creating a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// Outcome of a successful reviewer reassignment.
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    /// The reviewer who took over.
    pub replaced_by: String,
}

/// Pull request summary used in per-reviewer listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
}
