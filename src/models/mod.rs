//! Data models for the application.
//!
//! These models represent the entities stored in SQLite and returned by the
//! HTTP API. Row types derive FromRow for SQLx queries.

pub mod pull_request;
pub mod statistics;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{
    NewPullRequest, PullRequest, PullRequestRecord, PullRequestShort, PullRequestStatus,
    Reassignment,
};
pub use statistics::{PrStats, ReviewerStats, Statistics};
pub use team::{Team, TeamMember};
pub use user::User;
