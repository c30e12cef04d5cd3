//! Application error types.
//!
//! Domain outcomes of the assignment engine and infrastructure failures share
//! one serializable enum so the HTTP boundary can translate them into status
//! codes without string matching.

use serde::Serialize;
use thiserror::Error;

/// Coarse classification used by the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    /// Connectivity, transaction and other storage failures.
    Infrastructure,
}

/// Application-level errors returned by the engine and services.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// A pull request with this id already exists.
    #[error("Pull request already exists: {pr_id}")]
    PrExists { pr_id: String },

    /// The pull request id is unknown.
    #[error("Pull request not found: {pr_id}")]
    PrNotFound { pr_id: String },

    /// The author of a new pull request is not a known user.
    #[error("Author not found: {user_id}")]
    AuthorNotFound { user_id: String },

    /// The user id is unknown.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    /// No team with this name exists.
    #[error("Team not found: {team_name}")]
    TeamNotFound { team_name: String },

    /// The pull request is merged and its reviewers are frozen.
    #[error("Pull request already merged: {pr_id}")]
    PrMerged { pr_id: String },

    /// The reviewer is not assigned to the pull request.
    #[error("Reviewer {reviewer_id} is not assigned to pull request {pr_id}")]
    ReviewerNotAssigned { pr_id: String, reviewer_id: String },

    /// No active team member is left to take over the review.
    #[error("No active replacement candidate for pull request {pr_id}")]
    NoReplacementCandidate { pr_id: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn pr_exists(pr_id: impl Into<String>) -> Self {
        Self::PrExists { pr_id: pr_id.into() }
    }

    pub fn pr_not_found(pr_id: impl Into<String>) -> Self {
        Self::PrNotFound { pr_id: pr_id.into() }
    }

    pub fn author_not_found(user_id: impl Into<String>) -> Self {
        Self::AuthorNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn user_not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn team_not_found(team_name: impl Into<String>) -> Self {
        Self::TeamNotFound {
            team_name: team_name.into(),
        }
    }

    pub fn pr_merged(pr_id: impl Into<String>) -> Self {
        Self::PrMerged { pr_id: pr_id.into() }
    }

    pub fn reviewer_not_assigned(pr_id: impl Into<String>, reviewer_id: impl Into<String>) -> Self {
        Self::ReviewerNotAssigned {
            pr_id: pr_id.into(),
            reviewer_id: reviewer_id.into(),
        }
    }

    pub fn no_replacement_candidate(pr_id: impl Into<String>) -> Self {
        Self::NoReplacementCandidate { pr_id: pr_id.into() }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PrNotFound { .. }
            | Self::AuthorNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::TeamNotFound { .. } => ErrorKind::NotFound,
            Self::PrExists { .. }
            | Self::PrMerged { .. }
            | Self::ReviewerNotAssigned { .. }
            | Self::NoReplacementCandidate { .. } => ErrorKind::Conflict,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Database { .. } | Self::Internal { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Whether this is a domain outcome rather than an infrastructure failure.
    pub fn is_domain(&self) -> bool {
        self.kind() != ErrorKind::Infrastructure
    }

    /// Stable machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PrExists { .. } => "PR_EXISTS",
            Self::PrMerged { .. } => "PR_MERGED",
            Self::ReviewerNotAssigned { .. } => "NOT_ASSIGNED",
            Self::NoReplacementCandidate { .. } => "NO_CANDIDATE",
            Self::PrNotFound { .. }
            | Self::AuthorNotFound { .. }
            | Self::UserNotFound { .. }
            | Self::TeamNotFound { .. } => "NOT_FOUND",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Database { .. } | Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::internal(format!("Configuration error: {}", err))
    }
}
