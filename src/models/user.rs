//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A directory user. Team membership is the `team_name` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}
