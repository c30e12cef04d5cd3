//! User endpoints.

use super::{required, ApiErr, ApiState};
use crate::models::{PullRequestShort, User};
use crate::services::users;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SetIsActiveRequest {
    #[serde(default)]
    pub user_id: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

/// POST /users/setIsActive: toggle whether a user can be picked as reviewer.
pub async fn set_is_active(
    State(state): State<ApiState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(body) = payload?;
    let user_id = required(&body.user_id, "user_id")?;

    let user = users::set_is_active(state.db.pool(), &user_id, body.is_active).await?;

    Ok(Json(UserEnvelope { user }))
}

/// GET /users/getReview?user_id=X: pull requests the user reviews.
pub async fn get_review(
    State(state): State<ApiState>,
    query: Result<Query<ReviewQuery>, QueryRejection>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let Query(params) = query?;
    let user_id = required(&params.user_id, "user_id")?;

    let pull_requests = users::get_reviews(state.db.pool(), &user_id).await?;

    Ok(Json(ReviewResponse {
        user_id,
        pull_requests,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_deactivated_user_is_not_assigned() {
        let (app, _db) = test_app().await;
        send(
            &app,
            post_json(
                "/team/add",
                json!({
                    "team_name": "core",
                    "members": [
                        {"user_id": "a", "username": "A", "is_active": true},
                        {"user_id": "b", "username": "B", "is_active": true},
                        {"user_id": "c", "username": "C", "is_active": true}
                    ]
                }),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            post_json("/users/setIsActive", json!({"user_id": "c", "is_active": false})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["user"],
            json!({"user_id": "c", "username": "C", "team_name": "core", "is_active": false})
        );

        let (_, body) = send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": "pr-1", "pull_request_name": "X", "author_id": "a"}),
            ),
        )
        .await;
        assert_eq!(body["pr"]["assigned_reviewers"], json!(["b"]));

        let (status, body) = send(&app, get("/users/getReview?user_id=b")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], "b");
        assert_eq!(
            body["pull_requests"],
            json!([{"pull_request_id": "pr-1", "pull_request_name": "X", "author_id": "a", "status": "OPEN"}])
        );

        let (_, body) = send(&app, get("/users/getReview?user_id=c")).await;
        assert_eq!(body["pull_requests"], json!([]));
    }

    #[tokio::test]
    async fn test_set_is_active_unknown_user() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            post_json("/users/setIsActive", json!({"user_id": "ghost", "is_active": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
