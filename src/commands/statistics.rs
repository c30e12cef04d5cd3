//! Statistics endpoint.

use super::{ApiErr, ApiState};
use crate::models::Statistics;
use crate::services::statistics;
use axum::extract::State;
use axum::Json;

/// GET /statistics: review load per user and reviewer counts per PR.
pub async fn get_statistics(State(state): State<ApiState>) -> Result<Json<Statistics>, ApiErr> {
    Ok(Json(statistics::get_statistics(state.db.pool()).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_statistics_counts() {
        let (app, _db) = test_app().await;
        send(
            &app,
            post_json(
                "/team/add",
                json!({
                    "team_name": "core",
                    "members": [
                        {"user_id": "a", "username": "A", "is_active": true},
                        {"user_id": "b", "username": "B", "is_active": true}
                    ]
                }),
            ),
        )
        .await;
        send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": "pr-1", "pull_request_name": "X", "author_id": "a"}),
            ),
        )
        .await;
        send(&app, post_json("/pullRequest/merge", json!({"pull_request_id": "pr-1"}))).await;

        let (status, body) = send(&app, get("/statistics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_prs"], 1);
        assert_eq!(body["total_users"], 2);

        let top = &body["reviewers_stats"][0];
        assert_eq!(top["user_id"], "b");
        assert_eq!(top["total_reviews"], 1);
        assert_eq!(top["merged_reviews"], 1);
        assert_eq!(top["open_reviews"], 0);

        assert_eq!(
            body["pr_stats"],
            json!([{
                "pull_request_id": "pr-1",
                "pull_request_name": "X",
                "author_id": "a",
                "status": "MERGED",
                "reviewers_count": 1
            }])
        );
    }
}
