//! Pull request endpoints.

use super::{required, ApiErr, ApiState};
use crate::models::{NewPullRequest, PullRequest, PullRequestStatus, Reassignment};
use crate::services::assignment;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Request/response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default)]
    pub pull_request_name: String,
    #[serde(default)]
    pub author_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    #[serde(default)]
    pub pull_request_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    #[serde(default)]
    pub pull_request_id: String,
    #[serde(default, alias = "old_reviewer_id")]
    pub old_user_id: String,
}

/// Pull request as rendered over HTTP, with RFC 3339 timestamps.
#[derive(Debug, Serialize)]
pub struct PullRequestResponse {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
    pub assigned_reviewers: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "mergedAt")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<PullRequest> for PullRequestResponse {
    fn from(pr: PullRequest) -> Self {
        Self {
            created_at: DateTime::from_timestamp(pr.created_at, 0),
            merged_at: pr.merged_at.and_then(|ts| DateTime::from_timestamp(ts, 0)),
            pull_request_id: pr.pull_request_id,
            pull_request_name: pr.pull_request_name,
            author_id: pr.author_id,
            status: pr.status,
            assigned_reviewers: pr.assigned_reviewers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PrEnvelope {
    pub pr: PullRequestResponse,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub pr: PullRequestResponse,
    pub replaced_by: String,
}

impl From<Reassignment> for ReassignResponse {
    fn from(reassignment: Reassignment) -> Self {
        Self {
            pr: reassignment.pull_request.into(),
            replaced_by: reassignment.replaced_by,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /pullRequest/create: create a pull request and assign reviewers.
pub async fn create(
    State(state): State<ApiState>,
    payload: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PrEnvelope>), ApiErr> {
    let Json(body) = payload?;
    let new = NewPullRequest {
        pull_request_id: required(&body.pull_request_id, "pull_request_id")?,
        pull_request_name: required(&body.pull_request_name, "pull_request_name")?,
        author_id: required(&body.author_id, "author_id")?,
    };

    let pr = assignment::create_pr(&state.db, new).await?;

    Ok((StatusCode::CREATED, Json(PrEnvelope { pr: pr.into() })))
}

/// POST /pullRequest/merge: mark a pull request as merged (idempotent).
pub async fn merge(
    State(state): State<ApiState>,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PrEnvelope>, ApiErr> {
    let Json(body) = payload?;
    let pr_id = required(&body.pull_request_id, "pull_request_id")?;

    let pr = assignment::merge_pr(&state.db, &pr_id).await?;

    Ok(Json(PrEnvelope { pr: pr.into() }))
}

/// POST /pullRequest/reassign: replace one reviewer.
pub async fn reassign(
    State(state): State<ApiState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<ReassignResponse>, ApiErr> {
    let Json(body) = payload?;
    let pr_id = required(&body.pull_request_id, "pull_request_id")?;
    let old_reviewer_id = required(&body.old_user_id, "old_user_id")?;

    let reassignment = assignment::reassign_reviewer(&state.db, &pr_id, &old_reviewer_id).await?;

    Ok(Json(reassignment.into()))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn seed(app: &axum::Router) {
        let (status, _) = send(
            app,
            post_json(
                "/team/add",
                json!({
                    "team_name": "backend",
                    "members": [
                        {"user_id": "u1", "username": "Alice", "is_active": true},
                        {"user_id": "u2", "username": "Bob", "is_active": true},
                        {"user_id": "u3", "username": "Carol", "is_active": true}
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_merge_reassign_flow() {
        let (app, _db) = test_app().await;
        seed(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": " pr-1 ", "pull_request_name": "Add search", "author_id": "u1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["pr"]["pull_request_id"], "pr-1");
        assert_eq!(body["pr"]["status"], "OPEN");
        let mut reviewers: Vec<String> =
            serde_json::from_value(body["pr"]["assigned_reviewers"].clone()).unwrap();
        reviewers.sort();
        assert_eq!(reviewers, vec!["u2".to_string(), "u3".to_string()]);
        assert!(body["pr"]["createdAt"].is_string());
        assert!(body["pr"]["mergedAt"].is_null());

        // Both teammates are assigned, so nobody is left to take over
        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/reassign",
                json!({"pull_request_id": "pr-1", "old_user_id": "u2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "NO_CANDIDATE");

        let (status, body) =
            send(&app, post_json("/pullRequest/merge", json!({"pull_request_id": "pr-1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pr"]["status"], "MERGED");
        assert!(body["pr"]["mergedAt"].is_string());

        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/reassign",
                json!({"pull_request_id": "pr-1", "old_reviewer_id": "u2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PR_MERGED");
    }

    #[tokio::test]
    async fn test_create_errors() {
        let (app, _db) = test_app().await;
        seed(&app).await;

        let create = json!({"pull_request_id": "pr-1", "pull_request_name": "X", "author_id": "u1"});
        let (status, _) = send(&app, post_json("/pullRequest/create", create.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, post_json("/pullRequest/create", create)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "PR_EXISTS");

        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": "pr-2", "pull_request_name": "X", "author_id": "ghost"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": "  ", "pull_request_name": "X", "author_id": "u1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_merge_unknown_and_reassign_unassigned() {
        let (app, _db) = test_app().await;
        seed(&app).await;

        let (status, body) =
            send(&app, post_json("/pullRequest/merge", json!({"pull_request_id": "nope"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        send(
            &app,
            post_json(
                "/pullRequest/create",
                json!({"pull_request_id": "pr-1", "pull_request_name": "X", "author_id": "u1"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            post_json(
                "/pullRequest/reassign",
                json!({"pull_request_id": "pr-1", "old_user_id": "u1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "NOT_ASSIGNED");
    }
}
