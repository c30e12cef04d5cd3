//! HTTP API handlers.
//!
//! Handlers trim and validate their input, call the engine or one of the
//! thin services, and translate the outcome into a status code and JSON
//! body. Handlers are organized by resource:
//! - `teams`: team upsert and lookup
//! - `users`: activation toggle and review listings
//! - `pull_requests`: create, merge and reassign
//! - `statistics`: reporting

pub mod pull_requests;
pub mod statistics;
pub mod teams;
pub mod users;

use crate::db::Database;
use crate::error::{AppError, ErrorKind};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub db: Database,
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Wrapper to make AppError usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub AppError);

impl ApiErr {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_domain() {
            log::debug!("[http] Request rejected: {}", self.0);
        } else {
            log::error!("[http] Request failed: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody {
                    code: self.0.code(),
                    message: self.0.to_string(),
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

// ── Input helpers ────────────────────────────────────────────────────────────

/// Trim a required string field, rejecting it if nothing is left.
pub(crate) fn required(value: &str, field: &str) -> Result<String, ApiErr> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiErr(AppError::invalid_input_field(
            format!("{} must not be empty", field),
            field,
        )));
    }
    Ok(trimmed.to_string())
}

// ── Route builder ────────────────────────────────────────────────────────────

/// Build the API routes. State is attached by the server.
pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(teams::add_team))
        .route("/team/get", get(teams::get_team))
        .route("/users/setIsActive", post(users::set_is_active))
        .route("/users/getReview", get(users::get_review))
        .route("/pullRequest/create", post(pull_requests::create))
        .route("/pullRequest/merge", post(pull_requests::merge))
        .route("/pullRequest/reassign", post(pull_requests::reassign))
        .route("/statistics", get(statistics::get_statistics))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// GET /health: liveness probe.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}


#[cfg(test)]
mod tests {
    use super::test_support::{get, send, test_app};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  pr-1 ", "pull_request_id").unwrap(), "pr-1");
        assert!(required("   ", "pull_request_id").is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AppError::pr_exists("p"), StatusCode::CONFLICT),
            (AppError::pr_merged("p"), StatusCode::CONFLICT),
            (AppError::reviewer_not_assigned("p", "u"), StatusCode::CONFLICT),
            (AppError::no_replacement_candidate("p"), StatusCode::CONFLICT),
            (AppError::pr_not_found("p"), StatusCode::NOT_FOUND),
            (AppError::author_not_found("u"), StatusCode::NOT_FOUND),
            (AppError::team_not_found("t"), StatusCode::NOT_FOUND),
            (AppError::invalid_input("bad"), StatusCode::BAD_REQUEST),
            (AppError::database("down"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiErr(err).into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = test_app().await;
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_invalid_input() {
        let (app, _db) = test_app().await;
        let request = axum::http::Request::post("/pullRequest/create")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }
}
