//! Team endpoints.

use super::{required, ApiErr, ApiState};
use crate::models::{Team, TeamMember};
use crate::services::teams;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    #[serde(default)]
    pub team_name: String,
}

#[derive(Debug, Serialize)]
pub struct TeamEnvelope {
    pub team: Team,
}

/// POST /team/add: create a team and upsert its members.
pub async fn add_team(
    State(state): State<ApiState>,
    payload: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(body) = payload?;

    let team_name = required(&body.team_name, "team_name")?;
    let members = body
        .members
        .iter()
        .map(|m| {
            Ok(TeamMember {
                user_id: required(&m.user_id, "user_id")?,
                username: required(&m.username, "username")?,
                is_active: m.is_active,
            })
        })
        .collect::<Result<Vec<_>, ApiErr>>()?;

    let team = teams::add_team(state.db.pool(), &Team { team_name, members }).await?;

    Ok((StatusCode::CREATED, Json(TeamEnvelope { team })))
}

/// GET /team/get?team_name=X: a team and its members.
pub async fn get_team(
    State(state): State<ApiState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<TeamEnvelope>, ApiErr> {
    let Query(params) = query?;
    let team_name = required(&params.team_name, "team_name")?;

    let team = teams::get_team(state.db.pool(), &team_name).await?;

    Ok(Json(TeamEnvelope { team }))
}
