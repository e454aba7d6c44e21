use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{ChannelQuery, StandupSendRequest, StandupStartRequest};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn start(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.standup_start(&token, req.channel_id, req.length)?))
}

pub async fn active(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<ChannelQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.standup_active(&token, q.channel_id)?))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.standup_send(&token, req.channel_id, &req.message)?;
    Ok(empty())
}
