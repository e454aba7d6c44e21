use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{
    EditMessageRequest, MessageIdRequest, ReactRequest, SearchQuery, SendDmRequest,
    SendLaterDmRequest, SendLaterRequest, SendMessageRequest, ShareRequest,
};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn send(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.message_send(&token, req.channel_id, &req.message)?))
}

pub async fn send_dm(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendDmRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.message_send_dm(&token, req.dm_id, &req.message)?))
}

pub async fn edit(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_edit(&token, req.message_id, &req.message)?;
    Ok(empty())
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<MessageIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_remove(&token, q.message_id)?;
    Ok(empty())
}

pub async fn react(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_react(&token, req.message_id, req.react_id)?;
    Ok(empty())
}

pub async fn unreact(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_unreact(&token, req.message_id, req.react_id)?;
    Ok(empty())
}

pub async fn pin(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<MessageIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_pin(&token, req.message_id)?;
    Ok(empty())
}

pub async fn unpin(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<MessageIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.message_unpin(&token, req.message_id)?;
    Ok(empty())
}

pub async fn share(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ShareRequest>,
) -> ApiResult<impl IntoResponse> {
    let shared = state.workspace.message_share(
        &token,
        req.og_message_id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?;
    Ok(Json(shared))
}

pub async fn send_later(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<impl IntoResponse> {
    let scheduled =
        state
            .workspace
            .message_send_later(&token, req.channel_id, &req.message, req.time_sent)?;
    Ok(Json(scheduled))
}

pub async fn send_later_dm(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendLaterDmRequest>,
) -> ApiResult<impl IntoResponse> {
    let scheduled =
        state
            .workspace
            .message_send_later_dm(&token, req.dm_id, &req.message, req.time_sent)?;
    Ok(Json(scheduled))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.search(&token, &q.query_str)?))
}
