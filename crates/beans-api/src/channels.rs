use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{
    ChannelCreateRequest, ChannelIdRequest, ChannelMemberRequest, ChannelMessagesQuery,
    ChannelQuery,
};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn create(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.channels_create(&token, &req.name, req.is_public)?))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.channels_list(&token)?))
}

pub async fn list_all(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.channels_list_all(&token)?))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<ChannelQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.channel_details(&token, q.channel_id)?))
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<ChannelMessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.channel_messages(&token, q.channel_id, q.start)?))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.channel_join(&token, req.channel_id)?;
    Ok(empty())
}

pub async fn invite(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.channel_invite(&token, req.channel_id, req.u_id)?;
    Ok(empty())
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.channel_leave(&token, req.channel_id)?;
    Ok(empty())
}

pub async fn add_owner(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.channel_add_owner(&token, req.channel_id, req.u_id)?;
    Ok(empty())
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ChannelMemberRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.channel_remove_owner(&token, req.channel_id, req.u_id)?;
    Ok(empty())
}
