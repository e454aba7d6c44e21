use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{DmCreateRequest, DmIdRequest, DmMessagesQuery, DmQuery};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn create(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<DmCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.dm_create(&token, &req.u_ids)?))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.dm_list(&token)?))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<DmQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.dm_details(&token, q.dm_id)?))
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<DmMessagesQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.dm_messages(&token, q.dm_id, q.start)?))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<DmIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.dm_leave(&token, req.dm_id)?;
    Ok(empty())
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<DmQuery>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.dm_remove(&token, q.dm_id)?;
    Ok(empty())
}
