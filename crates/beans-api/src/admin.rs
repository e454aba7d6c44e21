use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{PermissionChangeRequest, UserQuery};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn user_remove(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.admin_user_remove(&token, q.u_id)?;
    Ok(empty())
}

pub async fn permission_change(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .workspace
        .admin_permission_change(&token, req.u_id, req.permission_id)?;
    Ok(empty())
}
