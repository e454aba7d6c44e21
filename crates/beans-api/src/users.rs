use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use beans_types::api::{
    SetEmailRequest, SetHandleRequest, SetNameRequest, UploadPhotoRequest, UserQuery,
};
use tracing::info;

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, empty};

pub async fn profile(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Query(q): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.user_profile(&token, q.u_id)?))
}

pub async fn all(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.users_all(&token)?))
}

pub async fn set_name(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.set_name(&token, &req.name_first, &req.name_last)?;
    Ok(empty())
}

pub async fn set_email(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.set_email(&token, &req.email)?;
    Ok(empty())
}

pub async fn set_handle(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.set_handle(&token, &req.handle_str)?;
    Ok(empty())
}

/// Fetch, check and store a profile photo, then point the profile at it.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<UploadPhotoRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = state.workspace.session_user(&token)?;
    let url = state.photos.store(user_id, &req).await?;
    state.workspace.set_profile_img_url(&token, &url)?;
    info!("User {} profile photo set to {}", user_id, url);
    Ok(empty())
}

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.user_stats(&token)?))
}

pub async fn workspace_stats(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.workspace_stats(&token)?))
}

pub async fn notifications(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.workspace.notifications(&token)?))
}
