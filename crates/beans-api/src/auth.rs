use axum::{Extension, Json, extract::State, response::IntoResponse};
use beans_types::api::{LoginRequest, PasswordResetConfirm, PasswordResetRequest, RegisterRequest};

use crate::error::ApiResult;
use crate::middleware::SessionToken;
use crate::{AppState, blocking, empty};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let workspace = state.workspace.clone();
    let auth = blocking(move || workspace.register(&req)).await?;
    Ok(Json(auth))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let workspace = state.workspace.clone();
    let auth = blocking(move || workspace.login(&req.email, &req.password)).await?;
    Ok(Json(auth))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.logout(&token)?;
    Ok(empty())
}

pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<impl IntoResponse> {
    state.workspace.request_password_reset(&req.email)?;
    Ok(empty())
}

pub async fn password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<impl IntoResponse> {
    let workspace = state.workspace.clone();
    blocking(move || workspace.reset_password(&req.reset_code, &req.new_password)).await?;
    Ok(empty())
}

pub async fn clear(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.workspace.clear()?;
    Ok(empty())
}
