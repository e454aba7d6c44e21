use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use beans_core::CoreError;
use serde_json::json;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// A `CoreError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    fn as_status_code(&self) -> StatusCode {
        match self.0 {
            CoreError::AccessDenied(_) => StatusCode::FORBIDDEN,
            CoreError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(_) | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(value: CoreError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.as_status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let body = Json(json!({
            "code": status.as_u16(),
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
