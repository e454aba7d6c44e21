use axum::{extract::Request, middleware::Next, response::Response};
use beans_core::CoreError;

use crate::error::ApiError;

/// Raw session token taken from the `token` header.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Require a `token` header and hand it to the handler as an extension.
/// Whether the session is live is decided by the workspace.
pub async fn require_token(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("token")
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CoreError::denied("missing token"))?
        .to_owned();

    req.extensions_mut().insert(SessionToken(token));
    Ok(next.run(req).await)
}
