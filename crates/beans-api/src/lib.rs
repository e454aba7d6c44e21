pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod photos;
pub mod standup;
pub mod users;

use std::sync::Arc;

use axum::{
    Json, Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use beans_core::{CoreError, CoreResult, Workspace};
use serde_json::{Value, json};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::photos::PhotoStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub workspace: Workspace,
    pub photos: Arc<dyn PhotoStore>,
}

/// Body for endpoints with nothing to report.
pub(crate) fn empty() -> Json<Value> {
    Json(json!({}))
}

/// Run a CPU-heavy workspace call (password hashing) off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            CoreError::Internal(anyhow::anyhow!("worker task failed"))
        })?
        .map_err(ApiError::from)
}

/// Every versioned route. Layers (CORS, tracing, static files) are added by
/// the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/clear/v1", delete(auth::clear))
        .route("/auth/register/v3", post(auth::register))
        .route("/auth/login/v3", post(auth::login))
        .route("/auth/passwordreset/request/v1", post(auth::password_reset_request))
        .route("/auth/passwordreset/reset/v1", post(auth::password_reset))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/logout/v2", post(auth::logout))
        // Channels
        .route("/channels/create/v3", post(channels::create))
        .route("/channels/list/v3", get(channels::list))
        .route("/channels/listall/v3", get(channels::list_all))
        .route("/channel/details/v3", get(channels::details))
        .route("/channel/messages/v3", get(channels::messages))
        .route("/channel/join/v3", post(channels::join))
        .route("/channel/invite/v3", post(channels::invite))
        .route("/channel/leave/v2", post(channels::leave))
        .route("/channel/addowner/v2", post(channels::add_owner))
        .route("/channel/removeowner/v2", post(channels::remove_owner))
        // DMs
        .route("/dm/create/v2", post(dms::create))
        .route("/dm/list/v2", get(dms::list))
        .route("/dm/details/v2", get(dms::details))
        .route("/dm/messages/v2", get(dms::messages))
        .route("/dm/leave/v2", post(dms::leave))
        .route("/dm/remove/v2", delete(dms::remove))
        // Messages
        .route("/message/send/v2", post(messages::send))
        .route("/message/senddm/v2", post(messages::send_dm))
        .route("/message/edit/v2", put(messages::edit))
        .route("/message/remove/v2", delete(messages::remove))
        .route("/message/react/v1", post(messages::react))
        .route("/message/unreact/v1", post(messages::unreact))
        .route("/message/pin/v1", post(messages::pin))
        .route("/message/unpin/v1", post(messages::unpin))
        .route("/message/share/v1", post(messages::share))
        .route("/message/sendlater/v1", post(messages::send_later))
        .route("/message/sendlaterdm/v1", post(messages::send_later_dm))
        .route("/search/v1", get(messages::search))
        // Standups
        .route("/standup/start/v1", post(standup::start))
        .route("/standup/active/v1", get(standup::active))
        .route("/standup/send/v1", post(standup::send))
        // Users
        .route("/user/profile/v3", get(users::profile))
        .route("/users/all/v2", get(users::all))
        .route("/user/profile/setname/v2", put(users::set_name))
        .route("/user/profile/setemail/v2", put(users::set_email))
        .route("/user/profile/sethandle/v2", put(users::set_handle))
        .route("/user/profile/uploadphoto/v1", post(users::upload_photo))
        .route("/user/stats/v1", get(users::user_stats))
        .route("/users/stats/v1", get(users::workspace_stats))
        .route("/notifications/get/v1", get(users::notifications))
        // Admin
        .route("/admin/user/remove/v1", delete(admin::user_remove))
        .route("/admin/userpermission/change/v1", post(admin::permission_change))
        .layer(axum_middleware::from_fn(middleware::require_token))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
