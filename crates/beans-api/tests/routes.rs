use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use beans_api::photos::{PhotoFuture, PhotoStore};
use beans_api::{AppStateInner, router};
use beans_core::{Config, CoreError, Workspace};
use beans_db::Database;
use beans_types::api::UploadPhotoRequest;
use beans_types::models::UserId;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct FixedPhotos;

impl PhotoStore for FixedPhotos {
    fn store<'a>(&'a self, user_id: UserId, _req: &'a UploadPhotoRequest) -> PhotoFuture<'a> {
        Box::pin(async move { Ok::<_, CoreError>(format!("http://localhost/imgurl/{}.jpg", user_id)) })
    }
}

fn app() -> Router {
    let config = Config {
        token_secret: "route-tests".into(),
        default_profile_img_url: "http://localhost/imgurl/default.jpg".into(),
        password_params: argon2::Params::new(8, 1, 1, None).unwrap(),
    };
    let workspace = Workspace::with_defaults(Arc::new(Database::in_memory()), config).unwrap();
    router(Arc::new(AppStateInner {
        workspace,
        photos: Arc::new(FixedPhotos),
    }))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, first: &str, last: &str) -> (String, u64) {
    let (status, body) = call(
        app,
        "POST",
        "/auth/register/v3",
        None,
        Some(json!({
            "email": format!("{}@example.com", first.to_lowercase()),
            "password": "password1",
            "nameFirst": first,
            "nameLast": last,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    (
        body["token"].as_str().unwrap().to_owned(),
        body["authUserId"].as_u64().unwrap(),
    )
}

#[tokio::test]
async fn register_then_login() {
    let app = app();
    let (_, id) = register(&app, "Ann", "Lee").await;
    assert_eq!(id, 0);

    let (status, body) = call(
        &app,
        "POST",
        "/auth/login/v3",
        None,
        Some(json!({"email": "ann@example.com", "password": "password1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authUserId"], 0);

    let (status, body) = call(
        &app,
        "POST",
        "/auth/login/v3",
        None,
        Some(json!({"email": "ann@example.com", "password": "nope-nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn token_is_required_and_checked() {
    let app = app();
    let (status, body) = call(&app, "GET", "/channels/list/v3", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let (status, _) = call(&app, "GET", "/channels/list/v3", Some("made-up"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn channel_message_flow() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (bob, bob_id) = register(&app, "Bob", "Ray").await;

    let (status, body) = call(
        &app,
        "POST",
        "/channels/create/v3",
        Some(&ann),
        Some(json!({"name": "general", "isPublic": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let channel_id = body["channelId"].as_u64().unwrap();

    let (status, _) = call(
        &app,
        "POST",
        "/channel/invite/v3",
        Some(&ann),
        Some(json!({"channelId": channel_id, "uId": bob_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(
        &app,
        "POST",
        "/message/send/v2",
        Some(&bob),
        Some(json!({"channelId": channel_id, "message": "hello @annlee"})),
    )
    .await;
    let message_id = body["messageId"].as_u64().unwrap();

    let (_, body) = call(
        &app,
        "POST",
        "/message/react/v1",
        Some(&ann),
        Some(json!({"messageId": message_id, "reactId": 1})),
    )
    .await;
    assert_eq!(body, json!({}));

    let uri = format!("/channel/messages/v3?channelId={}&start=0", channel_id);
    let (status, body) = call(&app, "GET", &uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start"], 0);
    assert_eq!(body["end"], -1);
    let msg = &body["messages"][0];
    assert_eq!(msg["message"], "hello @annlee");
    assert_eq!(msg["reacts"][0]["reactId"], 1);
    assert_eq!(msg["reacts"][0]["isThisUserReacted"], true);
    assert_eq!(msg["isPinned"], false);

    let (_, body) = call(&app, "GET", "/notifications/get/v1", Some(&ann), None).await;
    let notes = body["notifications"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["channelId"], channel_id);
    assert_eq!(notes[0]["dmId"], -1);
    assert_eq!(notes[0]["notificationMessage"], "bobray tagged you in general: hello @annlee");

    let uri = format!("/message/remove/v2?messageId={}", message_id);
    let (status, _) = call(&app, "DELETE", &uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "DELETE", &uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dm_routes_use_query_and_body() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (bob, bob_id) = register(&app, "Bob", "Ray").await;

    let (status, body) = call(&app, "POST", "/dm/create/v2", Some(&ann), Some(json!({"uIds": [bob_id]}))).await;
    assert_eq!(status, StatusCode::OK);
    let dm_id = body["dmId"].as_u64().unwrap();

    let uri = format!("/dm/details/v2?dmId={}", dm_id);
    let (_, body) = call(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(body["name"], "annlee, bobray");
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let uri = format!("/dm/remove/v2?dmId={}", dm_id);
    let (status, _) = call(&app, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "DELETE", &uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, "GET", "/dm/list/v2", Some(&bob), None).await;
    assert_eq!(body["dms"], json!([]));
}

#[tokio::test]
async fn malformed_bodies_are_client_errors() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (status, _) = call(
        &app,
        "POST",
        "/channels/create/v3",
        Some(&ann),
        Some(json!({"name": "general"})),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn send_later_in_the_past_is_rejected() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (_, body) = call(
        &app,
        "POST",
        "/channels/create/v3",
        Some(&ann),
        Some(json!({"name": "general", "isPublic": true})),
    )
    .await;
    let (status, _) = call(
        &app,
        "POST",
        "/message/sendlater/v1",
        Some(&ann),
        Some(json!({"channelId": body["channelId"], "message": "late", "timeSent": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_photo_updates_profile() {
    let app = app();
    let (ann, id) = register(&app, "Ann", "Lee").await;
    let (status, _) = call(
        &app,
        "POST",
        "/user/profile/uploadphoto/v1",
        Some(&ann),
        Some(json!({
            "imgUrl": "http://example.com/me.jpg",
            "xStart": 0, "yStart": 0, "xEnd": 10, "yEnd": 10,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/user/profile/v3?uId={}", id);
    let (_, body) = call(&app, "GET", &uri, Some(&ann), None).await;
    assert_eq!(body["user"]["profileImgUrl"], "http://localhost/imgurl/0.jpg");
    assert_eq!(body["user"]["handleStr"], "annlee");
}

#[tokio::test]
async fn admin_and_stats_routes() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (bob, bob_id) = register(&app, "Bob", "Ray").await;

    let (status, _) = call(
        &app,
        "POST",
        "/admin/userpermission/change/v1",
        Some(&bob),
        Some(json!({"uId": 0, "permissionId": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/admin/user/remove/v1?uId={}", bob_id);
    let (status, _) = call(&app, "DELETE", &uri, Some(&ann), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, "GET", "/users/all/v2", Some(&ann), None).await;
    assert_eq!(body["users"].as_array().unwrap().len(), 1);

    let (_, body) = call(&app, "GET", "/users/stats/v1", Some(&ann), None).await;
    let stats = &body["workspaceStats"];
    assert_eq!(stats["channelsExist"][0]["numChannelsExist"], 0);
    assert_eq!(stats["utilizationRate"], 0.0);

    let (_, body) = call(&app, "GET", "/user/stats/v1", Some(&ann), None).await;
    assert_eq!(body["userStats"]["involvementRate"], 0.0);
}

#[tokio::test]
async fn clear_drops_sessions() {
    let app = app();
    let (ann, _) = register(&app, "Ann", "Lee").await;
    let (status, body) = call(&app, "DELETE", "/clear/v1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = call(&app, "GET", "/channels/listall/v3", Some(&ann), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
