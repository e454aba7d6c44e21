use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use beans_api::photos::HttpPhotoStore;
use beans_api::{AppStateInner, router};
use beans_core::{Config, Workspace};
use beans_db::Database;

const DEFAULT_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beans=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("BEANS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("BEANS_PORT")
        .unwrap_or_else(|_| "3200".into())
        .parse()?;
    let data_path = std::env::var("BEANS_DATA_PATH").unwrap_or_else(|_| "beans-data.json".into());
    let token_secret = std::env::var("BEANS_TOKEN_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.into());
    let public_url =
        std::env::var("BEANS_PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));
    let image_dir = PathBuf::from(std::env::var("BEANS_IMAGE_DIR").unwrap_or_else(|_| "./imgurl".into()));

    if token_secret == DEFAULT_SECRET {
        warn!("BEANS_TOKEN_SECRET is not set, using the development default");
    }

    let db = if data_path.is_empty() {
        info!("Running without a snapshot file");
        Database::in_memory()
    } else {
        Database::open(&PathBuf::from(&data_path))?
    };

    let config = Config {
        token_secret,
        default_profile_img_url: format!("{}/imgurl/default.jpg", public_url.trim_end_matches('/')),
        ..Config::default()
    };
    let workspace = Workspace::with_defaults(Arc::new(db), config)?;
    let photos = HttpPhotoStore::new(image_dir.clone(), public_url);

    let state = Arc::new(AppStateInner {
        workspace,
        photos: Arc::new(photos),
    });

    let app = router(state)
        .nest_service("/imgurl", ServeDir::new(&image_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Beans server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Could not install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
