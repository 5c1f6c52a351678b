//! Web server setup and routing

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use portal_core::{check_bundle_compression, AssetError, PortalConfig};

use crate::config::HttpConfig;

/// Shared handler state
pub struct AppState {
    /// Scene configuration the bundle should be running with
    pub scene: PortalConfig,
}

pub fn router(config: &HttpConfig, state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/config", get(get_scene_config))
        // Scene bundle, baked texture
        .nest_service("/assets", ServeDir::new(&config.assets))
        // Static files (WASM frontend) - must be fallback for root
        .fallback_service(ServeDir::new(&config.root))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Diagnostic view of the scene configuration the server validated. The web
/// bundle embeds its own copy at build time and does not read this.
async fn get_scene_config(State(state): State<Arc<AppState>>) -> Json<PortalConfig> {
    Json(state.scene.clone())
}

/// Check that the scene bundle under `assets` exists and needs no mesh
/// decoder the browser app lacks
pub fn check_scene_bundle(assets: &Path, scene: &PortalConfig) -> Result<(), AssetError> {
    let path = assets.join(&scene.assets.scene);
    let bytes = std::fs::read(&path).map_err(|e| AssetError::LoadFailure {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    check_bundle_compression(&scene.assets.scene, &bytes)
}

/// Run plain HTTP server
pub async fn run(config: &HttpConfig, state: Arc<AppState>) -> Result<()> {
    let app = router(config, state);
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(
        address = %config.bind,
        root = %config.root.display(),
        assets = %config.assets.display(),
        "Starting web server"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
