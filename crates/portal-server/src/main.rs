//! Portal Server - serves the portal scene web bundle
//!
//! Hosts the built WASM frontend and the scene assets over HTTP.

mod config;
mod server;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "portal-server")]
#[command(about = "Static file server for the portal scene")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "portal-server.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory holding the built web bundle
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Portal server v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(root) = args.root {
        config.server.root = root;
    }

    if !config.server.root.is_dir() {
        warn!(root = %config.server.root.display(), "Web bundle directory not found");
    }

    // The page embeds its own copy; a bad file here is reported, not fatal
    let scene = match portal_core::load_config(&config.server.scene_config) {
        Ok(scene) => {
            info!(
                fireflies = scene.fireflies.count,
                passes = scene.renderer.post.active().count(),
                "Scene configuration valid"
            );
            scene
        }
        Err(e) => {
            warn!(
                path = %config.server.scene_config.display(),
                error = %e,
                "Scene configuration rejected, serving defaults"
            );
            portal_core::PortalConfig::default()
        }
    };

    match server::check_scene_bundle(&config.server.assets, &scene) {
        Ok(()) => info!(bundle = %scene.assets.scene, "Scene bundle readable"),
        Err(e) => warn!("{}", e),
    }

    let state = Arc::new(server::AppState { scene });
    server::run(&config.server, state).await
}
