//! Bevy application setup

use bevy::ecs::error::warn;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;

use portal_core::PortalConfig;
use portal_scene::PortalScenePlugin;

/// Scene configuration compiled into the bundle
const EMBEDDED_CONFIG: &str = include_str!("../../../portal.toml");

/// Parse the embedded configuration, falling back to defaults so a bad file
/// never keeps the page from rendering
pub fn scene_config() -> PortalConfig {
    match PortalConfig::from_toml(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Embedded configuration rejected, using defaults: {}", e);
            PortalConfig::default()
        }
    }
}

pub fn build_app(config: PortalConfig) -> App {
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Portal".to_string(),
                    canvas: Some("#portal-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // The server exposes the asset directory under /assets
                file_path: "assets".to_string(),
                // Don't look for .meta files - server doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            }),
    )
    // These must be added BEFORE EguiPlugin so it can detect PickingPlugin
    .add_plugins(DefaultPickingPlugins)
    .add_plugins(EguiPlugin::default())
    .add_plugins(PortalScenePlugin { config });

    // A failing system logs and the next frame still runs
    app.set_error_handler(warn);
    app
}

pub fn run() {
    build_app(scene_config()).run();
}
