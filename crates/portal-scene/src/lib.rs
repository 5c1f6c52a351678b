//! Portal Scene - Bevy rendering of the baked portal scene
//!
//! This crate wires the renderer-independent model from `portal-core` into
//! Bevy: scene materials and shaders, the firefly mesh, scene bundle
//! loading, the orbit camera, per-frame ordering and the tweak panel.

pub mod camera;
pub mod fireflies;
pub mod frame;
pub mod materials;
pub mod models;
pub mod postprocess;
pub mod scene;
pub mod ui;
pub mod viewport;

use bevy::prelude::*;

use portal_core::{PortalConfig, SceneState};

/// Configuration the app was started with
#[derive(Resource, Debug, Clone, Deref)]
pub struct PortalSettings(pub PortalConfig);

/// Live scene state, mutated by the panel and read back every frame
#[derive(Resource, Debug, Clone, Deref, DerefMut)]
pub struct LiveScene(pub SceneState);

/// Plugin that sets up the portal scene
pub struct PortalScenePlugin {
    pub config: PortalConfig,
}

impl Plugin for PortalScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PortalSettings(self.config.clone()))
            .insert_resource(LiveScene(SceneState::from_config(&self.config)))
            .insert_resource(postprocess::PostSettings(self.config.renderer.post.clone()))
            .add_plugins(materials::MaterialsPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(frame::FramePlugin)
            .add_plugins(viewport::ViewportPlugin)
            .add_plugins(fireflies::FirefliesPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(postprocess::PostProcessPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::{MainCamera, OrbitController};
pub use frame::FrameSet;
pub use materials::{FireflyMaterial, PortalMaterial, SceneMaterials};
pub use models::ModelReadiness;
pub use scene::SceneChanged;
