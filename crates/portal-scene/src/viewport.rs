//! Window resize handling and the capped-resolution scene target
//!
//! The main camera renders into an image sized to the committed draw buffer,
//! `(W, H) * min(dpr, 2)`. A 2D camera on the window stretches that image
//! over the page and hosts the egui panel, so the panel stays sharp while the
//! scene never renders above the pixel-ratio cap.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};
use bevy::window::PrimaryWindow;
use bevy_egui::PrimaryEguiContext;

use crate::camera::MainCamera;
use crate::frame::FrameSet;
use crate::LiveScene;

/// Image the main camera renders into
#[derive(Resource, Debug, Clone)]
pub struct SceneTarget {
    pub image: Handle<Image>,
}

/// Camera that draws the scene target and the panel onto the window
#[derive(Component)]
pub struct PresentCamera;

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, create_scene_target)
            .add_systems(Startup, spawn_present_camera)
            // Committed before the frame writes uniforms and renders
            .add_systems(Update, sync_viewport.before(FrameSet::Uniforms));
    }
}

fn target_extent((width, height): (u32, u32)) -> Extent3d {
    Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

/// Render target image for a draw buffer of `size` physical pixels
pub fn scene_target_image(size: (u32, u32)) -> Image {
    let mut image = Image::new_fill(
        target_extent(size),
        TextureDimension::D2,
        &[0, 0, 0, 0],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_descriptor.usage = TextureUsages::RENDER_ATTACHMENT
        | TextureUsages::TEXTURE_BINDING
        | TextureUsages::COPY_DST;
    image
}

pub(crate) fn create_scene_target(
    mut commands: Commands,
    scene: Res<LiveScene>,
    mut images: ResMut<Assets<Image>>,
) {
    let image = images.add(scene_target_image(scene.viewport.draw_buffer()));
    commands.insert_resource(SceneTarget { image });
}

fn spawn_present_camera(mut commands: Commands, target: Res<SceneTarget>) {
    let camera = commands
        .spawn((
            Camera2d,
            Camera {
                order: 1,
                ..default()
            },
            PresentCamera,
            PrimaryEguiContext,
        ))
        .id();

    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        ImageNode::new(target.image.clone()),
        UiTargetCamera(camera),
    ));
}

/// Commit the window size into the scene viewport, then resize the scene
/// target and the camera aspect to match
pub(crate) fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut scene: ResMut<LiveScene>,
    target: Res<SceneTarget>,
    mut images: ResMut<Assets<Image>>,
    mut cameras: Query<&mut Projection, With<MainCamera>>,
) -> Result {
    let window = windows.single()?;
    let device_pixel_ratio = window.resolution.base_scale_factor();
    // CSS size of the canvas
    let width = window.physical_width() as f32 / device_pixel_ratio;
    let height = window.physical_height() as f32 / device_pixel_ratio;

    if !scene.resize(width, height, device_pixel_ratio) {
        return Ok(());
    }

    let extent = target_extent(scene.viewport.draw_buffer());
    if let Some(image) = images.get_mut(&target.image) {
        if image.texture_descriptor.size != extent {
            image.resize(extent);
        }
    }

    for mut projection in cameras.iter_mut() {
        if let Projection::Perspective(perspective) = &mut *projection {
            perspective.aspect_ratio = scene.viewport.aspect();
        }
    }

    tracing::info!(
        width = extent.width,
        height = extent.height,
        pixel_ratio = scene.viewport.pixel_ratio(),
        "Viewport committed"
    );
    Ok(())
}
