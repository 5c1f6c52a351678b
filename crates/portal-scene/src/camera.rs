//! Camera and damped orbit navigation

use bevy::camera::RenderTarget;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::materials::to_color;
use crate::viewport::SceneTarget;
use crate::{LiveScene, PortalSettings};

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
const MAX_ELEVATION: f32 = 1.5;

/// Orbit state with Y up. Input moves the `*_target` values; [`step`]
/// eases the current values toward them.
///
/// [`step`]: OrbitController::step
#[derive(Debug, Clone, Resource)]
pub struct OrbitController {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub target_azimuth: f32,
    pub elevation: f32,
    pub target_elevation: f32,
    pub focus: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub damping: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::from_eye(Vec3::new(4.0, 2.0, 4.0), Vec3::ZERO, 0.05)
    }
}

impl OrbitController {
    pub fn from_eye(eye: Vec3, focus: Vec3, damping: f32) -> Self {
        let offset = eye - focus;
        let distance = offset.length().max(MIN_DISTANCE);
        let azimuth = offset.z.atan2(offset.x);
        let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        Self {
            distance,
            target_distance: distance,
            azimuth,
            target_azimuth: azimuth,
            elevation,
            target_elevation: elevation,
            focus,
            target_focus: focus,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            damping,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        self.focus
            + Vec3::new(
                horizontal * self.azimuth.cos(),
                self.distance * self.elevation.sin(),
                horizontal * self.azimuth.sin(),
            )
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.target_azimuth += delta.x * self.sensitivity;
        self.target_elevation = (self.target_elevation + delta.y * self.sensitivity)
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Move the focus in the camera's screen plane
    pub fn pan(&mut self, delta: Vec2) {
        let right = Vec3::new(-self.azimuth.sin(), 0.0, self.azimuth.cos());
        let speed = self.distance * 0.002;
        self.target_focus -= right * delta.x * speed;
        self.target_focus += Vec3::Y * delta.y * speed;
    }

    /// Scale the target distance; `factor < 1` moves closer
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.target_distance = (self.target_distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Advance damping by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let t = 1.0 - (-self.damping * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * t;
        self.azimuth += (self.target_azimuth - self.azimuth) * t;
        self.elevation += (self.target_elevation - self.elevation) * t;
        self.focus += (self.target_focus - self.focus) * t;
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);
    }
}

fn spawn_camera(
    mut commands: Commands,
    settings: Res<PortalSettings>,
    scene: Res<LiveScene>,
    target: Res<SceneTarget>,
) {
    let camera = &settings.camera;
    let controller = OrbitController::from_eye(
        Vec3::from_array(camera.position),
        Vec3::ZERO,
        camera.damping,
    );

    let mut entity = commands.spawn((
        Camera3d::default(),
        // Renders at the capped draw buffer; the present camera shows it
        Camera {
            order: 0,
            target: RenderTarget::Image(target.image.clone().into()),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            aspect_ratio: scene.viewport.aspect(),
            ..default()
        }),
        controller.transform(),
        DistanceFog {
            color: to_color(scene.scene.fog_color.value()),
            falloff: FogFalloff::ExponentialSquared {
                density: scene.scene.fog_density,
            },
            ..default()
        },
        MainCamera,
    ));
    if !settings.renderer.antialias {
        entity.insert(Msaa::Off);
    }
    commands.insert_resource(controller);
}

/// Feed pointer and touch gestures into the orbit targets
pub(crate) fn orbit_input(
    mut controller: ResMut<OrbitController>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: EguiContexts,
) {
    // Leave the pointer to the panel while it is hovered or dragged
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let motion = mouse_motion.delta;
    if mouse_button.pressed(MouseButton::Left) {
        controller.rotate(-motion);
    }
    if mouse_button.pressed(MouseButton::Right) {
        controller.pan(motion);
    }

    let scroll = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / 100.0,
    };
    if scroll != 0.0 {
        let speed = controller.zoom_speed;
        controller.zoom(1.0 - scroll * speed);
    }

    let touches: Vec<_> = touch_input.iter().collect();
    match touches.as_slice() {
        [touch] => controller.rotate(-touch.delta()),
        [t1, t2] => {
            let current = t1.position().distance(t2.position());
            let previous = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            controller.zoom(previous.max(1.0) / current.max(1.0));
        }
        _ => {}
    }
}

/// One damping step per frame, then place the camera
pub(crate) fn orbit_step(
    time: Res<Time>,
    mut controller: ResMut<OrbitController>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) -> Result {
    controller.step(time.delta_secs());
    let mut transform = cameras.single_mut()?;
    *transform = controller.transform();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_eye_round_trip() {
        let eye = Vec3::new(4.0, 2.0, 4.0);
        let controller = OrbitController::from_eye(eye, Vec3::ZERO, 0.05);
        assert!((controller.eye() - eye).length() < 1e-4);
        assert!((controller.distance - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_damping_converges() {
        let mut controller = OrbitController::default();
        controller.rotate(Vec2::new(200.0, 50.0));
        controller.zoom(0.5);
        controller.pan(Vec2::new(30.0, 10.0));

        let mut previous_gap = f32::INFINITY;
        for _ in 0..600 {
            controller.step(1.0 / 60.0);
            let gap = (controller.target_distance - controller.distance).abs();
            assert!(gap <= previous_gap);
            previous_gap = gap;
        }
        assert!((controller.azimuth - controller.target_azimuth).abs() < 1e-3);
        assert!((controller.elevation - controller.target_elevation).abs() < 1e-3);
        assert!((controller.focus - controller.target_focus).length() < 1e-3);
        assert!((controller.distance - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_dt_holds_position() {
        let mut controller = OrbitController::default();
        controller.zoom(2.0);
        let before = controller.distance;
        controller.step(0.0);
        assert_eq!(controller.distance, before);
    }

    #[test]
    fn test_zoom_and_elevation_clamped() {
        let mut controller = OrbitController::default();
        controller.zoom(0.0001);
        assert_eq!(controller.target_distance, MIN_DISTANCE);
        controller.zoom(f32::NAN);
        assert_eq!(controller.target_distance, MIN_DISTANCE);
        controller.rotate(Vec2::new(0.0, 10_000.0));
        assert_eq!(controller.target_elevation, MAX_ELEVATION);
    }
}
