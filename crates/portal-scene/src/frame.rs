//! Per-frame update ordering

use bevy::prelude::*;

use portal_core::{ElapsedTime, FrameClock};

use crate::camera::{orbit_input, orbit_step};
use crate::materials::{replace_pole_light_material, write_material_uniforms};
use crate::LiveScene;

/// Steps of one frame, chained in this order inside `Update`.
/// Rendering happens after `Update`, so every uniform written here is
/// consumed by the same frame's render.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Commit the frame's elapsed time
    Clock,
    /// Time and panel values into the GPU materials
    Uniforms,
    /// Orbit input and one damping step
    Controls,
}

#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct PortalClock(pub FrameClock);

pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PortalClock>()
            .configure_sets(
                Update,
                (FrameSet::Clock, FrameSet::Uniforms, FrameSet::Controls).chain(),
            )
            .add_systems(Update, advance_clock.in_set(FrameSet::Clock))
            .add_systems(
                Update,
                (write_material_uniforms, replace_pole_light_material).in_set(FrameSet::Uniforms),
            )
            .add_systems(
                Update,
                (orbit_input, orbit_step).chain().in_set(FrameSet::Controls),
            );
    }
}

/// Advance the clock from real time and write it into every time-driven
/// material slot
fn advance_clock(
    time: Res<Time<Real>>,
    mut clock: ResMut<PortalClock>,
    mut scene: ResMut<LiveScene>,
) {
    let elapsed: ElapsedTime = clock.advance(time.elapsed());
    scene.sync_time(elapsed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{FireflyMaterial, PortalMaterial, SceneMaterials};
    use portal_core::{SceneState, TimeDriven};
    use std::time::{Duration, Instant};

    /// Clock and uniform steps of the frame chain, without input or window
    fn test_app() -> App {
        let mut app = App::new();
        let mut standard = Assets::<StandardMaterial>::default();
        let mut portal = Assets::<PortalMaterial>::default();
        let mut fireflies = Assets::<FireflyMaterial>::default();
        let scene = SceneState::default();
        let materials = SceneMaterials::build(
            &scene,
            Handle::default(),
            &mut standard,
            &mut portal,
            &mut fireflies,
        );

        app.insert_resource(Time::<Real>::default())
            .insert_resource(standard)
            .insert_resource(portal)
            .insert_resource(fireflies)
            .insert_resource(materials)
            .insert_resource(LiveScene(scene))
            .init_resource::<PortalClock>()
            .configure_sets(Update, (FrameSet::Clock, FrameSet::Uniforms).chain())
            .add_systems(Update, advance_clock.in_set(FrameSet::Clock))
            .add_systems(
                Update,
                (write_material_uniforms, replace_pole_light_material).in_set(FrameSet::Uniforms),
            );
        app
    }

    fn step(app: &mut App, at: Instant) {
        app.world_mut()
            .resource_mut::<Time<Real>>()
            .update_with_instant(at);
        app.update();
    }

    #[test]
    fn test_material_time_matches_clock_every_frame() {
        let mut app = test_app();
        let start = Instant::now();

        let mut previous = -1.0;
        for frame in 1..=3u64 {
            step(&mut app, start + Duration::from_millis(16 * frame));

            let elapsed = app.world().resource::<PortalClock>().elapsed().secs();
            let handles = app.world().resource::<SceneMaterials>();
            let portal = app
                .world()
                .resource::<Assets<PortalMaterial>>()
                .get(&handles.portal)
                .unwrap();
            let fireflies = app
                .world()
                .resource::<Assets<FireflyMaterial>>()
                .get(&handles.fireflies)
                .unwrap();

            // Written this frame, never the previous frame's value
            assert_eq!(portal.params.time, elapsed);
            assert_eq!(fireflies.params.time, elapsed);
            assert!(elapsed > previous);
            previous = elapsed;
        }
        assert_eq!(app.world().resource::<PortalClock>().frame(), 3);
    }

    #[test]
    fn test_clock_drives_time_uniforms() {
        let mut app = test_app();
        step(&mut app, Instant::now() + Duration::from_millis(16));

        let clock = app.world().resource::<PortalClock>();
        let scene = app.world().resource::<LiveScene>();
        assert_eq!(scene.portal.time(), clock.elapsed().secs());
        assert_eq!(scene.fireflies.time(), clock.elapsed().secs());
    }

    #[test]
    fn test_missing_material_does_not_stop_clock() {
        let mut app = test_app();
        app.world_mut()
            .resource_mut::<SceneMaterials>()
            .portal = Handle::default();
        app.set_error_handler(bevy::ecs::error::ignore);

        let start = Instant::now();
        step(&mut app, start + Duration::from_millis(16));
        step(&mut app, start + Duration::from_millis(32));
        assert_eq!(app.world().resource::<PortalClock>().frame(), 2);
    }
}
