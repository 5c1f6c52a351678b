//! Scene container: fog and clear color

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use portal_core::Change;

use crate::camera::MainCamera;
use crate::materials::to_color;
use crate::LiveScene;

/// Sent by the tweak panel after it mutates the live scene
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneChanged(pub Change);

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SceneChanged>()
            .add_systems(PreStartup, insert_clear_color)
            .add_systems(Update, sync_scene_properties);
    }
}

fn insert_clear_color(mut commands: Commands, scene: Res<LiveScene>) {
    commands.insert_resource(ClearColor(to_color(scene.renderer.clear_color.value())));
}

/// Fog and clear color have no automatic binding; re-sync them whenever
/// the panel reports a change
fn sync_scene_properties(
    mut changes: MessageReader<SceneChanged>,
    scene: Res<LiveScene>,
    mut clear_color: ResMut<ClearColor>,
    mut fogs: Query<&mut DistanceFog, With<MainCamera>>,
) {
    for SceneChanged(change) in changes.read() {
        match change {
            Change::Fog => {
                for mut fog in fogs.iter_mut() {
                    fog.color = to_color(scene.scene.fog_color.value());
                    fog.falloff = FogFalloff::ExponentialSquared {
                        density: scene.scene.fog_density,
                    };
                }
            }
            Change::ClearColor => {
                clear_color.0 = to_color(scene.renderer.clear_color.value());
            }
            // Material uniforms are copied every frame
            Change::PoleLightMaterial | Change::PortalUniforms | Change::FireflyUniforms => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::{ParamValue, Parameter, PortalConfig, Rgb, SceneState};

    #[test]
    fn test_fog_resynced_on_change() {
        let mut app = App::new();
        app.insert_resource(LiveScene(SceneState::from_config(&PortalConfig::default())))
            .add_plugins(SceneSetupPlugin);
        let camera = app
            .world_mut()
            .spawn((
                MainCamera,
                DistanceFog {
                    falloff: FogFalloff::ExponentialSquared { density: 0.05 },
                    ..default()
                },
            ))
            .id();
        app.update();

        let change = app
            .world_mut()
            .resource_mut::<LiveScene>()
            .apply(Parameter::FogDensity, ParamValue::Number(0.3))
            .unwrap();
        app.world_mut().write_message(SceneChanged(change));
        app.update();

        let fog = app.world().get::<DistanceFog>(camera).unwrap();
        assert!(matches!(
            fog.falloff,
            FogFalloff::ExponentialSquared { density } if density == 0.3
        ));
    }

    #[test]
    fn test_clear_color_resynced_on_change() {
        let mut app = App::new();
        app.insert_resource(LiveScene(SceneState::from_config(&PortalConfig::default())))
            .add_plugins(SceneSetupPlugin);
        app.update();

        let red = Rgb::new(1.0, 0.0, 0.0);
        let change = app
            .world_mut()
            .resource_mut::<LiveScene>()
            .apply(Parameter::ClearColor, ParamValue::Color(red))
            .unwrap();
        app.world_mut().write_message(SceneChanged(change));
        app.update();

        assert_eq!(app.world().resource::<ClearColor>().0, to_color(red));
    }
}
