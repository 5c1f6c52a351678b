//! Scene bundle loading and material assignment by node name

use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use portal_core::{resolve_nodes, AssetError, MaterialSlot, NodeRole, SceneReadiness};

use crate::materials::{PoleLightEmission, SceneMaterials};
use crate::PortalSettings;

/// Root entity of the spawned scene bundle
#[derive(Component)]
pub struct PortalModel;

/// Load progress of the scene bundle, settled exactly once
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct ModelReadiness(pub SceneReadiness);

#[derive(Resource)]
struct ModelHandles {
    path: String,
    scene: Handle<Scene>,
    baked_texture_reported: bool,
}

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelReadiness>()
            .add_systems(Startup, load_model)
            .add_systems(Update, (watch_load_failures, assign_materials).chain());
    }
}

fn load_model(
    mut commands: Commands,
    settings: Res<PortalSettings>,
    asset_server: Res<AssetServer>,
) {
    let path = settings.assets.scene.clone();
    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
    tracing::info!(path = %path, "Loading scene bundle");

    commands.spawn((SceneRoot(scene.clone()), PortalModel));
    commands.insert_resource(ModelHandles {
        path,
        scene,
        baked_texture_reported: false,
    });
}

/// Record load failures. The rest of the scene keeps rendering.
fn watch_load_failures(
    asset_server: Res<AssetServer>,
    settings: Res<PortalSettings>,
    materials: Res<SceneMaterials>,
    standard: Res<Assets<StandardMaterial>>,
    mut handles: ResMut<ModelHandles>,
    mut readiness: ResMut<ModelReadiness>,
) {
    if !readiness.is_settled() {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handles.scene.id()) {
            let error = AssetError::load_failure(handles.path.clone(), err.to_string());
            tracing::error!("{}", error);
            readiness.fail(error);
        }
    }

    if handles.baked_texture_reported {
        return;
    }
    let texture = standard
        .get(&materials.baked)
        .and_then(|m| m.base_color_texture.as_ref());
    if let Some(texture) = texture {
        if let Some(LoadState::Failed(err)) = asset_server.get_load_state(texture.id()) {
            let error =
                AssetError::load_failure(settings.assets.baked_texture.clone(), err.to_string());
            tracing::error!("{}", error);
            handles.baked_texture_reported = true;
        }
    }
}

/// Once the bundle is spawned, resolve the four named nodes and swap their
/// materials for the shared scene materials
fn assign_materials(
    mut commands: Commands,
    mut readiness: ResMut<ModelReadiness>,
    materials: Res<SceneMaterials>,
    roots: Query<Entity, With<PortalModel>>,
    children: Query<&Children>,
    names: Query<&Name>,
    meshes: Query<(), With<Mesh3d>>,
) -> Result {
    if readiness.is_settled() {
        return Ok(());
    }
    let root = roots.single()?;

    let named: Vec<(&str, Entity)> = children
        .iter_descendants(root)
        .filter_map(|e| names.get(e).ok().map(|n| (n.as_str(), e)))
        .collect();
    if named.is_empty() {
        // Not spawned yet
        return Ok(());
    }

    let resolution = resolve_nodes(named);
    for error in resolution.errors() {
        tracing::error!("{}", error);
    }

    for (role, node) in resolution.resolved() {
        // The node itself or its primitive children carry the meshes
        let targets = std::iter::once(*node)
            .chain(children.iter_descendants(*node))
            .filter(|e| meshes.contains(*e));
        for target in targets {
            let mut entity = commands.entity(target);
            match role.material() {
                MaterialSlot::Baked => {
                    entity.insert(MeshMaterial3d(materials.baked.clone()));
                }
                MaterialSlot::PoleLightEmission => {
                    entity.insert((MeshMaterial3d(materials.pole_light.clone()), PoleLightEmission));
                }
                MaterialSlot::PortalEmission => {
                    entity
                        .remove::<MeshMaterial3d<StandardMaterial>>()
                        .insert(MeshMaterial3d(materials.portal.clone()));
                }
            }
        }
        tracing::debug!(node = role.node_name(), "Assigned material");
    }

    readiness.settle(&resolution);
    match &readiness.0 {
        SceneReadiness::Ready => tracing::info!("Scene ready"),
        SceneReadiness::Partial { missing } => {
            tracing::warn!(missing = ?missing, "Scene ready with missing nodes")
        }
        _ => {}
    }
    Ok(())
}

/// Short status line for the panel
pub fn describe_readiness(readiness: &SceneReadiness) -> String {
    match readiness {
        SceneReadiness::Loading => "Loading".to_string(),
        SceneReadiness::Ready => format!("Ready ({} nodes)", NodeRole::ALL.len()),
        SceneReadiness::Partial { missing } => format!("Missing: {}", missing.join(", ")),
        SceneReadiness::Failed(err) => format!("Failed: {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{FireflyMaterial, PortalMaterial};
    use portal_core::{AssetResolutionError, SceneState};

    fn test_app() -> App {
        let mut app = App::new();
        app.insert_resource(Assets::<StandardMaterial>::default())
            .insert_resource(Assets::<PortalMaterial>::default())
            .insert_resource(Assets::<FireflyMaterial>::default())
            .init_resource::<ModelReadiness>()
            .add_systems(Update, assign_materials);

        let world = app.world_mut();
        let materials = world.resource_scope(|world, mut standard: Mut<Assets<StandardMaterial>>| {
            world.resource_scope(|world, mut portal: Mut<Assets<PortalMaterial>>| {
                let mut fireflies = world.resource_mut::<Assets<FireflyMaterial>>();
                SceneMaterials::build(
                    &SceneState::default(),
                    Handle::default(),
                    &mut standard,
                    &mut portal,
                    &mut fireflies,
                )
            })
        });
        world.insert_resource(materials);
        app
    }

    fn spawn_bundle(app: &mut App, names: &[&'static str]) -> Vec<Entity> {
        let mut nodes = Vec::new();
        app.world_mut().spawn(PortalModel).with_children(|parent| {
            for name in names {
                nodes.push(
                    parent
                        .spawn((Name::new(*name), Mesh3d(Handle::default())))
                        .id(),
                );
            }
        });
        nodes
    }

    #[test]
    fn test_missing_portal_assigns_the_rest() {
        let mut app = test_app();
        let nodes = spawn_bundle(
            &mut app,
            &["Merged", "PoleLightEmissionA", "PoleLightEmissionB"],
        );
        app.update();

        assert_eq!(
            app.world().resource::<ModelReadiness>().0,
            SceneReadiness::Partial {
                missing: vec!["PortalEmission".to_string()]
            }
        );

        let materials = app.world().resource::<SceneMaterials>().clone();
        let baked = app
            .world()
            .get::<MeshMaterial3d<StandardMaterial>>(nodes[0])
            .unwrap();
        assert_eq!(baked.0, materials.baked);
        for pole in &nodes[1..] {
            let assigned = app
                .world()
                .get::<MeshMaterial3d<StandardMaterial>>(*pole)
                .unwrap();
            assert_eq!(assigned.0, materials.pole_light);
            assert!(app.world().get::<PoleLightEmission>(*pole).is_some());
        }
    }

    #[test]
    fn test_portal_node_gets_shader_material() {
        let mut app = test_app();
        let nodes = spawn_bundle(
            &mut app,
            &["Merged", "PoleLightEmissionA", "PoleLightEmissionB", "PortalEmission"],
        );
        app.update();

        assert_eq!(app.world().resource::<ModelReadiness>().0, SceneReadiness::Ready);
        let portal = app.world().entity(nodes[3]);
        assert!(portal.get::<MeshMaterial3d<StandardMaterial>>().is_none());
        assert_eq!(
            portal.get::<MeshMaterial3d<PortalMaterial>>().unwrap().0,
            app.world().resource::<SceneMaterials>().portal
        );
    }

    #[test]
    fn test_waits_for_spawned_bundle() {
        let mut app = test_app();
        app.world_mut().spawn(PortalModel);
        app.update();
        assert_eq!(app.world().resource::<ModelReadiness>().0, SceneReadiness::Loading);
    }

    #[test]
    fn test_describe_readiness() {
        assert_eq!(describe_readiness(&SceneReadiness::Loading), "Loading");
        assert_eq!(describe_readiness(&SceneReadiness::Ready), "Ready (4 nodes)");
        assert_eq!(
            describe_readiness(&SceneReadiness::Partial {
                missing: vec!["PortalEmission".to_string()]
            }),
            "Missing: PortalEmission"
        );
        let failed = SceneReadiness::Failed(AssetError::Resolution(AssetResolutionError {
            node: "Merged".to_string(),
        }));
        assert_eq!(
            describe_readiness(&failed),
            "Failed: Scene bundle has no node named 'Merged'"
        );
    }
}
