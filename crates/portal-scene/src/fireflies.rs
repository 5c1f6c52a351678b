//! Firefly particle mesh

use bevy::asset::RenderAssetUsages;
use bevy::camera::visibility::NoFrustumCulling;
use bevy::mesh::{Indices, Mesh, PrimitiveTopology};
use bevy::prelude::*;

use portal_core::FireflyField;

use crate::materials::{SceneMaterials, ATTRIBUTE_FIREFLY_SCALE};
use crate::PortalSettings;

/// Marker for the firefly cloud entity
#[derive(Component)]
pub struct Fireflies;

const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// Expand every particle into a quad whose four vertices share the particle
/// center. The vertex shader pushes each corner out in screen space.
pub fn build_firefly_mesh(field: &FireflyField) -> Mesh {
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(field.len() * 4);
    let mut corners: Vec<[f32; 2]> = Vec::with_capacity(field.len() * 4);
    let mut scales: Vec<f32> = Vec::with_capacity(field.len() * 4);
    let mut indices: Vec<u32> = Vec::with_capacity(field.len() * 6);

    for (i, (center, scale)) in field.iter().enumerate() {
        let base = (i * 4) as u32;
        for corner in CORNERS {
            positions.push(center);
            corners.push(corner);
            scales.push(scale);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
    .with_inserted_attribute(ATTRIBUTE_FIREFLY_SCALE, scales)
    .with_inserted_indices(Indices::U32(indices))
}

pub struct FirefliesPlugin;

impl Plugin for FirefliesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_fireflies);
    }
}

fn spawn_fireflies(
    mut commands: Commands,
    settings: Res<PortalSettings>,
    materials: Res<SceneMaterials>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let field = FireflyField::generate_random(&settings.fireflies);
    tracing::info!(count = field.len(), "Spawning fireflies");

    commands.spawn((
        Mesh3d(meshes.add(build_firefly_mesh(&field))),
        MeshMaterial3d(materials.fireflies.clone()),
        Transform::default(),
        // The mesh bounds only cover quad centers, not the sprite extent
        NoFrustumCulling,
        Fireflies,
    ));
}
