//! Scene materials: baked, pole light emission, portal and firefly shaders

use bevy::asset::embedded_asset;
use bevy::mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef};
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError, VertexFormat,
};
use bevy::shader::ShaderRef;

use portal_core::{FireflyUniforms, PortalUniforms, Rgb, SceneState};

use crate::LiveScene;

const PORTAL_SHADER: &str = "embedded://portal_scene/shaders/portal.wgsl";
const FIREFLIES_SHADER: &str = "embedded://portal_scene/shaders/fireflies.wgsl";

/// Per-vertex sprite scale of a firefly quad
pub const ATTRIBUTE_FIREFLY_SCALE: MeshVertexAttribute =
    MeshVertexAttribute::new("Firefly_Scale", 988_540_917, VertexFormat::Float32);

pub(crate) fn to_color(rgb: Rgb) -> Color {
    Color::srgb(rgb.r, rgb.g, rgb.b)
}

fn to_linear_vec4(rgb: Rgb) -> Vec4 {
    to_color(rgb).to_linear().to_vec4()
}

#[derive(Debug, Clone, Copy, Default, ShaderType)]
pub struct PortalParams {
    pub color_start: Vec4,
    pub color_end: Vec4,
    pub time: f32,
}

impl From<&PortalUniforms> for PortalParams {
    fn from(u: &PortalUniforms) -> Self {
        Self {
            color_start: to_linear_vec4(u.color_start.value()),
            color_end: to_linear_vec4(u.color_end.value()),
            time: u.time.value(),
        }
    }
}

/// Animated noise surface filling the portal frame
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PortalMaterial {
    #[uniform(0)]
    pub params: PortalParams,
}

impl Material for PortalMaterial {
    fn fragment_shader() -> ShaderRef {
        PORTAL_SHADER.into()
    }

    // Visible from both sides
    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, ShaderType)]
pub struct FireflyParams {
    pub time: f32,
    pub pixel_ratio: f32,
    pub size: f32,
    pub _padding: f32,
}

impl From<&FireflyUniforms> for FireflyParams {
    fn from(u: &FireflyUniforms) -> Self {
        Self {
            time: u.time.value(),
            pixel_ratio: u.pixel_ratio.value(),
            size: u.size.value(),
            _padding: 0.0,
        }
    }
}

/// Additive glow sprites, one camera-facing quad per particle
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct FireflyMaterial {
    #[uniform(0)]
    pub params: FireflyParams,
}

impl Material for FireflyMaterial {
    fn vertex_shader() -> ShaderRef {
        FIREFLIES_SHADER.into()
    }

    fn fragment_shader() -> ShaderRef {
        FIREFLIES_SHADER.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            ATTRIBUTE_FIREFLY_SCALE.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        if let Some(depth) = descriptor.depth_stencil.as_mut() {
            depth.depth_write_enabled = false;
        }
        Ok(())
    }
}

fn baked_material(texture: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(texture),
        unlit: true,
        ..default()
    }
}

fn emission_material(color: Rgb) -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(color),
        unlit: true,
        ..default()
    }
}

/// Handles of the shared materials assigned to scene nodes
#[derive(Resource, Debug, Clone)]
pub struct SceneMaterials {
    pub baked: Handle<StandardMaterial>,
    pub pole_light: Handle<StandardMaterial>,
    pub portal: Handle<PortalMaterial>,
    pub fireflies: Handle<FireflyMaterial>,
    /// Identity of the pole light color slot `pole_light` was built from
    pole_light_source: portal_core::UniformId,
}

impl SceneMaterials {
    pub fn build(
        state: &SceneState,
        baked_texture: Handle<Image>,
        standard: &mut Assets<StandardMaterial>,
        portal: &mut Assets<PortalMaterial>,
        fireflies: &mut Assets<FireflyMaterial>,
    ) -> Self {
        Self {
            baked: standard.add(baked_material(baked_texture)),
            pole_light: standard.add(emission_material(state.pole_light.color.value())),
            portal: portal.add(PortalMaterial {
                params: PortalParams::from(&state.portal),
            }),
            fireflies: fireflies.add(FireflyMaterial {
                params: FireflyParams::from(&state.fireflies),
            }),
            pole_light_source: state.pole_light.color.id(),
        }
    }
}

/// Nodes drawn with the pole light emission material
#[derive(Component)]
pub struct PoleLightEmission;

pub struct MaterialsPlugin;

impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/portal.wgsl");
        embedded_asset!(app, "shaders/fireflies.wgsl");

        app.add_plugins(MaterialPlugin::<PortalMaterial>::default())
            .add_plugins(MaterialPlugin::<FireflyMaterial>::default())
            .add_systems(PreStartup, create_materials);
    }
}

fn create_materials(
    mut commands: Commands,
    scene: Res<LiveScene>,
    settings: Res<crate::PortalSettings>,
    asset_server: Res<AssetServer>,
    mut standard: ResMut<Assets<StandardMaterial>>,
    mut portal: ResMut<Assets<PortalMaterial>>,
    mut fireflies: ResMut<Assets<FireflyMaterial>>,
) {
    let baked_texture = asset_server.load(settings.assets.baked_texture.clone());
    commands.insert_resource(SceneMaterials::build(
        &scene,
        baked_texture,
        &mut standard,
        &mut portal,
        &mut fireflies,
    ));
}

/// Copy the live uniform values into the GPU material assets
pub(crate) fn write_material_uniforms(
    scene: Res<LiveScene>,
    handles: Res<SceneMaterials>,
    mut portal: ResMut<Assets<PortalMaterial>>,
    mut fireflies: ResMut<Assets<FireflyMaterial>>,
) -> Result {
    let portal_material = portal
        .get_mut(&handles.portal)
        .ok_or_else(|| portal_core::FrameError::Uniforms("portal material missing".into()))?;
    portal_material.params = PortalParams::from(&scene.portal);

    let firefly_material = fireflies
        .get_mut(&handles.fireflies)
        .ok_or_else(|| portal_core::FrameError::Uniforms("firefly material missing".into()))?;
    firefly_material.params = FireflyParams::from(&scene.fireflies);

    Ok(())
}

/// Swap in a new pole light material when its color slot was replaced
pub(crate) fn replace_pole_light_material(
    scene: Res<LiveScene>,
    mut handles: ResMut<SceneMaterials>,
    mut standard: ResMut<Assets<StandardMaterial>>,
    mut poles: Query<&mut MeshMaterial3d<StandardMaterial>, With<PoleLightEmission>>,
) {
    let slot = &scene.pole_light.color;
    if slot.id() == handles.pole_light_source {
        return;
    }

    let material = standard.add(emission_material(slot.value()));
    for mut assigned in poles.iter_mut() {
        assigned.0 = material.clone();
    }
    tracing::debug!(poles = poles.iter().count(), "Replaced pole light material");
    handles.pole_light = material;
    handles.pole_light_source = slot.id();
}
