//! Post-processing passes on the main camera

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::{Bloom, BloomPrefilter};
use bevy::prelude::*;
use bevy::render::view::{ColorGrading, Hdr};

use portal_core::{BloomSettings, PostProcessing, ToneMappingMode};

use crate::camera::MainCamera;

/// Pass list currently applied to the main camera
#[derive(Resource, Debug, Clone, Default, Deref, DerefMut)]
pub struct PostSettings(pub PostProcessing);

pub struct PostProcessPlugin;

impl Plugin for PostProcessPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            apply_post_processing.run_if(resource_changed::<PostSettings>),
        );
    }
}

pub fn tonemapping_for(mode: ToneMappingMode) -> Tonemapping {
    match mode {
        ToneMappingMode::None => Tonemapping::None,
        ToneMappingMode::Reinhard => Tonemapping::Reinhard,
        ToneMappingMode::AcesFitted => Tonemapping::AcesFitted,
        ToneMappingMode::AgX => Tonemapping::AgX,
        ToneMappingMode::TonyMcMapface => Tonemapping::TonyMcMapface,
    }
}

fn bloom_for(settings: BloomSettings) -> Bloom {
    Bloom {
        intensity: settings.intensity,
        // Smaller radius keeps the glow tight around bright pixels
        high_pass_frequency: settings.radius.clamp(0.0, 1.0),
        prefilter: BloomPrefilter {
            threshold: settings.threshold,
            threshold_softness: 0.0,
        },
        ..Bloom::NATURAL
    }
}

/// Exposure is given as a linear multiplier; color grading takes stops
fn exposure_stops(exposure: f32) -> f32 {
    if exposure > 0.0 {
        exposure.log2()
    } else {
        0.0
    }
}

fn apply_post_processing(
    mut commands: Commands,
    settings: Res<PostSettings>,
    cameras: Query<Entity, With<MainCamera>>,
) -> Result {
    let camera = cameras.single()?;
    let mut entity = commands.entity(camera);

    match settings.bloom() {
        Some(bloom) => {
            entity.insert((Hdr, bloom_for(bloom)));
        }
        None => {
            entity.remove::<(Bloom, Hdr)>();
        }
    }

    let (tonemapping, grading) = match settings.tone_mapping() {
        Some((mode, exposure)) => {
            let mut grading = ColorGrading::default();
            grading.global.exposure = exposure_stops(exposure);
            (tonemapping_for(mode), grading)
        }
        None => (Tonemapping::None, ColorGrading::default()),
    };
    entity.insert((tonemapping, grading));

    tracing::info!(
        passes = settings.active().count(),
        bloom = settings.bloom().is_some(),
        "Applied post-processing"
    );
    Ok(())
}
