//! Tweak panel using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiGlobalSettings, EguiPrimaryContextPass};

use portal_core::{BindingKind, Folder, ParamValue, Parameter, Rgb, SceneState};

use crate::models::{describe_readiness, ModelReadiness};
use crate::scene::SceneChanged;
use crate::LiveScene;

const PANEL_WIDTH: f32 = 400.0;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // The primary context lives on the present camera, not the first
        // camera spawned (which renders off screen)
        app.insert_resource(EguiGlobalSettings {
            auto_create_primary_context: false,
            ..default()
        })
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        .add_systems(EguiPrimaryContextPass, tweak_panel);
    }
}

fn tweak_panel(
    mut contexts: EguiContexts,
    mut scene: ResMut<LiveScene>,
    readiness: Res<ModelReadiness>,
    mut changes: MessageWriter<SceneChanged>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let mut edits: Vec<(Parameter, ParamValue)> = Vec::new();
    egui::Window::new("Tweaks")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .default_width(PANEL_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            let mut titles: Vec<&'static str> = Vec::new();
            for folder in Folder::ALL {
                let title = folder.path()[0];
                if !titles.contains(&title) {
                    titles.push(title);
                }
            }

            for title in titles {
                egui::CollapsingHeader::new(title)
                    .default_open(false)
                    .show(ui, |ui| {
                        for folder in Folder::ALL.into_iter().filter(|f| f.path()[0] == title) {
                            match folder.path() {
                                [_] => folder_parameters(ui, folder, &scene, &mut edits),
                                [_, sub, ..] => {
                                    egui::CollapsingHeader::new(*sub)
                                        .id_salt((title, *sub))
                                        .default_open(false)
                                        .show(ui, |ui| {
                                            folder_parameters(ui, folder, &scene, &mut edits)
                                        });
                                }
                                [] => {}
                            }
                        }
                    });
            }

            ui.separator();
            ui.label(
                egui::RichText::new(describe_readiness(&readiness))
                    .small()
                    .color(egui::Color32::GRAY),
            );
        });

    for (param, value) in edits {
        match scene.apply(param, value) {
            Ok(change) => {
                changes.write(SceneChanged(change));
            }
            Err(e) => tracing::warn!("Rejected edit: {}", e),
        }
    }
}

/// One widget per parameter; edited values are queued in `edits`
fn folder_parameters(
    ui: &mut egui::Ui,
    folder: Folder,
    scene: &SceneState,
    edits: &mut Vec<(Parameter, ParamValue)>,
) {
    for param in folder.parameters() {
        ui.horizontal(|ui| {
            ui.label(param.label());
            if let Some(value) = parameter_widget(ui, param, scene.read(param)) {
                edits.push((param, value));
            }
        });
    }
}

fn parameter_widget(ui: &mut egui::Ui, param: Parameter, current: ParamValue) -> Option<ParamValue> {
    match (param.binding(), current) {
        (BindingKind::Numeric(range), ParamValue::Number(mut value)) => {
            let slider = egui::Slider::new(&mut value, range.min..=range.max).step_by(range.step as f64);
            ui.add(slider).changed().then_some(ParamValue::Number(value))
        }
        (BindingKind::Color(_), ParamValue::Color(color)) => {
            let mut srgb = color.to_u8();
            let changed = egui::color_picker::color_edit_button_srgb(ui, &mut srgb).changed();
            changed.then(|| ParamValue::Color(Rgb::from_u8(srgb[0], srgb[1], srgb[2])))
        }
        _ => None,
    }
}
