//! Tweak panel parameter bindings
//!
//! Each [`Parameter`] binds one property of [`SceneState`] to a panel widget.
//! Edits are applied to the live state immediately; there is no staging and
//! no undo. Numeric parameters clamp and snap to their [`NumericRange`].
//! Color parameters come in two kinds that are not interchangeable:
//!
//! - [`ColorBindingKind::MutateInPlace`] writes through the existing uniform
//!   slot, the way shader uniform colors are updated.
//! - [`ColorBindingKind::ReplaceReference`] swaps in a fresh slot, the way a
//!   plain material color is replaced wholesale.

use std::fmt;
use thiserror::Error;

use crate::color::Rgb;
use crate::state::SceneState;
use crate::uniforms::Uniform;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("{param} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        param: String,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{param} received a non-finite value")]
    NotFinite { param: String },
    #[error("{param} expects a {expected} value")]
    TypeMismatch {
        param: String,
        expected: &'static str,
    },
}

/// Inclusive numeric range with a step grid anchored at `min`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl NumericRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamp to the nearest bound, then snap to the step grid.
    /// Values already on the grid are returned unchanged.
    pub fn clamp(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).clamp(self.min, self.max);
        if (snapped - clamped).abs() <= self.step * 1e-4 {
            clamped
        } else {
            snapped
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Strict check used for values that did not come from a widget
    pub fn validate(&self, param: &str, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                param: param.to_string(),
            });
        }
        if !self.contains(value) {
            return Err(ParamError::OutOfRange {
                param: param.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

pub const FOG_DENSITY_RANGE: NumericRange = NumericRange::new(0.0, 0.5, 0.05);
pub const FIREFLY_SIZE_RANGE: NumericRange = NumericRange::new(0.0, 500.0, 1.0);

/// How a color edit reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBindingKind {
    MutateInPlace,
    ReplaceReference,
}

impl ColorBindingKind {
    pub fn apply(self, slot: &mut Uniform<Rgb>, color: Rgb) {
        match self {
            ColorBindingKind::MutateInPlace => slot.set(color),
            ColorBindingKind::ReplaceReference => *slot = Uniform::new(color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingKind {
    Numeric(NumericRange),
    Color(ColorBindingKind),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Number(f32),
    Color(Rgb),
}

/// Panel folders. Presentation only; all start collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    Scene,
    Renderer,
    PoleLightEmission,
    PortalEmission,
    FireFliesShader,
}

impl Folder {
    pub const ALL: [Folder; 5] = [
        Folder::Scene,
        Folder::Renderer,
        Folder::PoleLightEmission,
        Folder::PortalEmission,
        Folder::FireFliesShader,
    ];

    /// Nested folder titles, outermost first
    pub fn path(self) -> &'static [&'static str] {
        match self {
            Folder::Scene => &["Scene"],
            Folder::Renderer => &["Renderer"],
            Folder::PoleLightEmission => &["Pole Light Emission"],
            Folder::PortalEmission => &["Portal Emission"],
            Folder::FireFliesShader => &["Fire Flies", "Shader"],
        }
    }

    pub fn parameters(self) -> impl Iterator<Item = Parameter> {
        Parameter::ALL.into_iter().filter(move |p| p.folder() == self)
    }
}

/// What the renderer has to re-sync after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Fog,
    ClearColor,
    PoleLightMaterial,
    PortalUniforms,
    FireflyUniforms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    FogColor,
    FogDensity,
    ClearColor,
    PoleLightColor,
    PortalColorStart,
    PortalColorEnd,
    FireFliesSize,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::FogColor,
        Parameter::FogDensity,
        Parameter::ClearColor,
        Parameter::PoleLightColor,
        Parameter::PortalColorStart,
        Parameter::PortalColorEnd,
        Parameter::FireFliesSize,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Parameter::FogColor => "Fog Color",
            Parameter::FogDensity => "Fog Density",
            Parameter::ClearColor => "Clear Color",
            Parameter::PoleLightColor => "Color",
            Parameter::PortalColorStart => "Color Start",
            Parameter::PortalColorEnd => "Color End",
            Parameter::FireFliesSize => "Size",
        }
    }

    pub fn folder(self) -> Folder {
        match self {
            Parameter::FogColor | Parameter::FogDensity => Folder::Scene,
            Parameter::ClearColor => Folder::Renderer,
            Parameter::PoleLightColor => Folder::PoleLightEmission,
            Parameter::PortalColorStart | Parameter::PortalColorEnd => Folder::PortalEmission,
            Parameter::FireFliesSize => Folder::FireFliesShader,
        }
    }

    pub fn binding(self) -> BindingKind {
        match self {
            Parameter::FogDensity => BindingKind::Numeric(FOG_DENSITY_RANGE),
            Parameter::FireFliesSize => BindingKind::Numeric(FIREFLY_SIZE_RANGE),
            Parameter::PoleLightColor => BindingKind::Color(ColorBindingKind::ReplaceReference),
            Parameter::FogColor
            | Parameter::ClearColor
            | Parameter::PortalColorStart
            | Parameter::PortalColorEnd => BindingKind::Color(ColorBindingKind::MutateInPlace),
        }
    }

    pub fn change(self) -> Change {
        match self {
            Parameter::FogColor | Parameter::FogDensity => Change::Fog,
            Parameter::ClearColor => Change::ClearColor,
            Parameter::PoleLightColor => Change::PoleLightMaterial,
            Parameter::PortalColorStart | Parameter::PortalColorEnd => Change::PortalUniforms,
            Parameter::FireFliesSize => Change::FireflyUniforms,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let folder = self.folder().path().join(" / ");
        write!(f, "{} / {}", folder, self.label())
    }
}

impl SceneState {
    /// Current value of a bound parameter
    pub fn read(&self, param: Parameter) -> ParamValue {
        match param {
            Parameter::FogColor => ParamValue::Color(self.scene.fog_color.value()),
            Parameter::FogDensity => ParamValue::Number(self.scene.fog_density),
            Parameter::ClearColor => ParamValue::Color(self.renderer.clear_color.value()),
            Parameter::PoleLightColor => ParamValue::Color(self.pole_light.color.value()),
            Parameter::PortalColorStart => ParamValue::Color(self.portal.color_start.value()),
            Parameter::PortalColorEnd => ParamValue::Color(self.portal.color_end.value()),
            Parameter::FireFliesSize => ParamValue::Number(self.fireflies.size.value()),
        }
    }

    /// Apply a panel edit to the live state and report what must be re-synced
    pub fn apply(&mut self, param: Parameter, value: ParamValue) -> Result<Change, ParamError> {
        match (param.binding(), value) {
            (BindingKind::Numeric(range), ParamValue::Number(v)) => {
                if !v.is_finite() {
                    return Err(ParamError::NotFinite {
                        param: param.to_string(),
                    });
                }
                let clamped = range.clamp(v);
                if clamped != v {
                    tracing::debug!(%param, requested = v, applied = clamped, "Clamped parameter");
                }
                match param {
                    Parameter::FogDensity => self.scene.fog_density = clamped,
                    Parameter::FireFliesSize => self.fireflies.size.set(clamped),
                    _ => unreachable!("numeric binding on a color parameter"),
                }
            }
            (BindingKind::Color(kind), ParamValue::Color(color)) => {
                let slot = match param {
                    Parameter::FogColor => &mut self.scene.fog_color,
                    Parameter::ClearColor => &mut self.renderer.clear_color,
                    Parameter::PoleLightColor => &mut self.pole_light.color,
                    Parameter::PortalColorStart => &mut self.portal.color_start,
                    Parameter::PortalColorEnd => &mut self.portal.color_end,
                    _ => unreachable!("color binding on a numeric parameter"),
                };
                kind.apply(slot, color);
            }
            (BindingKind::Numeric(_), ParamValue::Color(_)) => {
                return Err(ParamError::TypeMismatch {
                    param: param.to_string(),
                    expected: "numeric",
                });
            }
            (BindingKind::Color(_), ParamValue::Number(_)) => {
                return Err(ParamError::TypeMismatch {
                    param: param.to_string(),
                    expected: "color",
                });
            }
        }
        Ok(param.change())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_density_exact_and_clamped() {
        let mut state = SceneState::default();

        let change = state
            .apply(Parameter::FogDensity, ParamValue::Number(0.3))
            .unwrap();
        assert_eq!(change, Change::Fog);
        assert_eq!(state.scene.fog_density, 0.3);

        state
            .apply(Parameter::FogDensity, ParamValue::Number(0.9))
            .unwrap();
        assert_eq!(state.scene.fog_density, 0.5);

        state
            .apply(Parameter::FogDensity, ParamValue::Number(-1.0))
            .unwrap();
        assert_eq!(state.scene.fog_density, 0.0);
    }

    #[test]
    fn test_step_snapping() {
        assert_eq!(FOG_DENSITY_RANGE.clamp(0.12), 0.1);
        assert_eq!(FIREFLY_SIZE_RANGE.clamp(99.6), 100.0);
        assert_eq!(FIREFLY_SIZE_RANGE.clamp(750.0), 500.0);
    }

    #[test]
    fn test_portal_color_mutates_in_place() {
        let mut state = SceneState::default();
        let before = state.portal.color_start.id();
        let color = Rgb::from_hex("#ff0000").unwrap();

        state
            .apply(Parameter::PortalColorStart, ParamValue::Color(color))
            .unwrap();

        assert_eq!(state.portal.color_start.id(), before);
        assert_eq!(state.portal.color_start.value(), color);
    }

    #[test]
    fn test_pole_light_color_replaces_reference() {
        let mut state = SceneState::default();
        let before = state.pole_light.color.id();
        let color = Rgb::from_hex("#00ff00").unwrap();

        let change = state
            .apply(Parameter::PoleLightColor, ParamValue::Color(color))
            .unwrap();

        assert_eq!(change, Change::PoleLightMaterial);
        assert_ne!(state.pole_light.color.id(), before);
        assert_eq!(state.read(Parameter::PoleLightColor), ParamValue::Color(color));
    }

    #[test]
    fn test_type_mismatch_and_non_finite() {
        let mut state = SceneState::default();
        assert!(matches!(
            state.apply(Parameter::FogColor, ParamValue::Number(1.0)),
            Err(ParamError::TypeMismatch { expected: "color", .. })
        ));
        assert!(matches!(
            state.apply(Parameter::FireFliesSize, ParamValue::Color(Rgb::WHITE)),
            Err(ParamError::TypeMismatch { expected: "numeric", .. })
        ));
        assert!(matches!(
            state.apply(Parameter::FireFliesSize, ParamValue::Number(f32::NAN)),
            Err(ParamError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_strict_validation() {
        assert_eq!(FOG_DENSITY_RANGE.validate("fog_density", 0.2), Ok(0.2));
        assert!(matches!(
            FOG_DENSITY_RANGE.validate("fog_density", 0.7),
            Err(ParamError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_folder_layout() {
        let shader: Vec<_> = Folder::FireFliesShader.parameters().collect();
        assert_eq!(shader, vec![Parameter::FireFliesSize]);
        assert_eq!(Folder::FireFliesShader.path(), &["Fire Flies", "Shader"]);
        assert_eq!(
            Parameter::FogDensity.to_string(),
            "Scene / Fog Density"
        );
        let total: usize = Folder::ALL.iter().map(|f| f.parameters().count()).sum();
        assert_eq!(total, Parameter::ALL.len());
    }
}
