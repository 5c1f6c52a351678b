//! Live scene state owned by the app and mutated by the tweak panel

use crate::color::Rgb;
use crate::config::PortalConfig;
use crate::uniforms::{FireflyUniforms, PortalUniforms, Uniform};
use crate::viewport::Viewport;

/// Fog and background of the scene container
#[derive(Debug, Clone)]
pub struct SceneProperties {
    pub fog_color: Uniform<Rgb>,
    pub fog_density: f32,
}

#[derive(Debug, Clone)]
pub struct RendererProperties {
    pub clear_color: Uniform<Rgb>,
}

/// Flat emissive material shared by both pole lights
#[derive(Debug, Clone)]
pub struct EmissiveMaterial {
    pub color: Uniform<Rgb>,
}

/// Everything the panel can change, read back by the renderer each frame
#[derive(Debug, Clone)]
pub struct SceneState {
    pub scene: SceneProperties,
    pub renderer: RendererProperties,
    pub pole_light: EmissiveMaterial,
    pub portal: PortalUniforms,
    pub fireflies: FireflyUniforms,
    pub viewport: Viewport,
}

impl SceneState {
    pub fn from_config(config: &PortalConfig) -> Self {
        let viewport = Viewport::default();
        Self {
            scene: SceneProperties {
                fog_color: Uniform::new(config.scene.fog_color),
                fog_density: config.scene.fog_density,
            },
            renderer: RendererProperties {
                clear_color: Uniform::new(config.renderer.clear_color),
            },
            pole_light: EmissiveMaterial {
                color: Uniform::new(config.pole_light.color),
            },
            portal: PortalUniforms::new(config.portal.color_start, config.portal.color_end),
            fireflies: FireflyUniforms::new(viewport.pixel_ratio(), config.fireflies.size),
            viewport,
        }
    }

    /// Commit a window resize and keep the firefly pixel ratio in step with
    /// the render target. Returns whether anything changed.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> bool {
        let changed = self.viewport.resize(width, height, device_pixel_ratio);
        if changed {
            self.viewport.apply_to(&mut self.fireflies);
        }
        changed
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::from_config(&PortalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_updates_firefly_pixel_ratio() {
        let mut state = SceneState::default();
        let slot = state.fireflies.pixel_ratio.id();

        assert!(state.resize(1920.0, 1080.0, 3.0));
        assert_eq!(state.fireflies.pixel_ratio.value(), 2.0);
        assert_eq!(state.fireflies.pixel_ratio.id(), slot);
        assert_eq!(state.viewport.draw_buffer(), (3840, 2160));

        assert!(!state.resize(1920.0, 1080.0, 3.0));
    }

    #[test]
    fn test_defaults_from_config() {
        let state = SceneState::default();
        assert_eq!(state.scene.fog_density, 0.05);
        assert_eq!(state.fireflies.size.value(), 100.0);
        assert_eq!(state.portal.color_end.value().to_hex(), "#dde0ff");
    }
}
