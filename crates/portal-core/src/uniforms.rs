//! Shader uniform slots for the time-driven materials
//!
//! A [`Uniform`] is a value slot with a stable identity. Writing through
//! [`Uniform::set`] keeps the identity (the slot is mutated in place), while
//! [`Uniform::new`] always mints a fresh identity. Parameter bindings rely on
//! this distinction; see [`crate::params::ColorBindingKind`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::clock::ElapsedTime;
use crate::color::Rgb;

static NEXT_UNIFORM_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a uniform slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Uniform<T> {
    id: UniformId,
    value: T,
}

impl<T> Uniform<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: UniformId(NEXT_UNIFORM_ID.fetch_add(1, Ordering::Relaxed)),
            value,
        }
    }

    pub fn id(&self) -> UniformId {
        self.id
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Overwrite the value in place. The slot identity is unchanged.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }
}

impl<T: Copy> Uniform<T> {
    pub fn value(&self) -> T {
        self.value
    }
}

/// Materials whose shader reads the frame time
pub trait TimeDriven {
    fn time(&self) -> f32;
    fn set_time(&mut self, t: ElapsedTime);
}

/// Uniforms of the portal surface shader
#[derive(Debug, Clone)]
pub struct PortalUniforms {
    pub time: Uniform<f32>,
    pub color_start: Uniform<Rgb>,
    pub color_end: Uniform<Rgb>,
}

impl PortalUniforms {
    pub fn new(color_start: Rgb, color_end: Rgb) -> Self {
        Self {
            time: Uniform::new(0.0),
            color_start: Uniform::new(color_start),
            color_end: Uniform::new(color_end),
        }
    }
}

impl TimeDriven for PortalUniforms {
    fn time(&self) -> f32 {
        self.time.value()
    }

    fn set_time(&mut self, t: ElapsedTime) {
        self.time.set(t.secs());
    }
}

/// Uniforms of the firefly point-sprite shader
#[derive(Debug, Clone)]
pub struct FireflyUniforms {
    pub time: Uniform<f32>,
    /// Device pixel ratio after the cap, kept in step with the render target
    pub pixel_ratio: Uniform<f32>,
    /// Sprite size in pixels before perspective attenuation
    pub size: Uniform<f32>,
}

impl FireflyUniforms {
    pub fn new(pixel_ratio: f32, size: f32) -> Self {
        Self {
            time: Uniform::new(0.0),
            pixel_ratio: Uniform::new(pixel_ratio),
            size: Uniform::new(size),
        }
    }
}

impl TimeDriven for FireflyUniforms {
    fn time(&self) -> f32 {
        self.time.value()
    }

    fn set_time(&mut self, t: ElapsedTime) {
        self.time.set(t.secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_identity() {
        let mut u = Uniform::new(Rgb::BLACK);
        let id = u.id();
        u.set(Rgb::WHITE);
        assert_eq!(u.id(), id);
        assert_eq!(u.value(), Rgb::WHITE);
    }

    #[test]
    fn test_new_mints_identity() {
        let a = Uniform::new(1.0_f32);
        let b = Uniform::new(1.0_f32);
        assert_ne!(a.id(), b.id());
    }
}
