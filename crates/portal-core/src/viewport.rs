//! Viewport size, aspect ratio and pixel-ratio rules

use crate::uniforms::FireflyUniforms;

/// Upper bound on the device pixel ratio used for the render target
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Clamp a device pixel ratio to [`MAX_PIXEL_RATIO`]
pub fn capped_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Window size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        let h = if self.height > 0.0 { self.height } else { 1.0 };
        self.width / h
    }
}

/// Committed viewport state. Camera aspect, draw buffer and pixel ratio are
/// always derived together from one resize call.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    size: ViewportSize,
    pixel_ratio: f32,
    aspect: f32,
    draw_buffer: (u32, u32),
}

impl Viewport {
    pub fn new(size: ViewportSize, device_pixel_ratio: f32) -> Self {
        let pixel_ratio = capped_pixel_ratio(device_pixel_ratio);
        Self {
            size,
            pixel_ratio,
            aspect: size.aspect(),
            draw_buffer: draw_buffer(size, pixel_ratio),
        }
    }

    /// Commit a new window size and device pixel ratio.
    ///
    /// Returns `true` if any derived value changed. Resizing twice to the
    /// same dimensions returns `false` the second time.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) -> bool {
        let next = Viewport::new(ViewportSize::new(width, height), device_pixel_ratio);
        if next == *self {
            return false;
        }
        tracing::debug!(
            width,
            height,
            pixel_ratio = next.pixel_ratio,
            aspect = next.aspect,
            "Viewport resized"
        );
        *self = next;
        true
    }

    /// Push the capped pixel ratio into the firefly shader uniforms
    pub fn apply_to(&self, fireflies: &mut FireflyUniforms) {
        fireflies.pixel_ratio.set(self.pixel_ratio);
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Render target size in physical pixels
    pub fn draw_buffer(&self) -> (u32, u32) {
        self.draw_buffer
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(ViewportSize::new(1280.0, 720.0), 1.0)
    }
}

fn draw_buffer(size: ViewportSize, pixel_ratio: f32) -> (u32, u32) {
    let scale = |v: f32| (v.max(0.0) * pixel_ratio).round() as u32;
    (scale(size.width), scale(size.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_commits_aspect_and_buffer() {
        let mut vp = Viewport::default();
        assert!(vp.resize(1920.0, 1080.0, 3.0));
        assert_eq!(vp.aspect(), 1920.0 / 1080.0);
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.draw_buffer(), (3840, 2160));

        assert!(vp.resize(800.0, 600.0, 1.5));
        assert_eq!(vp.aspect(), 800.0 / 600.0);
        assert_eq!(vp.draw_buffer(), (1200, 900));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut vp = Viewport::default();
        assert!(vp.resize(1024.0, 768.0, 2.0));
        let snapshot = vp.clone();
        assert!(!vp.resize(1024.0, 768.0, 2.0));
        assert_eq!(vp, snapshot);
    }

    #[test]
    fn test_pixel_ratio_reaches_fireflies() {
        let mut fireflies = FireflyUniforms::new(1.0, 100.0);
        let id = fireflies.pixel_ratio.id();
        let mut vp = Viewport::default();
        vp.resize(640.0, 480.0, 2.75);
        vp.apply_to(&mut fireflies);
        assert_eq!(fireflies.pixel_ratio.value(), 2.0);
        assert_eq!(fireflies.pixel_ratio.id(), id);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(capped_pixel_ratio(f32::NAN), 1.0);
        assert_eq!(capped_pixel_ratio(0.0), 1.0);
        assert_eq!(ViewportSize::new(300.0, 0.0).aspect(), 300.0);
    }
}
