//! Firefly particle field generation

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of the firefly cloud
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FireflyConfig {
    /// Number of particles
    #[serde(default = "default_count")]
    pub count: usize,
    /// Width of the X/Z box, centered on the origin
    #[serde(default = "default_spread")]
    pub spread: f32,
    /// Maximum particle height above the ground
    #[serde(default = "default_height")]
    pub height: f32,
    /// Initial sprite size uniform
    #[serde(default = "default_size")]
    pub size: f32,
}

impl Default for FireflyConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            spread: default_spread(),
            height: default_height(),
            size: default_size(),
        }
    }
}

fn default_count() -> usize {
    30
}

fn default_spread() -> f32 {
    4.0
}

fn default_height() -> f32 {
    1.5
}

fn default_size() -> f32 {
    100.0
}

/// Per-particle attributes, generated once
///
/// `positions` holds `x, y, z` triples and `scales` one value per particle.
/// Changing the count or bounds means generating a new field.
#[derive(Debug, Clone)]
pub struct FireflyField {
    positions: Vec<f32>,
    scales: Vec<f32>,
}

impl FireflyField {
    /// Fill both attribute arrays with independent uniform draws:
    /// `x, z` in `[-spread/2, spread/2)`, `y` in `[0, height)`, scale in `[0, 1)`.
    pub fn generate<R: Rng + ?Sized>(config: &FireflyConfig, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(config.count * 3);
        let mut scales = Vec::with_capacity(config.count);

        for _ in 0..config.count {
            positions.push((rng.random::<f32>() - 0.5) * config.spread);
            positions.push(rng.random::<f32>() * config.height);
            positions.push((rng.random::<f32>() - 0.5) * config.spread);
            scales.push(rng.random::<f32>());
        }

        tracing::debug!(count = config.count, "Generated firefly field");
        Self { positions, scales }
    }

    /// Generate with the thread-local, non-seeded generator
    pub fn generate_random(config: &FireflyConfig) -> Self {
        Self::generate(config, &mut rand::rng())
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Iterate `([x, y, z], scale)` per particle
    pub fn iter(&self) -> impl Iterator<Item = ([f32; 3], f32)> + '_ {
        self.positions
            .chunks_exact(3)
            .zip(self.scales.iter())
            .map(|(p, s)| ([p[0], p[1], p[2]], *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lengths_and_bounds() {
        let config = FireflyConfig {
            count: 500,
            spread: 4.0,
            height: 1.5,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let field = FireflyField::generate(&config, &mut rng);

        assert_eq!(field.positions().len(), 1500);
        assert_eq!(field.scales().len(), 500);
        assert_eq!(field.len(), 500);

        for ([x, y, z], scale) in field.iter() {
            assert!((-2.0..2.0).contains(&x), "x out of range: {}", x);
            assert!((-2.0..2.0).contains(&z), "z out of range: {}", z);
            assert!((0.0..1.5).contains(&y), "y out of range: {}", y);
            assert!((0.0..1.0).contains(&scale), "scale out of range: {}", scale);
        }
    }

    #[test]
    fn test_empty_field() {
        let config = FireflyConfig {
            count: 0,
            ..Default::default()
        };
        let field = FireflyField::generate_random(&config);
        assert!(field.is_empty());
        assert!(field.positions().is_empty());
    }

    #[test]
    fn test_regeneration_reallocates() {
        let mut rng = StdRng::seed_from_u64(1);
        let small = FireflyField::generate(&FireflyConfig::default(), &mut rng);
        let bigger = FireflyField::generate(
            &FireflyConfig {
                count: 60,
                ..Default::default()
            },
            &mut rng,
        );
        assert_eq!(small.len(), 30);
        assert_eq!(bigger.len(), 60);
        assert_eq!(bigger.positions().len(), 180);
    }
}
