//! Post-processing pass list

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomSettings {
    pub intensity: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            intensity: 0.1,
            radius: 0.01,
            threshold: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMappingMode {
    #[default]
    None,
    Reinhard,
    AcesFitted,
    #[serde(rename = "agx")]
    AgX,
    TonyMcMapface,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostPass {
    Bloom(BloomSettings),
    ToneMapping { mode: ToneMappingMode, exposure: f32 },
}

/// One entry in the pass list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassEntry {
    #[serde(flatten)]
    pub pass: PostPass,
    #[serde(default)]
    pub enabled: bool,
}

/// Passes composed after the base scene render, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessing {
    #[serde(default = "default_passes")]
    pub passes: Vec<PassEntry>,
}

impl Default for PostProcessing {
    fn default() -> Self {
        Self {
            passes: default_passes(),
        }
    }
}

fn default_passes() -> Vec<PassEntry> {
    vec![
        PassEntry {
            pass: PostPass::Bloom(BloomSettings::default()),
            enabled: false,
        },
        // Filmic curve at 1.5 exposure, the closest available to a Cineon curve
        PassEntry {
            pass: PostPass::ToneMapping {
                mode: ToneMappingMode::AcesFitted,
                exposure: 1.5,
            },
            enabled: false,
        },
    ]
}

impl PostProcessing {
    /// Enabled passes in order
    pub fn active(&self) -> impl Iterator<Item = &PostPass> {
        self.passes.iter().filter(|e| e.enabled).map(|e| &e.pass)
    }

    /// Settings of the first enabled bloom pass
    pub fn bloom(&self) -> Option<BloomSettings> {
        self.active().find_map(|p| match p {
            PostPass::Bloom(settings) => Some(*settings),
            _ => None,
        })
    }

    /// Mode and exposure of the first enabled tone mapping pass
    pub fn tone_mapping(&self) -> Option<(ToneMappingMode, f32)> {
        self.active().find_map(|p| match p {
            PostPass::ToneMapping { mode, exposure } => Some((*mode, *exposure)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_available_but_disabled() {
        let post = PostProcessing::default();
        assert!(post
            .passes
            .iter()
            .any(|e| matches!(e.pass, PostPass::Bloom(_))));
        assert_eq!(post.active().count(), 0);
        assert_eq!(post.bloom(), None);
    }

    #[test]
    fn test_tone_mapping_pass_defaults() {
        let mut post = PostProcessing::default();
        assert_eq!(post.tone_mapping(), None);

        post.passes[1].enabled = true;
        assert_eq!(post.tone_mapping(), Some((ToneMappingMode::AcesFitted, 1.5)));
    }

    #[test]
    fn test_enable_bloom() {
        let mut post = PostProcessing::default();
        post.passes[0].enabled = true;
        assert_eq!(post.bloom(), Some(BloomSettings::default()));
        assert_eq!(post.tone_mapping(), None);
    }

    #[test]
    fn test_toml_pass_list() {
        let toml = r#"
[[passes]]
kind = "tone_mapping"
mode = "agx"
exposure = 1.2
enabled = true
"#;
        let post: PostProcessing = toml::from_str(toml).unwrap();
        assert_eq!(post.tone_mapping(), Some((ToneMappingMode::AgX, 1.2)));
    }
}
