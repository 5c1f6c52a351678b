//! Named node resolution for the portal scene bundle
//!
//! The baked scene is authored with four named nodes that receive the
//! app's materials. Lookup is by exact name against the bundle's children.
//! Each role resolves independently, so one missing node does not prevent
//! the other three from being assigned.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A named node expected in the scene bundle was not found
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Scene bundle has no node named '{node}'")]
pub struct AssetResolutionError {
    pub node: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Failed to load asset {path}: {reason}")]
    LoadFailure { path: String, reason: String },
    #[error("Asset {path} requires {extension}, which the glTF loader cannot decode; re-export it without mesh compression")]
    UnsupportedCompression { path: String, extension: String },
    #[error(transparent)]
    Resolution(#[from] AssetResolutionError),
}

/// Mesh compression extensions the glTF loader has no decoder for
pub const UNSUPPORTED_EXTENSIONS: [&str; 2] =
    ["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

impl AssetError {
    /// Classify a loader failure, naming the compression extension when
    /// that is what the loader tripped over
    pub fn load_failure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        let reason = reason.into();
        match UNSUPPORTED_EXTENSIONS.iter().find(|ext| reason.contains(*ext)) {
            Some(extension) => AssetError::UnsupportedCompression {
                path,
                extension: extension.to_string(),
            },
            None => AssetError::LoadFailure { path, reason },
        }
    }
}

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_JSON_CHUNK: u32 = 0x4E4F_534A;

#[derive(Deserialize)]
struct GltfExtensions {
    #[serde(default, rename = "extensionsRequired")]
    required: Vec<String>,
}

/// `extensionsRequired` of a binary (`.glb`) or JSON (`.gltf`) bundle
pub fn required_extensions(path: &str, bytes: &[u8]) -> Result<Vec<String>, AssetError> {
    let malformed = |reason: &str| AssetError::LoadFailure {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let json = if bytes.starts_with(GLB_MAGIC) {
        let word = |at: usize| {
            bytes
                .get(at..at + 4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        };
        let chunk_len = word(12).ok_or_else(|| malformed("truncated GLB header"))? as usize;
        if word(16) != Some(GLB_JSON_CHUNK) {
            return Err(malformed("first GLB chunk is not JSON"));
        }
        bytes
            .get(20..20 + chunk_len)
            .ok_or_else(|| malformed("truncated GLB JSON chunk"))?
    } else {
        bytes
    };

    let parsed: GltfExtensions =
        serde_json::from_slice(json).map_err(|e| malformed(&e.to_string()))?;
    Ok(parsed.required)
}

/// Reject bundles that need a mesh decoder the loader does not have
pub fn check_bundle_compression(path: &str, bytes: &[u8]) -> Result<(), AssetError> {
    let required = required_extensions(path, bytes)?;
    match required
        .iter()
        .find(|ext| UNSUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    {
        Some(extension) => Err(AssetError::UnsupportedCompression {
            path: path.to_string(),
            extension: extension.clone(),
        }),
        None => Ok(()),
    }
}

/// Material a resolved node receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialSlot {
    Baked,
    PoleLightEmission,
    PortalEmission,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Merged,
    PoleLightA,
    PoleLightB,
    PortalEmission,
}

impl NodeRole {
    pub const ALL: [NodeRole; 4] = [
        NodeRole::Merged,
        NodeRole::PoleLightA,
        NodeRole::PoleLightB,
        NodeRole::PortalEmission,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Node name as authored in the bundle
    pub fn node_name(self) -> &'static str {
        match self {
            NodeRole::Merged => "Merged",
            NodeRole::PoleLightA => "PoleLightEmissionA",
            NodeRole::PoleLightB => "PoleLightEmissionB",
            NodeRole::PortalEmission => "PortalEmission",
        }
    }

    pub fn material(self) -> MaterialSlot {
        match self {
            NodeRole::Merged => MaterialSlot::Baked,
            NodeRole::PoleLightA | NodeRole::PoleLightB => MaterialSlot::PoleLightEmission,
            NodeRole::PortalEmission => MaterialSlot::PortalEmission,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.node_name())
    }
}

/// Lookup outcome for every role, stored in [`NodeRole::ALL`] order
#[derive(Debug, Clone)]
pub struct NodeResolution<N> {
    entries: Vec<(NodeRole, Result<N, AssetResolutionError>)>,
}

impl<N> NodeResolution<N> {
    pub fn get(&self, role: NodeRole) -> &Result<N, AssetResolutionError> {
        &self.entries[role.index()].1
    }

    /// Resolved `(role, node)` pairs
    pub fn resolved(&self) -> impl Iterator<Item = (NodeRole, &N)> {
        self.entries
            .iter()
            .filter_map(|(role, res)| res.as_ref().ok().map(|n| (*role, n)))
    }

    pub fn errors(&self) -> impl Iterator<Item = &AssetResolutionError> {
        self.entries.iter().filter_map(|(_, res)| res.as_ref().err())
    }
}

/// Resolve every [`NodeRole`] against `(name, node)` children by exact name.
/// The first child with a matching name wins.
pub fn resolve_nodes<'a, N, I>(children: I) -> NodeResolution<N>
where
    I: IntoIterator<Item = (&'a str, N)>,
{
    let mut found: Vec<(NodeRole, N)> = Vec::with_capacity(NodeRole::ALL.len());
    for (name, node) in children {
        if let Some(role) = NodeRole::ALL.into_iter().find(|r| r.node_name() == name) {
            if !found.iter().any(|(r, _)| *r == role) {
                found.push((role, node));
            }
        }
    }

    let entries = NodeRole::ALL
        .into_iter()
        .map(|role| {
            let result = match found.iter().position(|(r, _)| *r == role) {
                Some(idx) => Ok(found.swap_remove(idx).1),
                None => Err(AssetResolutionError {
                    node: role.node_name().to_string(),
                }),
            };
            (role, result)
        })
        .collect();

    NodeResolution { entries }
}

/// Load progress of the scene bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SceneReadiness {
    #[default]
    Loading,
    /// All four nodes were resolved and assigned
    Ready,
    /// The bundle loaded but some nodes were missing
    Partial { missing: Vec<String> },
    /// The bundle could not be loaded; the rest of the scene keeps running
    Failed(AssetError),
}

impl SceneReadiness {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SceneReadiness::Loading)
    }

    /// Settle from a resolution outcome. Only the first transition out of
    /// `Loading` takes effect; returns whether it did.
    pub fn settle<N>(&mut self, resolution: &NodeResolution<N>) -> bool {
        if self.is_settled() {
            return false;
        }
        let missing: Vec<String> = resolution.errors().map(|e| e.node.clone()).collect();
        *self = if missing.is_empty() {
            SceneReadiness::Ready
        } else {
            SceneReadiness::Partial { missing }
        };
        true
    }

    pub fn fail(&mut self, error: AssetError) -> bool {
        if self.is_settled() {
            return false;
        }
        *self = SceneReadiness::Failed(error);
        true
    }
}
