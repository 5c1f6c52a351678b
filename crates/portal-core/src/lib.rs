//! Portal Core - Renderer-independent model of the portal scene
//!
//! This crate holds everything about the scene that does not need a GPU:
//! - Frame clock and per-frame time propagation
//! - Shader uniform slots and the live scene state
//! - Viewport sizing with the pixel-ratio cap
//! - Firefly particle field generation
//! - Tweak panel parameter bindings
//! - Named node resolution for the scene bundle
//! - Post-processing pass list and TOML configuration

pub mod assets;
pub mod clock;
pub mod color;
pub mod config;
pub mod frame;
pub mod params;
pub mod particles;
pub mod postprocess;
pub mod state;
pub mod uniforms;
pub mod viewport;

pub use assets::{
    check_bundle_compression, required_extensions, resolve_nodes, AssetError,
    AssetResolutionError, MaterialSlot, NodeResolution, NodeRole, SceneReadiness,
    UNSUPPORTED_EXTENSIONS,
};
pub use clock::{ElapsedTime, FrameClock};
pub use color::{ColorParseError, Rgb};
pub use config::{load_config, ConfigError, PortalConfig};
pub use frame::FrameError;
pub use params::{
    BindingKind, Change, ColorBindingKind, Folder, NumericRange, ParamError, ParamValue,
    Parameter,
};
pub use particles::{FireflyConfig, FireflyField};
pub use postprocess::{BloomSettings, PassEntry, PostPass, PostProcessing, ToneMappingMode};
pub use state::SceneState;
pub use uniforms::{FireflyUniforms, PortalUniforms, TimeDriven, Uniform, UniformId};
pub use viewport::{capped_pixel_ratio, Viewport, ViewportSize, MAX_PIXEL_RATIO};
