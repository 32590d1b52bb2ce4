//! Host-engine integration for the sheen PBR toolkit.
//!
//! This crate provides:
//! - The [`RenderHost`] seam the embedding engine implements
//! - Material shader application with custom code slots
//! - An IBL cube-map rig that follows the camera
//! - The screen-space post chain (SSAO, SSR, bloom, color grading)
//! - BRDF LUT binding with a placeholder fallback
//! - [`PbrPipeline`], which owns setup state and per-frame updates

pub mod camera;
pub mod environment;
pub mod error;
pub mod host;
pub mod lut_texture;
pub mod material;
pub mod pipeline;
pub mod screenspace;
pub mod state;

pub use camera::Camera;
pub use environment::{DeferredToggleQueue, EnvironmentConfig, EnvironmentRig, PendingToggle};
pub use error::{RenderError, Result};
pub use host::{
    CubeMapRig, HostError, HostResult, NodeId, RenderHost, SceneCapture, ShaderFlags, ShaderId,
    ShaderInput, TargetId, TextureId,
};
pub use lut_texture::{BrdfLut, LutOrigin};
pub use material::{apply_custom_shader, apply_shader, bind_material, MaterialBindings, MaterialKind};
pub use pipeline::{PbrPipeline, PipelineConfig};
pub use screenspace::{
    BloomSettings, ColorGrading, ScreenSpaceChain, ScreenSpaceSettings, SsaoSettings, SsrSettings,
};
pub use state::InitState;
