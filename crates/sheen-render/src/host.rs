//! The seam between the toolkit and the host engine.
//!
//! Scene graph, textures, render targets and shader compilation all belong to
//! the host. The toolkit only issues calls through [`RenderHost`], which the
//! embedding application implements over its engine.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use sheen_core::LinearRgba;
use thiserror::Error;

use crate::camera::Camera;

/// Scene-graph node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Compiled shader handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub u64);

/// Texture handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Render target handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

bitflags! {
    /// Flags attached to a shader assignment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderFlags: u8 {
        /// Joint transforms are applied in the vertex shader.
        const HARDWARE_SKINNING = 0b0000_0001;
    }
}

/// Value bound to a named shader input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderInput {
    Float(f32),
    Int(i32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureId),
}

impl From<f32> for ShaderInput {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for ShaderInput {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<Vec2> for ShaderInput {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for ShaderInput {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Mat4> for ShaderInput {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

impl From<TextureId> for ShaderInput {
    fn from(value: TextureId) -> Self {
        Self::Texture(value)
    }
}

/// Host objects backing the environment cube map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeMapRig {
    /// Node carrying the six cube cameras.
    pub node: NodeId,
    pub target: TargetId,
    /// Texture the cube map renders into.
    pub texture: TextureId,
}

/// Textures the scene is rendered into for the screen-space pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCapture {
    pub color: TextureId,
    pub depth: TextureId,
    /// View-space normals.
    pub aux: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Errors reported by the host engine.
#[derive(Error, Debug)]
pub enum HostError {
    /// The resource does not exist; callers may fall back.
    #[error("Missing resource: {}", .0.display())]
    Missing(PathBuf),

    /// The resource exists but cannot be used.
    #[error("Malformed resource {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// The host lacks a capability.
    #[error("Unsupported by host: {0}")]
    Unsupported(String),

    #[error("Host error: {0}")]
    Other(String),
}

/// Result type for host calls.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Engine operations the toolkit relies on.
pub trait RenderHost {
    /// Compile a shader program from files on disk.
    fn load_shader(&mut self, vertex: &Path, fragment: &Path) -> HostResult<ShaderId>;

    /// Remove any shader previously assigned to `node`.
    fn clear_shader(&mut self, node: NodeId);

    fn set_shader(&mut self, node: NodeId, shader: ShaderId, flags: ShaderFlags);

    fn set_shader_input(&mut self, node: NodeId, name: &str, input: ShaderInput);

    /// Load a texture file. Must return [`HostError::Missing`] for absent files.
    fn load_texture(&mut self, path: &Path) -> HostResult<TextureId>;

    /// A 1x1 texture of a single color.
    fn solid_texture(&mut self, color: LinearRgba) -> HostResult<TextureId>;

    /// A two-channel float texture from row-major `(r, g)` pairs.
    fn create_texture_rg32f(&mut self, width: u32, height: u32, data: &[f32])
        -> HostResult<TextureId>;

    fn scene_root(&self) -> NodeId;

    /// Create an auto-updating cube-map render target under `parent`.
    fn create_cube_map(&mut self, name: &str, size: u32, parent: NodeId)
        -> HostResult<CubeMapRig>;

    fn set_position(&mut self, node: NodeId, position: Vec3);

    fn set_orientation(&mut self, node: NodeId, orientation: Quat);

    /// The active camera.
    fn camera(&self) -> Camera;

    fn set_target_active(&mut self, target: TargetId, active: bool);

    /// Redirect scene rendering into offscreen color, depth and aux textures.
    fn render_scene_into(&mut self) -> HostResult<SceneCapture>;

    /// Create the full-screen quad that composites `capture`.
    fn create_filter_quad(&mut self, capture: &SceneCapture) -> HostResult<NodeId>;
}
