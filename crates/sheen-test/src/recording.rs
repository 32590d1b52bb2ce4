//! A [`RenderHost`] that records every call instead of rendering.
//!
//! Shader and texture loads go through the real filesystem, so tests observe
//! the same missing and malformed cases an engine would.

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use hashbrown::{HashMap, HashSet};
use sheen_core::LinearRgba;
use sheen_render::{
    Camera, CubeMapRig, HostError, HostResult, NodeId, RenderHost, SceneCapture, ShaderFlags,
    ShaderId, ShaderInput, TargetId, TextureId,
};

/// One recorded host call.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    LoadShader { vertex: PathBuf, fragment: PathBuf },
    ClearShader(NodeId),
    SetShader {
        node: NodeId,
        shader: ShaderId,
        flags: ShaderFlags,
    },
    SetShaderInput {
        node: NodeId,
        name: String,
        input: ShaderInput,
    },
    LoadTexture(PathBuf),
    SolidTexture(LinearRgba),
    CreateTextureRg32f { width: u32, height: u32, len: usize },
    CreateCubeMap { name: String, size: u32, parent: NodeId },
    SetPosition(NodeId, Vec3),
    SetOrientation(NodeId, Quat),
    SetTargetActive(TargetId, bool),
    RenderSceneInto,
    CreateFilterQuad(SceneCapture),
}

impl HostCall {
    /// Short name of the call, matching the trait method.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoadShader { .. } => "load_shader",
            Self::ClearShader(_) => "clear_shader",
            Self::SetShader { .. } => "set_shader",
            Self::SetShaderInput { .. } => "set_shader_input",
            Self::LoadTexture(_) => "load_texture",
            Self::SolidTexture(_) => "solid_texture",
            Self::CreateTextureRg32f { .. } => "create_texture_rg32f",
            Self::CreateCubeMap { .. } => "create_cube_map",
            Self::SetPosition(..) => "set_position",
            Self::SetOrientation(..) => "set_orientation",
            Self::SetTargetActive(..) => "set_target_active",
            Self::RenderSceneInto => "render_scene_into",
            Self::CreateFilterQuad(_) => "create_filter_quad",
        }
    }
}

/// Recording host with a scene root at node 0.
#[derive(Debug)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    next_id: u64,
    camera: Camera,
    screen_size: (u32, u32),
    inactive_targets: HashSet<TargetId>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            next_id: 1,
            camera: Camera::default(),
            screen_size: (1280, 720),
            inactive_targets: HashSet::new(),
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera returned by [`RenderHost::camera`].
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    #[must_use]
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_size = (width, height);
        self
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Space-separated call names, for snapshotting.
    pub fn call_log(&self) -> String {
        self.calls
            .iter()
            .map(HostCall::name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Latest value bound to each input name on `node`.
    pub fn inputs_on(&self, node: NodeId) -> HashMap<&str, ShaderInput> {
        let mut inputs = HashMap::new();
        for call in &self.calls {
            if let HostCall::SetShaderInput {
                node: target,
                name,
                input,
            } = call
            {
                if *target == node {
                    inputs.insert(name.as_str(), *input);
                }
            }
        }
        inputs
    }

    /// Shader files passed to the most recent `load_shader`.
    pub fn last_shader_paths(&self) -> Option<(&Path, &Path)> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::LoadShader { vertex, fragment } => Some((vertex.as_path(), fragment.as_path())),
            _ => None,
        })
    }

    pub fn is_target_active(&self, target: TargetId) -> bool {
        !self.inactive_targets.contains(&target)
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn require_file(path: &Path) -> HostResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HostError::Missing(path.to_path_buf()))
    }
}

impl RenderHost for RecordingHost {
    fn load_shader(&mut self, vertex: &Path, fragment: &Path) -> HostResult<ShaderId> {
        self.calls.push(HostCall::LoadShader {
            vertex: vertex.to_path_buf(),
            fragment: fragment.to_path_buf(),
        });
        require_file(vertex)?;
        require_file(fragment)?;
        Ok(ShaderId(self.next()))
    }

    fn clear_shader(&mut self, node: NodeId) {
        self.calls.push(HostCall::ClearShader(node));
    }

    fn set_shader(&mut self, node: NodeId, shader: ShaderId, flags: ShaderFlags) {
        self.calls.push(HostCall::SetShader {
            node,
            shader,
            flags,
        });
    }

    fn set_shader_input(&mut self, node: NodeId, name: &str, input: ShaderInput) {
        self.calls.push(HostCall::SetShaderInput {
            node,
            name: name.to_string(),
            input,
        });
    }

    fn load_texture(&mut self, path: &Path) -> HostResult<TextureId> {
        self.calls.push(HostCall::LoadTexture(path.to_path_buf()));
        require_file(path)?;
        image::open(path).map_err(|err| HostError::Malformed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Ok(TextureId(self.next()))
    }

    fn solid_texture(&mut self, color: LinearRgba) -> HostResult<TextureId> {
        self.calls.push(HostCall::SolidTexture(color));
        Ok(TextureId(self.next()))
    }

    fn create_texture_rg32f(
        &mut self,
        width: u32,
        height: u32,
        data: &[f32],
    ) -> HostResult<TextureId> {
        self.calls.push(HostCall::CreateTextureRg32f {
            width,
            height,
            len: data.len(),
        });
        if data.len() != width as usize * height as usize * 2 {
            return Err(HostError::Other(format!(
                "expected {} floats for {width}x{height}, got {}",
                width as usize * height as usize * 2,
                data.len()
            )));
        }
        Ok(TextureId(self.next()))
    }

    fn scene_root(&self) -> NodeId {
        NodeId(0)
    }

    fn create_cube_map(&mut self, name: &str, size: u32, parent: NodeId) -> HostResult<CubeMapRig> {
        self.calls.push(HostCall::CreateCubeMap {
            name: name.to_string(),
            size,
            parent,
        });
        if size == 0 {
            return Err(HostError::Other("cube map size must be non-zero".to_string()));
        }
        Ok(CubeMapRig {
            node: NodeId(self.next()),
            target: TargetId(self.next()),
            texture: TextureId(self.next()),
        })
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) {
        self.calls.push(HostCall::SetPosition(node, position));
    }

    fn set_orientation(&mut self, node: NodeId, orientation: Quat) {
        self.calls.push(HostCall::SetOrientation(node, orientation));
    }

    fn camera(&self) -> Camera {
        self.camera
    }

    fn set_target_active(&mut self, target: TargetId, active: bool) {
        self.calls.push(HostCall::SetTargetActive(target, active));
        if active {
            self.inactive_targets.remove(&target);
        } else {
            self.inactive_targets.insert(target);
        }
    }

    fn render_scene_into(&mut self) -> HostResult<SceneCapture> {
        self.calls.push(HostCall::RenderSceneInto);
        let (width, height) = self.screen_size;
        Ok(SceneCapture {
            color: TextureId(self.next()),
            depth: TextureId(self.next()),
            aux: TextureId(self.next()),
            width,
            height,
        })
    }

    fn create_filter_quad(&mut self, capture: &SceneCapture) -> HostResult<NodeId> {
        self.calls.push(HostCall::CreateFilterQuad(*capture));
        Ok(NodeId(self.next()))
    }
}
