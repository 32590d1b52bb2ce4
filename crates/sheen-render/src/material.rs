//! Applying PBR material shaders to scene nodes.

use sheen_core::MaterialInputs;
use sheen_shaders::{CustomCode, Program, ProgramPaths, ShaderLibrary};
use tracing::debug;

use crate::error::{RenderError, Result};
use crate::host::{NodeId, RenderHost, ShaderFlags, ShaderId, TextureId};

/// Which shader program a node gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    /// Static meshes.
    #[default]
    Scene,
    /// Meshes deformed by joints on the GPU.
    Skinned,
    /// Path-traced materials; not implemented.
    Tracer,
}

impl MaterialKind {
    /// Program backing this kind, if any.
    pub const fn program(self) -> Option<Program> {
        match self {
            Self::Scene => Some(Program::Pbr),
            Self::Skinned => Some(Program::PbrSkinned),
            Self::Tracer => None,
        }
    }

    pub const fn flags(self) -> ShaderFlags {
        match self {
            Self::Skinned => ShaderFlags::HARDWARE_SKINNING,
            Self::Scene | Self::Tracer => ShaderFlags::empty(),
        }
    }

    fn require_program(self) -> Result<Program> {
        self.program().ok_or_else(|| {
            RenderError::Unsupported(format!("{self:?} materials are not implemented"))
        })
    }
}

/// Inputs bound on a node alongside its material shader.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialBindings {
    pub inputs: MaterialInputs,
    pub brdf_lut: Option<TextureId>,
    pub cube_map: Option<TextureId>,
}

fn assign(
    host: &mut dyn RenderHost,
    node: NodeId,
    kind: MaterialKind,
    paths: &ProgramPaths,
) -> Result<ShaderId> {
    let shader = host.load_shader(&paths.vertex, &paths.fragment)?;
    host.clear_shader(node);
    host.set_shader(node, shader, kind.flags());
    debug!("Applied {:?} shader to node {}", kind, node.0);
    Ok(shader)
}

/// Load the stock program for `kind` and assign it to `node`, replacing any
/// previous shader.
///
/// The library's sources must already be exported.
pub fn apply_shader(
    host: &mut dyn RenderHost,
    library: &ShaderLibrary,
    node: NodeId,
    kind: MaterialKind,
) -> Result<ShaderId> {
    let program = kind.require_program()?;
    assign(host, node, kind, &library.paths(program))
}

/// Export a program with `code` spliced in, named after `node`, and assign it.
pub fn apply_custom_shader(
    host: &mut dyn RenderHost,
    library: &ShaderLibrary,
    node: NodeId,
    kind: MaterialKind,
    code: &CustomCode,
) -> Result<ShaderId> {
    let program = kind.require_program()?;
    let paths = library.export_custom(program, &format!("node{}", node.0), code)?;
    assign(host, node, kind, &paths)
}

/// Bind material parameters and lighting textures on `node`.
pub fn bind_material(
    host: &mut dyn RenderHost,
    node: NodeId,
    bindings: &MaterialBindings,
) -> Result<()> {
    let inputs = &bindings.inputs;
    inputs.validate()?;

    host.set_shader_input(node, "ibl_intensity", inputs.ibl_intensity.into());
    host.set_shader_input(node, "shadow_boost", inputs.shadow_boost.into());
    host.set_shader_input(node, "displacement_scale", inputs.displacement_scale.into());
    host.set_shader_input(node, "specular_factor", inputs.specular_factor.into());
    if let Some(lut) = bindings.brdf_lut {
        host.set_shader_input(node, "brdf_lut", lut.into());
    }
    if let Some(cube_map) = bindings.cube_map {
        host.set_shader_input(node, "cube_map", cube_map.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_programs() {
        assert_eq!(MaterialKind::Scene.program(), Some(Program::Pbr));
        assert_eq!(MaterialKind::Skinned.program(), Some(Program::PbrSkinned));
        assert_eq!(MaterialKind::Tracer.program(), None);
    }

    #[test]
    fn only_skinned_sets_hardware_skinning() {
        assert!(MaterialKind::Skinned
            .flags()
            .contains(ShaderFlags::HARDWARE_SKINNING));
        assert!(MaterialKind::Scene.flags().is_empty());
    }

    #[test]
    fn tracer_is_unsupported() {
        assert!(matches!(
            MaterialKind::Tracer.require_program(),
            Err(RenderError::Unsupported(_))
        ));
    }
}
