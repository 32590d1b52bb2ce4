//! Orchestration of the whole PBR integration.
//!
//! [`PbrPipeline`] owns every piece of setup state. Each setup step records
//! itself in [`InitState`]; calling a step again is a no-op.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sheen_brdf::LutImage;
use sheen_core::constants::DEFAULT_LUT_FILE;
use sheen_core::{LinearRgba, MaterialInputs};
use sheen_shaders::{CleanupReport, CustomCode, ShaderLibrary};
use tracing::{debug, info};

use crate::environment::{DeferredToggleQueue, EnvironmentConfig, EnvironmentRig};
use crate::error::Result;
use crate::host::{NodeId, RenderHost, ShaderId};
use crate::lut_texture::BrdfLut;
use crate::material::{self, MaterialBindings, MaterialKind};
use crate::screenspace::{ScreenSpaceChain, ScreenSpaceSettings};
use crate::state::InitState;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory shader sources are exported into for the host's loader.
    pub shader_dir: PathBuf,
    /// BRDF LUT image to bind.
    pub lut_path: PathBuf,
    /// Placeholder color used when the LUT image is absent.
    pub lut_fill: LinearRgba,
    pub environment: EnvironmentConfig,
    /// Build the screen-space chain during [`PbrPipeline::setup`].
    pub enable_screen_space: bool,
    pub screen_space: ScreenSpaceSettings,
    /// Inputs bound with every material shader.
    pub material: MaterialInputs,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("."),
            lut_path: PathBuf::from(DEFAULT_LUT_FILE),
            lut_fill: LinearRgba::LUT_FALLBACK,
            environment: EnvironmentConfig::default(),
            enable_screen_space: false,
            screen_space: ScreenSpaceSettings::default(),
            material: MaterialInputs::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_lut_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lut_path = path.into();
        self
    }

    #[must_use]
    pub fn with_lut_fill(mut self, fill: LinearRgba) -> Self {
        self.lut_fill = fill;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentConfig) -> Self {
        self.environment = environment;
        self
    }

    /// Enable the screen-space chain with `settings`.
    #[must_use]
    pub fn with_screen_space(mut self, settings: ScreenSpaceSettings) -> Self {
        self.enable_screen_space = true;
        self.screen_space = settings;
        self
    }

    #[must_use]
    pub fn with_material(mut self, material: MaterialInputs) -> Self {
        self.material = material;
        self
    }
}

/// PBR integration state for one host scene.
#[derive(Debug)]
pub struct PbrPipeline {
    config: PipelineConfig,
    library: ShaderLibrary,
    state: InitState,
    frame: u64,
    lut: Option<BrdfLut>,
    environment: Option<EnvironmentRig>,
    screen_space: Option<ScreenSpaceChain>,
    toggles: DeferredToggleQueue,
    /// Nodes carrying a material shader; they pin their own lighting textures.
    material_nodes: BTreeSet<NodeId>,
}

impl PbrPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let library = ShaderLibrary::new(config.shader_dir.clone());
        Self {
            config,
            library,
            state: InitState::empty(),
            frame: 0,
            lut: None,
            environment: None,
            screen_space: None,
            toggles: DeferredToggleQueue::new(),
            material_nodes: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn library(&self) -> &ShaderLibrary {
        &self.library
    }

    pub const fn state(&self) -> InitState {
        self.state
    }

    /// Number of completed [`update`](Self::update) calls.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    pub fn lut(&self) -> Option<&BrdfLut> {
        self.lut.as_ref()
    }

    pub fn environment(&self) -> Option<&EnvironmentRig> {
        self.environment.as_ref()
    }

    pub fn screen_space(&self) -> Option<&ScreenSpaceChain> {
        self.screen_space.as_ref()
    }

    pub fn toggles(&self) -> &DeferredToggleQueue {
        &self.toggles
    }

    /// Nodes that received a material through this pipeline.
    pub fn material_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.material_nodes.iter().copied()
    }

    /// Run every configured setup step.
    pub fn setup(&mut self, host: &mut dyn RenderHost) -> Result<()> {
        self.export_shaders()?;
        self.bind_lut(host)?;
        self.setup_environment(host)?;
        if self.config.enable_screen_space {
            self.setup_screen_space(host)?;
        }
        info!("PBR pipeline ready ({:?})", self.state);
        Ok(())
    }

    /// Write shader sources to the configured directory.
    pub fn export_shaders(&mut self) -> Result<()> {
        if self.state.shaders_exported() {
            return Ok(());
        }
        self.library.export()?;
        self.state |= InitState::SHADERS_EXPORTED;
        Ok(())
    }

    /// Load the configured LUT (or its placeholder) and bind it on the scene
    /// root.
    pub fn bind_lut(&mut self, host: &mut dyn RenderHost) -> Result<()> {
        if self.state.lut_bound() {
            return Ok(());
        }
        let lut = BrdfLut::load(host, &self.config.lut_path, self.config.lut_fill)?;
        self.install_lut(host, lut);
        Ok(())
    }

    /// Replace the bound LUT with an in-memory table.
    pub fn use_lut(&mut self, host: &mut dyn RenderHost, image: &LutImage) -> Result<()> {
        let lut = BrdfLut::upload(host, image)?;
        self.install_lut(host, lut);
        Ok(())
    }

    fn install_lut(&mut self, host: &mut dyn RenderHost, lut: BrdfLut) {
        let root = host.scene_root();
        host.set_shader_input(root, "brdf_lut", lut.texture().into());
        for &node in &self.material_nodes {
            host.set_shader_input(node, "brdf_lut", lut.texture().into());
        }
        if !self.material_nodes.is_empty() {
            debug!("Rebound BRDF LUT on {} material nodes", self.material_nodes.len());
        }
        self.lut = Some(lut);
        self.state |= InitState::LUT_BOUND;
    }

    /// Build the environment cube map and bind it on the scene root.
    pub fn setup_environment(&mut self, host: &mut dyn RenderHost) -> Result<()> {
        if self.state.environment() {
            return Ok(());
        }
        let rig = EnvironmentRig::build(host, &self.config.environment)?;
        let root = host.scene_root();
        host.set_shader_input(root, "cube_map", rig.texture().into());
        for &node in &self.material_nodes {
            host.set_shader_input(node, "cube_map", rig.texture().into());
        }
        rig.follow_camera(host);
        self.environment = Some(rig);
        self.state |= InitState::ENVIRONMENT;
        Ok(())
    }

    /// Build the screen-space chain.
    ///
    /// The environment cube map is paused while the scene capture starts.
    pub fn setup_screen_space(&mut self, host: &mut dyn RenderHost) -> Result<()> {
        if self.state.screen_space() {
            return Ok(());
        }
        self.config.screen_space.validate()?;
        if let Some(rig) = &self.environment {
            rig.pause(
                host,
                &mut self.toggles,
                self.frame,
                self.config.environment.pause_frames,
            );
        }
        let chain = ScreenSpaceChain::build(host, &self.library, &self.config.screen_space)?;
        self.screen_space = Some(chain);
        self.state |= InitState::SCREEN_SPACE;
        Ok(())
    }

    /// Change screen-space settings, rebinding them if the chain exists.
    pub fn set_screen_space_settings(
        &mut self,
        host: &mut dyn RenderHost,
        settings: ScreenSpaceSettings,
    ) -> Result<()> {
        if let Some(chain) = &self.screen_space {
            chain.apply_settings(host, &settings)?;
        } else {
            settings.validate()?;
        }
        self.config.screen_space = settings;
        Ok(())
    }

    fn bindings(&self) -> MaterialBindings {
        MaterialBindings {
            inputs: self.config.material,
            brdf_lut: self.lut.as_ref().map(BrdfLut::texture),
            cube_map: self.environment.as_ref().map(EnvironmentRig::texture),
        }
    }

    /// Assign the stock shader for `kind` to `node` and bind its inputs.
    pub fn apply_material(
        &mut self,
        host: &mut dyn RenderHost,
        node: NodeId,
        kind: MaterialKind,
    ) -> Result<ShaderId> {
        self.config.material.validate()?;
        self.export_shaders()?;
        let shader = material::apply_shader(host, &self.library, node, kind)?;
        material::bind_material(host, node, &self.bindings())?;
        self.material_nodes.insert(node);
        Ok(shader)
    }

    /// Like [`apply_material`](Self::apply_material) with custom code
    /// spliced into the shader.
    pub fn apply_custom_material(
        &mut self,
        host: &mut dyn RenderHost,
        node: NodeId,
        kind: MaterialKind,
        code: &CustomCode,
    ) -> Result<ShaderId> {
        self.config.material.validate()?;
        self.export_shaders()?;
        let shader = material::apply_custom_shader(host, &self.library, node, kind, code)?;
        material::bind_material(host, node, &self.bindings())?;
        self.material_nodes.insert(node);
        Ok(shader)
    }

    /// Per-frame work: due toggles, rig tracking and camera-dependent inputs.
    pub fn update(&mut self, host: &mut dyn RenderHost) {
        let applied = self.toggles.process(host, self.frame);
        if applied > 0 {
            debug!("Applied {} deferred toggles", applied);
        }

        let root = host.scene_root();
        let position = host.camera().position;
        host.set_shader_input(root, "camera_world_pos", position.into());

        if let Some(rig) = &self.environment {
            rig.follow_camera(host);
        }
        if let Some(chain) = &self.screen_space {
            chain.update(host);
        }
        self.frame += 1;
    }

    /// Drop the screen-space chain and delete its exported shaders.
    pub fn teardown(&mut self) -> Result<CleanupReport> {
        self.screen_space = None;
        self.state.remove(InitState::SCREEN_SPACE);
        let report = self.library.remove_screenspace()?;
        info!(
            "Removed {} screen-space shader files ({} already absent)",
            report.removed.len(),
            report.missing.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_standard_lut() {
        let config = PipelineConfig::default();
        assert_eq!(config.lut_path, PathBuf::from("output_brdf_lut.png"));
        assert_eq!(config.lut_fill, LinearRgba::LUT_FALLBACK);
        assert!(!config.enable_screen_space);
    }

    #[test]
    fn screen_space_builder_enables_chain() {
        let config = PipelineConfig::new().with_screen_space(ScreenSpaceSettings::disabled());
        assert!(config.enable_screen_space);
        assert!(!config.screen_space.bloom.enabled);
    }

    #[test]
    fn new_pipeline_has_no_state() {
        let pipeline = PbrPipeline::new(PipelineConfig::new().with_shader_dir("shaders"));
        assert!(pipeline.state().is_empty());
        assert_eq!(pipeline.frame(), 0);
        assert_eq!(pipeline.library().dir(), std::path::Path::new("shaders"));
    }
}
