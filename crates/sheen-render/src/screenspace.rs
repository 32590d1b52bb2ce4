//! Screen-space post chain: SSAO, SSR, bloom and color grading.
//!
//! The scene is redirected into offscreen color, depth and normal textures,
//! and a full-screen quad running `screenspace_f.frag` composites them.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use sheen_core::Error as CoreError;
use sheen_shaders::{Program, ShaderLibrary};
use tracing::{debug, info};

use crate::error::Result;
use crate::host::{NodeId, RenderHost, SceneCapture, ShaderFlags};

/// Loop bounds compiled into the composite shader.
pub const MAX_SSAO_SAMPLES: u32 = 64;
pub const MAX_SSR_SAMPLES: u32 = 256;
pub const MAX_BLOOM_SAMPLES: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub enabled: bool,
    pub intensity: f32,
    /// Luminance above which pixels bloom.
    pub threshold: f32,
    /// Blur tap spacing in pixels.
    pub blur_width: f32,
    pub samples: u32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.5,
            threshold: 0.7,
            blur_width: 1.5,
            samples: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrSettings {
    pub enabled: bool,
    pub intensity: f32,
    /// View-space march distance per step.
    pub step: f32,
    pub fresnel_pow: f32,
    pub samples: u32,
    /// Depth difference accepted as a hit.
    pub reflection_threshold: f32,
}

impl Default for SsrSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.5,
            step: 0.04,
            fresnel_pow: 3.0,
            samples: 128,
            reflection_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    pub enabled: bool,
    pub samples: u32,
    pub radius: f32,
    pub strength: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 16,
            radius: 0.5,
            strength: 1.0,
        }
    }
}

/// Final color grading. Disabled grading binds the identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGrading {
    pub enabled: bool,
    /// Hue, saturation and value multipliers.
    pub hsv_scale: [f32; 3],
    pub exposure: f32,
    pub gamma: f32,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self {
            enabled: true,
            hsv_scale: [1.0, 1.0, 1.0],
            exposure: 1.0,
            gamma: 1.0,
        }
    }
}

/// Settings for the whole post chain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSpaceSettings {
    pub bloom: BloomSettings,
    pub ssr: SsrSettings,
    pub ssao: SsaoSettings,
    pub grading: ColorGrading,
}

fn check_float(name: &str, value: f32) -> std::result::Result<(), CoreError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::OutOfRange(format!("{name} = {value}")))
    }
}

fn check_samples(name: &str, value: u32, max: u32) -> std::result::Result<(), CoreError> {
    if value <= max {
        Ok(())
    } else {
        Err(CoreError::OutOfRange(format!("{name} = {value} (max {max})")))
    }
}

impl ScreenSpaceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn every effect off.
    #[must_use]
    pub fn disabled() -> Self {
        let mut settings = Self::default();
        settings.bloom.enabled = false;
        settings.ssr.enabled = false;
        settings.ssao.enabled = false;
        settings.grading.enabled = false;
        settings
    }

    #[must_use]
    pub fn with_bloom(mut self, bloom: BloomSettings) -> Self {
        self.bloom = bloom;
        self
    }

    #[must_use]
    pub fn with_ssr(mut self, ssr: SsrSettings) -> Self {
        self.ssr = ssr;
        self
    }

    #[must_use]
    pub fn with_ssao(mut self, ssao: SsaoSettings) -> Self {
        self.ssao = ssao;
        self
    }

    #[must_use]
    pub fn with_grading(mut self, grading: ColorGrading) -> Self {
        self.grading = grading;
        self
    }

    /// Reject values the composite shader cannot handle.
    pub fn validate(&self) -> std::result::Result<(), CoreError> {
        let Self {
            bloom,
            ssr,
            ssao,
            grading,
        } = self;
        check_float("bloom.intensity", bloom.intensity)?;
        check_float("bloom.threshold", bloom.threshold)?;
        check_float("bloom.blur_width", bloom.blur_width)?;
        check_samples("bloom.samples", bloom.samples, MAX_BLOOM_SAMPLES)?;
        check_float("ssr.intensity", ssr.intensity)?;
        check_float("ssr.fresnel_pow", ssr.fresnel_pow)?;
        check_float("ssr.reflection_threshold", ssr.reflection_threshold)?;
        check_samples("ssr.samples", ssr.samples, MAX_SSR_SAMPLES)?;
        if ssr.enabled && !(ssr.step.is_finite() && ssr.step > 0.0) {
            return Err(CoreError::OutOfRange(format!("ssr.step = {}", ssr.step)));
        }
        check_float("ssao.radius", ssao.radius)?;
        check_float("ssao.strength", ssao.strength)?;
        check_samples("ssao.samples", ssao.samples, MAX_SSAO_SAMPLES)?;
        for (channel, value) in ["hue", "saturation", "value"].iter().zip(grading.hsv_scale) {
            check_float(&format!("grading.hsv_scale.{channel}"), value)?;
        }
        check_float("grading.exposure", grading.exposure)?;
        if grading.enabled && !(grading.gamma.is_finite() && grading.gamma > 0.0) {
            return Err(CoreError::OutOfRange(format!(
                "grading.gamma = {}",
                grading.gamma
            )));
        }
        Ok(())
    }

    /// Bind every setting on `node`; disabled effects bind zero intensity
    /// and zero samples.
    pub fn bind(&self, host: &mut dyn RenderHost, node: NodeId) {
        let on = |enabled: bool, value: f32| if enabled { value } else { 0.0 };
        let samples = |enabled: bool, value: u32| {
            if enabled {
                i32::try_from(value).unwrap_or(i32::MAX)
            } else {
                0
            }
        };

        let bloom = &self.bloom;
        host.set_shader_input(node, "bloom_intensity", on(bloom.enabled, bloom.intensity).into());
        host.set_shader_input(node, "bloom_threshold", bloom.threshold.into());
        host.set_shader_input(node, "bloom_blur_width", bloom.blur_width.into());
        host.set_shader_input(node, "bloom_samples", samples(bloom.enabled, bloom.samples).into());

        let ssr = &self.ssr;
        host.set_shader_input(node, "ssr_intensity", on(ssr.enabled, ssr.intensity).into());
        host.set_shader_input(node, "ssr_step", ssr.step.into());
        host.set_shader_input(node, "ssr_fresnel_pow", ssr.fresnel_pow.into());
        host.set_shader_input(node, "ssr_samples", samples(ssr.enabled, ssr.samples).into());
        host.set_shader_input(node, "reflection_threshold", ssr.reflection_threshold.into());

        let ssao = &self.ssao;
        host.set_shader_input(node, "ssao_samples", samples(ssao.enabled, ssao.samples).into());
        host.set_shader_input(node, "ssao_radius", ssao.radius.into());
        host.set_shader_input(node, "ssao_strength", on(ssao.enabled, ssao.strength).into());

        let grading = if self.grading.enabled {
            self.grading
        } else {
            ColorGrading::default()
        };
        host.set_shader_input(node, "hsv_scale", Vec3::from(grading.hsv_scale).into());
        host.set_shader_input(node, "exposure", grading.exposure.into());
        host.set_shader_input(node, "gamma", grading.gamma.into());
    }
}

/// The composite quad and the captures it reads.
#[derive(Debug, Clone, Copy)]
pub struct ScreenSpaceChain {
    quad: NodeId,
    capture: SceneCapture,
}

impl ScreenSpaceChain {
    /// Export the composite shader, capture the scene and build the quad.
    pub fn build(
        host: &mut dyn RenderHost,
        library: &ShaderLibrary,
        settings: &ScreenSpaceSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let paths = library.export_program(Program::ScreenSpace)?;
        let capture = host.render_scene_into()?;
        let quad = host.create_filter_quad(&capture)?;
        let shader = host.load_shader(&paths.vertex, &paths.fragment)?;
        host.set_shader(quad, shader, ShaderFlags::empty());

        host.set_shader_input(quad, "screen_texture", capture.color.into());
        host.set_shader_input(quad, "depth_texture", capture.depth.into());
        host.set_shader_input(quad, "normal_texture", capture.aux.into());
        host.set_shader_input(
            quad,
            "screen_size",
            Vec2::new(capture.width as f32, capture.height as f32).into(),
        );
        settings.bind(host, quad);

        let chain = Self { quad, capture };
        chain.update(host);
        info!(
            "Screen-space chain ready at {}x{}",
            capture.width, capture.height
        );
        Ok(chain)
    }

    pub const fn quad(&self) -> NodeId {
        self.quad
    }

    pub const fn capture(&self) -> &SceneCapture {
        &self.capture
    }

    /// Rebind settings after a change.
    pub fn apply_settings(
        &self,
        host: &mut dyn RenderHost,
        settings: &ScreenSpaceSettings,
    ) -> Result<()> {
        settings.validate()?;
        settings.bind(host, self.quad);
        debug!("Rebound screen-space settings");
        Ok(())
    }

    /// Bind the active camera's projection and its inverse.
    pub fn update(&self, host: &mut dyn RenderHost) {
        let camera = host.camera();
        host.set_shader_input(self.quad, "proj_mat", camera.projection_matrix().into());
        host.set_shader_input(
            self.quad,
            "inv_proj_mat",
            camera.inverse_projection_matrix().into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ScreenSpaceSettings::default().validate().unwrap();
        ScreenSpaceSettings::disabled().validate().unwrap();
    }

    #[test]
    fn sample_counts_are_bounded_by_shader_loops() {
        let settings = ScreenSpaceSettings::new().with_ssao(SsaoSettings {
            samples: MAX_SSAO_SAMPLES + 1,
            ..SsaoSettings::default()
        });
        assert!(matches!(
            settings.validate(),
            Err(CoreError::OutOfRange(message)) if message.starts_with("ssao.samples")
        ));
    }

    #[test]
    fn zero_gamma_is_rejected_only_when_grading() {
        let grading = ColorGrading {
            gamma: 0.0,
            ..ColorGrading::default()
        };
        assert!(ScreenSpaceSettings::new()
            .with_grading(grading)
            .validate()
            .is_err());
        let off = ColorGrading {
            enabled: false,
            ..grading
        };
        assert!(ScreenSpaceSettings::new().with_grading(off).validate().is_ok());
    }

    #[test]
    fn negative_intensity_is_rejected() {
        let bloom = BloomSettings {
            intensity: -1.0,
            ..BloomSettings::default()
        };
        assert!(ScreenSpaceSettings::new().with_bloom(bloom).validate().is_err());
    }
}
