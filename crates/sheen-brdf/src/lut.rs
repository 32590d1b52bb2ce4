//! BRDF lookup table generation.

use std::path::PathBuf;
use std::time::Instant;

use glam::Vec2;
use rayon::prelude::*;
use sheen_core::constants::{
    BASE_SAMPLE_COUNT, DEFAULT_INPUT_FILE, DEFAULT_LUT_FILE, DEFAULT_LUT_HEIGHT, DEFAULT_LUT_WIDTH,
};
use tracing::info;

use crate::error::{LutError, Result};
use crate::input::ParameterMap;
use crate::integrate::{integrate_texel, sample_count_for_scale, SampleSequence, SplitSum};
use crate::output::save_lut;

/// Where per-texel roughness and sample counts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LutSource {
    /// Red/green channels of an image drive roughness and sample scale.
    Image(PathBuf),
    /// Classic analytic table: roughness along `u`, view cosine along `v`,
    /// full sample count everywhere.
    Uniform,
}

/// LUT generation configuration.
#[derive(Debug, Clone)]
pub struct LutConfig {
    /// Parameter source.
    pub source: LutSource,
    /// Output image path; the format follows the extension.
    pub output: PathBuf,
    /// Output width in texels.
    pub width: u32,
    /// Output height in texels.
    pub height: u32,
    /// Sample point set.
    pub sequence: SampleSequence,
}

impl Default for LutConfig {
    fn default() -> Self {
        Self {
            source: LutSource::Image(PathBuf::from(DEFAULT_INPUT_FILE)),
            output: PathBuf::from(DEFAULT_LUT_FILE),
            width: DEFAULT_LUT_WIDTH,
            height: DEFAULT_LUT_HEIGHT,
            sequence: SampleSequence::Hammersley,
        }
    }
}

impl LutConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read parameters from the given image.
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = LutSource::Image(path.into());
        self
    }

    /// Generate the classic analytic table instead of reading an image.
    pub fn uniform(mut self) -> Self {
        self.source = LutSource::Uniform;
        self
    }

    /// Set the output path.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Set the output dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the sample point set.
    pub fn with_sequence(mut self, sequence: SampleSequence) -> Self {
        self.sequence = sequence;
        self
    }
}

/// In-memory split-sum table, row-major, row 0 holding the smallest `v`.
#[derive(Debug, Clone, PartialEq)]
pub struct LutImage {
    width: u32,
    height: u32,
    texels: Vec<SplitSum>,
}

impl LutImage {
    /// Wrap texels computed elsewhere.
    pub fn from_texels(width: u32, height: u32, texels: Vec<SplitSum>) -> Result<Self> {
        if texel_count(width, height)? != texels.len() {
            return Err(LutError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Output dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Texel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> SplitSum {
        self.texels[(y * self.width + x) as usize]
    }

    /// All texels in row-major order.
    pub fn texels(&self) -> &[SplitSum] {
        &self.texels
    }

    /// Interleaved `[a, b, a, b, ...]` floats, ready for an RG32F upload.
    pub fn as_rg32f(&self) -> &[f32] {
        bytemuck::cast_slice(&self.texels)
    }
}

fn texel_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(LutError::InvalidSize { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(LutError::InvalidSize { width, height })
}

/// Normalized coordinates of the center of texel `(x, y)`.
#[inline]
fn texel_center(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}

/// Evaluate `f` for every texel, one rayon task per row.
fn compute<F>(width: u32, height: u32, f: F) -> Result<LutImage>
where
    F: Fn(Vec2) -> SplitSum + Sync,
{
    let mut texels = vec![SplitSum::ZERO; texel_count(width, height)?];

    texels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let _span = tracing::trace_span!("lut_row", row = y).entered();
            for (x, texel) in row.iter_mut().enumerate() {
                *texel = f(texel_center(x as u32, y as u32, width, height));
            }
        });

    LutImage::from_texels(width, height, texels)
}

/// Compute a table driven by a parameter map.
///
/// The view cosine axis is stretched by the map's aspect ratio; parameters
/// are looked up at the unstretched texel coordinates.
pub fn compute_from_map(
    map: &ParameterMap,
    width: u32,
    height: u32,
    sequence: SampleSequence,
) -> Result<LutImage> {
    let aspect = map.aspect_ratio();
    compute(width, height, |uv| {
        let (roughness, scale) = map.sample(uv);
        integrate_texel(
            uv.x,
            uv.y * aspect,
            roughness,
            sample_count_for_scale(scale),
            sequence,
        )
    })
}

/// Compute the classic analytic table (roughness along `u`, view cosine along `v`).
pub fn compute_uniform(width: u32, height: u32, sequence: SampleSequence) -> Result<LutImage> {
    compute(width, height, |uv| {
        integrate_texel(uv.x, uv.y, uv.x, BASE_SAMPLE_COUNT, sequence)
    })
}

/// Generate a table according to `config` and write it to `config.output`.
///
/// Inputs are resolved before any work starts; the output file is only
/// touched once the whole table has been computed.
pub fn generate(config: &LutConfig) -> Result<LutImage> {
    let started = Instant::now();

    let lut = match &config.source {
        LutSource::Image(path) => {
            let map = ParameterMap::open(path)?;
            info!(
                "Computing {}x{} BRDF LUT from {}",
                config.width,
                config.height,
                path.display()
            );
            compute_from_map(&map, config.width, config.height, config.sequence)?
        }
        LutSource::Uniform => {
            info!(
                "Computing {}x{} uniform BRDF LUT",
                config.width, config.height
            );
            compute_uniform(config.width, config.height, config.sequence)?
        }
    };

    save_lut(&lut, &config.output)?;
    info!(
        "BRDF LUT written to {} in {:.2?}",
        config.output.display(),
        started.elapsed()
    );
    Ok(lut)
}
