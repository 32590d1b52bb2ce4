//! Core types, sampling math, and errors for the sheen PBR toolkit.
//!
//! This crate provides the foundational pieces shared by every other crate:
//! - Quasi-random sampling (Hammersley points, radical inverse)
//! - GGX importance sampling and split-sum helpers
//! - Color and material parameter types
//! - The toolkit-wide error type

pub mod error;
pub mod math;
pub mod types;

pub use error::{Error, Result};
pub use types::{LinearRgba, MaterialInputs};

/// Toolkit-wide constants
pub mod constants {
    /// Sample count used for a texel whose sample scale is 1.0.
    pub const BASE_SAMPLE_COUNT: u32 = 1024;
    /// Lower bound applied to the per-texel sample scale.
    pub const MIN_SAMPLE_SCALE: f32 = 0.001;
    /// Default LUT output width in texels.
    pub const DEFAULT_LUT_WIDTH: u32 = 1080;
    /// Default LUT output height in texels.
    pub const DEFAULT_LUT_HEIGHT: u32 = 1920;
    /// Denominators at or below this are treated as zero by the BRDF integrator.
    pub const DENOM_EPSILON: f32 = 1e-6;
    /// Default file name of a generated BRDF lookup table.
    pub const DEFAULT_LUT_FILE: &str = "output_brdf_lut.png";
    /// Default file name of the LUT generator's input image.
    pub const DEFAULT_INPUT_FILE: &str = "input_texture.png";
}
