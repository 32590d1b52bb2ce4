//! Split-sum BRDF lookup table precomputation.
//!
//! This crate computes the scale/bias table used by image-based specular
//! lighting:
//! - Monte-Carlo integration with GGX importance sampling
//! - Image-driven tables (roughness and sample density from an input image)
//! - The classic analytic table (roughness x view cosine)
//! - 16-bit image output that never leaves partial files behind
//!
//! # Example
//!
//! ```no_run
//! use sheen_brdf::{generate, LutConfig};
//!
//! let config = LutConfig::new()
//!     .uniform()
//!     .with_size(256, 256)
//!     .with_output("brdf_lut.png");
//! let lut = generate(&config)?;
//! assert_eq!(lut.dimensions(), (256, 256));
//! # Ok::<(), sheen_brdf::LutError>(())
//! ```

pub mod error;
pub mod input;
pub mod integrate;
pub mod lut;
pub mod output;

pub use error::{LutError, Result};
pub use input::ParameterMap;
pub use integrate::{integrate_split_sum, sample_count_for_scale, SampleSequence, SplitSum};
pub use lut::{compute_from_map, compute_uniform, generate, LutConfig, LutImage, LutSource};
pub use output::{decode_rgba16, encode_rgba16, load_lut, save_lut, Rgba16Image};
