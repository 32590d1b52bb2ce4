//! Test harness for the sheen PBR toolkit.
//!
//! Provides a recording render host and image regression testing for
//! generated lookup tables.

pub mod harness;
pub mod recording;

#[cfg(test)]
mod pipeline_tests;

pub use harness::{compare_images, create_diff_image, LutRegressionTest};
pub use recording::{HostCall, RecordingHost};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("LUT error: {0}")]
    Lut(#[from] sheen_brdf::LutError),
    #[error("Image comparison failed: {0}")]
    ImageComparison(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, TestError>;

/// Visual regression test configuration.
#[derive(Debug, Clone)]
pub struct VisualTestConfig {
    /// Maximum allowed normalized difference (0.0-1.0).
    pub threshold: f64,
    /// Directory for baseline images.
    pub baseline_dir: String,
    /// Directory for test output images.
    pub output_dir: String,
}

impl Default for VisualTestConfig {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            baseline_dir: "assets/test_data/baselines".to_string(),
            output_dir: "target/test_output".to_string(),
        }
    }
}
