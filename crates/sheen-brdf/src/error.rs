//! LUT generation errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating or persisting a BRDF LUT.
#[derive(Error, Debug)]
pub enum LutError {
    /// The input image does not exist.
    #[error("Input image not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The input image exists but could not be decoded.
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output dimensions are zero or overflow the texel buffer.
    #[error("Invalid LUT size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// The output path has no recognizable image extension.
    #[error("Unsupported output format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Encoding or writing the output image failed.
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, LutError>;
