//! Render integration errors.

use thiserror::Error;

use crate::host::HostError;

/// Errors from material, environment and post-chain setup.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Shader(#[from] sheen_shaders::ShaderError),

    #[error(transparent)]
    Lut(#[from] sheen_brdf::LutError),

    #[error(transparent)]
    Core(#[from] sheen_core::Error),

    /// Requested feature is not implemented.
    #[error("Not supported: {0}")]
    Unsupported(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, RenderError>;
