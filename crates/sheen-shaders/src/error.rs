//! Shader template and export errors.

use std::path::PathBuf;

use thiserror::Error;

/// Shader-related errors.
#[derive(Error, Debug)]
pub enum ShaderError {
    /// A fill targets a slot the template does not declare.
    #[error("Template {template} has no slot named '{slot}'")]
    UnknownSlot { template: String, slot: String },

    /// The same slot is declared twice in one template.
    #[error("Template {template} declares slot '{slot}' more than once")]
    DuplicateSlot { template: String, slot: String },

    /// A slot pragma without a valid identifier.
    #[error("Template {template} line {line}: malformed slot pragma")]
    MalformedSlot { template: String, line: usize },

    /// Writing a shader file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a shader file failed for a reason other than absence.
    #[error("Failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, ShaderError>;
