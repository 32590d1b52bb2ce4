//! Error types shared across the toolkit.

use thiserror::Error;

/// Toolkit-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Parameter outside its valid range
    #[error("Out of range: {0}")]
    OutOfRange(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
