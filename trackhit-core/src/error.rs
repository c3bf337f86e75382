//! Error types for trackhit-core.

use thiserror::Error;

/// Result type alias for trackhit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for trackhit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter container was loaded without a source list.
    #[error("{0}: could not find parameter list")]
    MissingParamSource(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
