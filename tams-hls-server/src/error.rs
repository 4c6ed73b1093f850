//! Error types for the manifest server.

use thiserror::Error;

/// Main error type for the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Manifest derivation error from the core library.
    #[error("manifest error: {0}")]
    Manifest(#[from] tams_hls_lib::ManifestError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, ServerError>;
