use thiserror::Error;

/// Main error type for manifest derivation
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Transport-level failure talking to the TAMS store
    #[error("catalog request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The TAMS store answered with a non-success status
    #[error("catalog returned {status} for {url}")]
    CatalogStatus { status: u16, url: String },

    /// A catalog response body could not be decoded
    #[error("malformed catalog response: {0}")]
    Json(#[from] serde_json::Error),

    /// Unexpected flow-graph shape during collection traversal
    #[error("flow traversal error: {0}")]
    Traversal(String),

    /// A timerange or timestamp could not be parsed or used
    #[error("invalid timerange: {0}")]
    Timerange(String),

    /// A field required for playlist arithmetic was missing or unusable
    #[error("playlist arithmetic error: {0}")]
    Arithmetic(String),

    /// Credential acquisition failure
    #[error("credential error: {0}")]
    Auth(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ManifestError>;
