//! Error types for the rota_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for rota_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Date text that is not a valid `YYYY-MM-DD` date
    #[error("Invalid date '{input}': {source} (expected YYYY-MM-DD)")]
    InvalidDate {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Site label outside the known vocabulary or missing from the catalog
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    /// Rotation catalog is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
