//! Error types for the SCSS module
//!
//! Only a few conditions are errors at all: unreadable files, paths that cannot become
//! URLs and malformed settings. Resolution misses and module cycles are normal outcomes
//! and never show up here.

use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Main error type for SCSS module operations
#[derive(Error, Debug)]
pub enum ScssError {
    /// File could not be read
    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path that cannot be represented as a `file://` URL
    #[error("Path cannot be converted to a URL: {path:?}")]
    InvalidPath { path: PathBuf },

    /// URL that does not point to a local file
    #[error("URL is not a local file: {uri}")]
    InvalidUri { uri: Url },

    /// Stylesheet text with syntax errors
    #[error("Parse error in {uri}: {message}")]
    Parse { uri: Url, message: String },

    /// Malformed settings payload
    #[error("Invalid settings")]
    Settings {
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for SCSS operations
pub type ScssResult<T> = Result<T, ScssError>;

impl ScssError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScssError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for ScssError {
    fn from(source: serde_json::Error) -> Self {
        ScssError::Settings { source }
    }
}
