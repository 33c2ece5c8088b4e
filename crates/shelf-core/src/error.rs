//! Error types for shelf-core

use std::path::PathBuf;

use shelf_domain::ValidationError;
use thiserror::Error;

/// Result type alias for shelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Main error type for shelf operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Rejected user input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote document store errors
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Local library file errors
    #[error("File store error: {0}")]
    FileStore(#[from] FileStoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Machine-readable output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remote document store errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection secret could not be parsed
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// Non-success HTTP status from the Data API
    #[error("Remote store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Store refused to serve requests
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

/// Local library file errors
#[derive(Error, Debug)]
pub enum FileStoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt library file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode library: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("TOML parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Decode(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

impl From<mongodb::error::Error> for RemoteError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::InvalidArgument { .. } => {
                RemoteError::InvalidConnectionString(err.to_string())
            }
            ErrorKind::ServerSelection { .. } => RemoteError::Unavailable(err.to_string()),
            _ => RemoteError::Transport(err.to_string()),
        }
    }
}

impl From<mongodb::bson::ser::Error> for RemoteError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        RemoteError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidConnectionString(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShelfError::from(RemoteError::Status {
            status: 401,
            body: "invalid api key".into(),
        });
        assert_eq!(
            err.to_string(),
            "Remote store error: Remote store returned HTTP 401: invalid api key"
        );

        let err = ShelfError::from(ValidationError::MissingTitleOrAuthor);
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_decode_from_serde() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(RemoteError::from(json_err), RemoteError::Decode(_)));
    }

    #[test]
    fn test_json_error_is_shelf_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ShelfError::from(json_err);
        assert!(matches!(err, ShelfError::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_config_error_is_shelf_error() {
        let err = ShelfError::from(ConfigError::Invalid("timeout_secs must be positive".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value: timeout_secs must be positive"
        );
    }
}
