//! Error Handling Module
//!
//! Defines the error taxonomy for building and sampling a paired dataset.
//! Uses thiserror for ergonomic error definitions.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for paired dataset operations
#[derive(Error, Debug)]
pub enum SamplerError {
    /// A label table or image is missing, unreadable or unparseable
    #[error("Failed to load resource '{}': {reason}", .path.display())]
    ResourceLoad { path: PathBuf, reason: String },

    /// A configured group key matched zero rows
    #[error("Group '{0}' is empty: no rows carry this label")]
    EmptyGroup(String),

    /// Configuration error
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SamplerError {
    /// Build a resource load error for `path`
    pub fn resource(path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        SamplerError::ResourceLoad {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type for paired dataset operations
pub type Result<T> = std::result::Result<T, SamplerError>;

/// Extension trait for attaching a resource path to foreign errors
pub trait ResultExt<T> {
    /// Turn the error into a `ResourceLoad` for `path`
    fn resource_context(self, path: &Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn resource_context(self, path: &Path) -> Result<T> {
        self.map_err(|e| SamplerError::resource(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SamplerError::EmptyGroup("Pneumonia".to_string());
        assert_eq!(
            format!("{}", err),
            "Group 'Pneumonia' is empty: no rows carry this label"
        );
    }

    #[test]
    fn test_resource_load_error() {
        let err = SamplerError::resource("/data/images/img1.png", "file not found");
        let msg = format!("{}", err);
        assert!(msg.contains("img1.png"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<i32, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));

        let err = result
            .resource_context(Path::new("labels.csv"))
            .unwrap_err();
        assert!(matches!(err, SamplerError::ResourceLoad { ref path, .. } if path == Path::new("labels.csv")));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SamplerError = io_err.into();
        assert!(matches!(err, SamplerError::Io(_)));
    }
}
