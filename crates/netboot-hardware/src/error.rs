//! Error types for hardware directory operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a hardware directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No record matches the lookup key
    #[error("no hardware record for {0}")]
    NotFound(String),

    /// Invalid MAC address format
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Invalid field value
    #[error("invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Failed to read the backing store
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse hardware documents
    #[error("failed to parse hardware documents: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Backend unavailable or misbehaving
    #[error("backend error: {0}")]
    Backend(String),
}

impl DirectoryError {
    /// True when the lookup succeeded but matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }

    pub(crate) fn invalid(field: impl Into<String>, message: impl std::fmt::Display) -> Self {
        DirectoryError::InvalidField {
            field: field.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DirectoryError::NotFound("00:11:22:33:44:55".to_string());
        assert_eq!(err.to_string(), "no hardware record for 00:11:22:33:44:55");

        let err = DirectoryError::invalid("dhcp.ip.gateway", "bad address");
        assert_eq!(
            err.to_string(),
            "invalid value for field 'dhcp.ip.gateway': bad address"
        );

        let err = DirectoryError::Io {
            path: PathBuf::from("/etc/hardware.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("failed to read /etc/hardware.yaml"));
    }

    #[test]
    fn test_not_found_is_distinct() {
        assert!(DirectoryError::NotFound("x".to_string()).is_not_found());
        assert!(!DirectoryError::Backend("down".to_string()).is_not_found());
        assert!(!DirectoryError::MissingField("dhcp".to_string()).is_not_found());
    }
}
