//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! mostly validation failures at type-construction boundaries.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid remote folder name
    #[error("Invalid folder name: {0}")]
    InvalidFolderName(String),

    /// Invalid local path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidRemoteId("has spaces".to_string());
        assert_eq!(err.to_string(), "Invalid remote ID: has spaces");

        let err = DomainError::InvalidFolderName("empty".to_string());
        assert_eq!(err.to_string(), "Invalid folder name: empty");
    }

    #[test]
    fn test_error_equality() {
        let err1 = DomainError::InvalidPath("/path".to_string());
        let err2 = DomainError::InvalidPath("/path".to_string());
        let err3 = DomainError::InvalidPath("/other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn test_error_clone() {
        let err = DomainError::ValidationFailed("test".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
