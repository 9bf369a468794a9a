//! Error types for the permissions system

use thiserror::Error;

/// Result type for permissions operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the permissions system
#[derive(Error, Debug)]
pub enum Error {
    #[error("Permission denied: cannot {operation} {key}")]
    PermissionDenied { key: String, operation: String },

    #[error("Cannot {operation} {key}: {reason}")]
    InvalidOperation {
        key: String,
        operation: String,
        reason: String,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node key in tree: {0}")]
    DuplicateNode(String),

    #[error("Invalid user id (expected owner/name): {0}")]
    InvalidUserId(String),

    #[error("Grant source error: {0}")]
    GrantSource(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
