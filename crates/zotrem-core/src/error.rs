//! Error types
//!
//! Each collaborator has its own error enum; `SyncError` wraps them for the
//! sync command so callers can tell a network failure from a host failure.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::rich_text::NodeId;

/// Errors from the Zotero Web API client
#[derive(Error, Debug)]
pub enum ZoteroError {
    /// Credentials or library settings are unusable
    #[error("Invalid Zotero configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Zotero API returned {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Failed to decode Zotero response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised by a host implementation
#[derive(Error, Debug)]
pub enum HostError {
    /// Referenced node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Failed to read a workspace file
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a workspace file
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Clipboard is unavailable
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Errors from the sync command
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Zotero(#[from] ZoteroError),

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ZoteroError::Status {
            status: 403,
            url: "https://api.zotero.org/users/1/collections".to_string(),
            body: "Forbidden".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("/users/1/collections"));
    }

    #[test]
    fn test_sync_error_is_transparent() {
        let err: SyncError = HostError::NodeNotFound(NodeId::new("abc")).into();
        assert_eq!(err.to_string(), "Node not found: abc");
        assert!(matches!(err, SyncError::Host(HostError::NodeNotFound(_))));
    }
}
