//! Error types for slamy.
//!
//! [`SlackError`] covers every failure a client operation can surface:
//! configuration problems detected at construction, validation failures
//! raised before any outbound call, upstream failures passed through with
//! the remote message intact, and upload-source read errors.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for slamy client operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SlackError {
    /// The client cannot be built from the supplied configuration
    /// (for example, no credential was configured).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request was rejected locally before touching the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// The Slack API call failed. `message` is the upstream error string,
    /// unchanged.
    #[error("{method} failed: {message}")]
    Upstream {
        /// API method that failed (e.g. `"chat.postMessage"`).
        method: String,
        /// Error reported by the transport or by Slack.
        message: String,
    },

    /// The upload source could not be read from disk.
    #[error("failed to read upload source {}: {source}", path.display())]
    Upload {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SlackError {
    /// Build an [`SlackError::Upstream`] for the given API method.
    pub fn upstream(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            method: method.into(),
            message: message.into(),
        }
    }
}

/// A convenience alias used throughout slamy.
pub type Result<T> = std::result::Result<T, SlackError>;
