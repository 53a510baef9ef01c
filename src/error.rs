//! Error taxonomy shared by the API client, domain services, and session.
//!
//! `Connectivity` and `Api` are kept apart so callers can tell "server
//! unreachable" from "server rejected the request".

use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never reached the server.
    #[error("unable to connect to server: {0}")]
    Connectivity(String),

    /// The server responded with a failure status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Token refresh was impossible or failed; stored session data is gone.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// A local form check failed before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A success body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Reading or writing persisted session data failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    Http(String),
}

impl ClientError {
    /// Status code for `Api` errors, `None` for everything else.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
