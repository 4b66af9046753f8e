//! Error taxonomy for the synchronizer

use thiserror::Error;

/// Errors surfaced by the synchronizer
///
/// Validation errors are blocked locally and never reach the network.
/// Service errors carry the service-provided string verbatim. None of
/// these are fatal to a session: a failed poll cycle never stops the
/// polling loop.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Service(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SyncError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }
}
