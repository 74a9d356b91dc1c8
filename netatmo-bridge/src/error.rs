//! Top-level error for a bridge run.

use crate::credentials::CredentialError;
use crate::netatmo::NetatmoError;
use crate::publish::PublishError;
use crate::store::StoreError;

/// Broad class of a failed run, logged alongside the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings missing, unreadable or still placeholders
    Configuration,
    /// Network, HTTP status or malformed upstream response
    Upstream,
    /// Upstream answered but reported failure or had nothing to read
    UpstreamSemantic,
    /// MQTT broker unreachable or rejected a request
    Publish,
    /// A record could not be written
    Storage,
}

/// Any error that aborts a bridge run.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Netatmo(#[from] NetatmoError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Measurement cache could not be written
    #[error("failed to cache measurements: {0}")]
    Store(#[from] StoreError),
}

impl BridgeError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Credentials(_) => ErrorKind::Configuration,
            BridgeError::Netatmo(NetatmoError::Store(_)) => ErrorKind::Storage,
            BridgeError::Netatmo(e) if e.is_semantic() => ErrorKind::UpstreamSemantic,
            BridgeError::Netatmo(_) => ErrorKind::Upstream,
            BridgeError::Publish(_) => ErrorKind::Publish,
            BridgeError::Store(_) => ErrorKind::Storage,
        }
    }
}
