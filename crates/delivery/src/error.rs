use content::ContentError;
use thiserror::Error;

use crate::config::DeliveryConfigError;

/// Why a fetch produced no entries.
///
/// Every variant is terminal for the request that hit it: nothing is
/// retried and no partial result is handed on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The API answered with a non-success status.
    #[error("delivery API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never got an answer (connect, TLS, timeout).
    #[error("delivery request failed: {0}")]
    Transport(String),

    /// The body was not JSON.
    #[error("delivery response is not valid JSON: {0}")]
    Decode(String),

    /// The body was JSON but not a usable entries collection.
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("invalid delivery configuration: {0}")]
    Config(#[from] DeliveryConfigError),
}

impl FetchError {
    /// Upstream status code, when the API answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
