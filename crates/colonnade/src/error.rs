//! Unified error type for the Colonnade framework.

use colonnade_protocol::{ProtocolError, RegistryError};
use colonnade_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so `?`
/// converts sub-crate errors automatically.
///
/// Handler failures (unresolved panels or players) never show up here:
/// dispatch logs and drops them.
#[derive(Debug, thiserror::Error)]
pub enum ColonnadeError {
    /// The link failed mid send or receive. Nothing is retried; the
    /// owner decides whether to reconnect and what to resend.
    #[error(transparent)]
    TransportFailure(#[from] TransportError),

    /// A frame or message could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The variant registry was built incorrectly.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ColonnadeError {
    /// Returns `true` if the link should be torn down.
    ///
    /// A malformed message only costs that message. A dead transport or
    /// an unknown tag (the peers speak different protocol versions) ends
    /// the link.
    pub fn is_link_fatal(&self) -> bool {
        match self {
            Self::TransportFailure(_) => true,
            Self::Protocol(e) => e.is_protocol_mismatch(),
            Self::Registry(_) => false,
        }
    }
}
