//! Error types for the protocol layer.
//!
//! Three separate enums, because each one is handled at a different level:
//!
//! - [`ProtocolError`]: the bytes or the element are wrong. Surfaces to
//!   whoever called decode.
//! - [`RegistryError`]: the set of variants was assembled incorrectly.
//!   A programming error, reported at startup.
//! - [`HandlerError`]: a well-formed message could not be applied on this
//!   side. Recovered inside dispatch: logged, then the message is dropped.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    ///
    /// An [`Element`](crate::Element) only holds strings, so the JSON codec
    /// never produces this in practice. It stays in the signature so other
    /// codecs can report real failures.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Structurally invalid wire data: unparseable bytes, a missing
    /// mandatory attribute, a bad attribute value, or an element handed to
    /// the wrong decoder.
    ///
    /// Fatal to that single message only.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// No variant is registered for this tag.
    ///
    /// Means the two ends were built with different protocol versions.
    /// The rest of the stream can no longer be trusted.
    #[error("unknown message tag: {0:?}")]
    UnknownTag(String),
}

impl ProtocolError {
    /// A mandatory attribute is absent from an element.
    pub fn missing_attribute(tag: &str, attribute: &str) -> Self {
        Self::MalformedMessage(format!(
            "<{tag}> is missing mandatory attribute {attribute:?}"
        ))
    }

    /// An element reached a decoder registered for a different tag.
    pub fn tag_mismatch(expected: &str, found: &str) -> Self {
        Self::MalformedMessage(format!(
            "expected <{expected}>, found <{found}>"
        ))
    }

    /// Returns `true` if the stream this error came from must not be read
    /// any further.
    pub fn is_protocol_mismatch(&self) -> bool {
        matches!(self, Self::UnknownTag(_))
    }
}

/// Errors raised while building a [`Registry`](crate::Registry).
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Two variants claim the same wire tag.
    #[error("tag {0:?} is already registered")]
    DuplicateTag(&'static str),
}

/// Errors a handler can report for a message it could not apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The message names something (a panel, a player) that does not exist
    /// on this side of the link.
    #[error("unresolved {kind} reference {name:?}")]
    UnresolvedReference {
        /// What kind of thing was referenced, e.g. `"panel"`.
        kind: &'static str,
        /// The raw reference carried by the message.
        name: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::UnresolvedReference`].
    pub fn unresolved(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }
}
