//! Tag → variant lookup for inbound decoding.
//!
//! The registry is the only place that maps a wire tag to a concrete
//! [`MessageKind`]. Each entry stores the variant's decoder; its encoder
//! and both handlers travel with the decoded [`Message`] itself. Building
//! one is a startup step:
//!
//! ```rust
//! use colonnade_protocol::{CloseMessage, Element, Registry};
//!
//! let registry = Registry::standard();
//! let element = Element::new("close").with_attribute("panel", "negotiationDialog");
//! let message = registry.decode(&element).unwrap();
//! assert_eq!(message.tag(), "close");
//! assert!(message.downcast_ref::<CloseMessage>().is_some());
//! ```

use std::collections::HashMap;

use crate::{
    ChatMessage, CloseMessage, Codec, Element, ElementReader, GameEndedMessage,
    Message, MessageKind, ProtocolError, RegistryError,
    SetCurrentPlayerMessage,
};

type DecodeFn = fn(&Element) -> Result<Message, ProtocolError>;

fn decode_as<M: MessageKind>(element: &Element) -> Result<Message, ProtocolError> {
    M::decode(element).map(Message::new)
}

/// The set of message variants one build of the game understands.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<&'static str, DecodeFn>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in variant.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert::<CloseMessage>();
        registry.insert::<ChatMessage>();
        registry.insert::<SetCurrentPlayerMessage>();
        registry.insert::<GameEndedMessage>();
        registry
    }

    fn insert<M: MessageKind>(&mut self) {
        self.entries.insert(M::TAG, decode_as::<M>);
    }

    /// Adds a variant.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateTag`] if the tag is already taken.
    pub fn register<M: MessageKind>(&mut self) -> Result<&mut Self, RegistryError> {
        if self.entries.contains_key(M::TAG) {
            return Err(RegistryError::DuplicateTag(M::TAG));
        }
        self.insert::<M>();
        tracing::debug!(
            tag = M::TAG,
            priority = %M::PRIORITY,
            "registered message variant"
        );
        Ok(self)
    }

    /// Returns `true` if a variant is registered for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.entries.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Decodes a whole element into whichever variant owns its tag.
    ///
    /// # Errors
    /// - `UnknownTag` if no variant is registered for the tag.
    /// - `MalformedMessage` if the variant rejects the element.
    pub fn decode(&self, element: &Element) -> Result<Message, ProtocolError> {
        let decode = self
            .entries
            .get(element.tag())
            .ok_or_else(|| ProtocolError::UnknownTag(element.tag().to_string()))?;
        decode(element)
    }

    /// Decodes the next element of a stream, or `None` at the end of it.
    ///
    /// Once an element has been parsed the reader sits just past it, even
    /// if the registry then rejects it, so the caller decides whether to go
    /// on. If the bytes themselves do not parse the reader does not move.
    pub fn decode_next<C: Codec>(
        &self,
        reader: &mut ElementReader<'_, C>,
    ) -> Result<Option<Message>, ProtocolError> {
        match reader.next_element()? {
            Some(element) => self.decode(&element).map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("tags", &self.tags()).finish()
    }
}
