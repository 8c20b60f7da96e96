//! The message variant contract and the type-erased [`Message`].
//!
//! A variant is a plain struct implementing [`MessageKind`]. The trait
//! carries everything the rest of the system needs to know about it:
//!
//! - its wire tag and declared attributes,
//! - its priority tier,
//! - how to build it from an element (and back),
//! - what to do when the AI side or the client side receives it.
//!
//! [`Message`] boxes any variant behind one vtable so queues, registries
//! and dispatch can handle them uniformly.

use std::any::Any;
use std::fmt;

use crate::dispatch::{AiCapabilities, ClientCapabilities};
use crate::{
    Codec, Element, ElementReader, HandlerError, Outbox, Priority,
    ProtocolError,
};

/// One declared attribute of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name on the wire.
    pub name: &'static str,
    /// Whether decoding fails when it is absent.
    pub required: bool,
}

impl Attribute {
    /// A mandatory attribute.
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }

    /// An attribute that may be absent.
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }
}

/// A concrete message variant.
///
/// Implementors write [`from_element`](Self::from_element),
/// [`to_element`](Self::to_element) and the two handlers. The provided
/// [`decode`](Self::decode) and [`from_reader`](Self::from_reader) check the
/// tag and the mandatory attributes first, so every construction path
/// rejects the same inputs.
pub trait MessageKind: fmt::Debug + Send + Sync + Sized + 'static {
    /// Wire tag, unique within a [`Registry`](crate::Registry).
    const TAG: &'static str;

    /// Attributes this variant reads and writes.
    const ATTRIBUTES: &'static [Attribute];

    /// Priority tier used by the outbound queue.
    const PRIORITY: Priority = Priority::Normal;

    /// Extracts the variant's fields from an element already known to
    /// carry [`TAG`](Self::TAG) and every mandatory attribute.
    fn from_element(element: &Element) -> Result<Self, ProtocolError>;

    /// Writes the variant's fields as an element. Never fails.
    fn to_element(&self) -> Element;

    /// Behaviour when the automated player receives this message.
    fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError>;

    /// Behaviour when the interactive client receives this message.
    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError>;

    /// Builds the variant from a whole, already-parsed element.
    fn decode(element: &Element) -> Result<Self, ProtocolError> {
        element.expect_tag(Self::TAG)?;
        for attribute in Self::ATTRIBUTES.iter().filter(|a| a.required) {
            element.require(attribute.name)?;
        }
        for name in element.attributes().keys() {
            if !Self::ATTRIBUTES.iter().any(|a| a.name == name.as_str()) {
                tracing::debug!(
                    tag = Self::TAG,
                    attribute = %name,
                    "ignoring undeclared attribute"
                );
            }
        }
        Self::from_element(element)
    }

    /// Builds the variant from the next element of a stream, consuming
    /// exactly that element.
    fn from_reader<C: Codec>(
        reader: &mut ElementReader<'_, C>,
    ) -> Result<Self, ProtocolError> {
        let element = reader.next_element()?.ok_or_else(|| {
            ProtocolError::MalformedMessage(format!(
                "stream ended before <{}>",
                Self::TAG
            ))
        })?;
        Self::decode(&element)
    }
}

/// Object-safe view of a [`MessageKind`], used behind [`Message`].
trait AnyMessage: fmt::Debug + Send + Sync {
    fn tag(&self) -> &'static str;
    fn priority(&self) -> Priority;
    fn to_element(&self) -> Element;
    fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError>;
    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError>;
    fn as_any(&self) -> &dyn Any;
}

impl<M: MessageKind> AnyMessage for M {
    fn tag(&self) -> &'static str {
        M::TAG
    }

    fn priority(&self) -> Priority {
        M::PRIORITY
    }

    fn to_element(&self) -> Element {
        MessageKind::to_element(self)
    }

    fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        MessageKind::ai_handler(self, ai, outbox)
    }

    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        MessageKind::client_handler(self, client, outbox)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Any message variant, boxed.
///
/// Two messages are equal when their tags and attribute sets are equal,
/// which is exactly what survives a trip over the wire.
pub struct Message(Box<dyn AnyMessage>);

impl Message {
    /// Boxes a concrete variant.
    pub fn new<M: MessageKind>(message: M) -> Self {
        Self(Box::new(message))
    }

    /// The variant's wire tag.
    pub fn tag(&self) -> &'static str {
        self.0.tag()
    }

    /// The variant's priority tier.
    pub fn priority(&self) -> Priority {
        self.0.priority()
    }

    /// Encodes the message as a wire element.
    pub fn to_element(&self) -> Element {
        self.0.to_element()
    }

    /// Returns the concrete variant if it is an `M`.
    pub fn downcast_ref<M: MessageKind>(&self) -> Option<&M> {
        self.0.as_any().downcast_ref::<M>()
    }

    pub(crate) fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        self.0.ai_handler(ai, outbox)
    }

    pub(crate) fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        self.0.client_handler(client, outbox)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_element(), f)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.to_element() == other.to_element()
    }
}

impl Eq for Message {}
