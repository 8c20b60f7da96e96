//! `chat`: a line of player chat relayed by the server.

use crate::dispatch::{AiCapabilities, ClientCapabilities};
use crate::{Attribute, Element, HandlerError, MessageKind, Outbox, ProtocolError};

const SENDER: &str = "sender";
const MESSAGE: &str = "message";
const PRIVATE: &str = "private";

/// A chat line from `sender`, optionally private to the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    sender: String,
    message: String,
    private: bool,
}

impl ChatMessage {
    /// A public chat line.
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
            private: false,
        }
    }

    /// Marks the line as private.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_private(&self) -> bool {
        self.private
    }
}

impl MessageKind for ChatMessage {
    const TAG: &'static str = "chat";
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required(SENDER),
        Attribute::required(MESSAGE),
        Attribute::optional(PRIVATE),
    ];

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        Ok(Self {
            sender: element.require(SENDER)?.to_string(),
            message: element.require(MESSAGE)?.to_string(),
            private: element.flag(PRIVATE)?,
        })
    }

    fn to_element(&self) -> Element {
        let el = Element::new(Self::TAG)
            .with_attribute(SENDER, &self.sender)
            .with_attribute(MESSAGE, &self.message);
        // Public is the default, so only write the flag when it is set.
        if self.private {
            el.with_attribute(PRIVATE, "true")
        } else {
            el
        }
    }

    fn ai_handler(
        &self,
        _ai: &mut dyn AiCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        Ok(())
    }

    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        client.display_chat(&self.sender, &self.message, self.private)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_flag_is_optional() {
        let el = Element::new("chat")
            .with_attribute("sender", "Minuit")
            .with_attribute("message", "twenty-four dollars");
        let chat = ChatMessage::decode(&el).unwrap();
        assert!(!chat.is_private());
        assert_eq!(chat.message(), "twenty-four dollars");
    }

    #[test]
    fn test_private_round_trips() {
        let chat = ChatMessage::new("Minuit", "psst").private();
        let el = chat.to_element();
        assert_eq!(el.attribute("private"), Some("true"));
        assert_eq!(ChatMessage::decode(&el).unwrap(), chat);
    }

    #[test]
    fn test_missing_message_is_malformed() {
        let el = Element::new("chat").with_attribute("sender", "Minuit");
        let err = ChatMessage::decode(&el).unwrap_err();
        assert!(err.to_string().contains("\"message\""));
    }

    #[test]
    fn test_bad_private_value_is_malformed() {
        let el = ChatMessage::new("Minuit", "hi")
            .to_element()
            .with_attribute("private", "maybe");
        assert!(ChatMessage::decode(&el).is_err());
    }

    #[test]
    fn test_undeclared_attribute_is_tolerated() {
        let el = ChatMessage::new("Minuit", "hi")
            .to_element()
            .with_attribute("colour", "orange");
        let chat = ChatMessage::decode(&el).unwrap();
        assert_eq!(chat.sender(), "Minuit");
    }
}
