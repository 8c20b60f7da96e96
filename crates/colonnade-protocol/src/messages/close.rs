//! `close`: the server tells a client to dismiss a panel.
//!
//! Sent when an offer that opened a popup (a native demand, a diplomacy
//! proposal) went unanswered for too long and the offering player has
//! taken the silence as a refusal. The popup is now stale and must go.

use crate::dispatch::{AiCapabilities, ClientCapabilities};
use crate::{Attribute, Element, HandlerError, MessageKind, Outbox, Priority, ProtocolError};

const PANEL: &str = "panel";

/// Instructs the client to close the named panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseMessage {
    panel: String,
}

impl CloseMessage {
    /// Creates a close instruction for `panel`.
    pub fn new(panel: impl Into<String>) -> Self {
        Self {
            panel: panel.into(),
        }
    }

    /// Name of the panel to close.
    pub fn panel(&self) -> &str {
        &self.panel
    }
}

impl MessageKind for CloseMessage {
    const TAG: &'static str = "close";
    const ATTRIBUTES: &'static [Attribute] = &[Attribute::required(PANEL)];
    const PRIORITY: Priority = Priority::Last;

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        Ok(Self::new(element.require(PANEL)?))
    }

    fn to_element(&self) -> Element {
        Element::new(Self::TAG).with_attribute(PANEL, &self.panel)
    }

    fn ai_handler(
        &self,
        _ai: &mut dyn AiCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        // The AI never opens panels.
        Ok(())
    }

    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        client.close_panel(&self.panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, ElementReader, JsonCodec};

    #[test]
    fn test_to_element_carries_tag_and_panel() {
        let el = CloseMessage::new("negotiationDialog").to_element();
        assert_eq!(el.tag(), "close");
        assert_eq!(el.attribute("panel"), Some("negotiationDialog"));
        assert_eq!(el.attributes().len(), 1);
    }

    #[test]
    fn test_three_construction_paths_agree() {
        let direct = CloseMessage::new("negotiationDialog");
        let element = direct.to_element();
        let from_element = CloseMessage::decode(&element).unwrap();

        let bytes = JsonCodec.encode(&element).unwrap();
        let mut reader = ElementReader::new(&JsonCodec, &bytes);
        let from_stream = CloseMessage::from_reader(&mut reader).unwrap();

        assert_eq!(direct, from_element);
        assert_eq!(direct, from_stream);
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn test_missing_panel_is_malformed() {
        let err = CloseMessage::decode(&Element::new("close")).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_wrong_tag_is_malformed() {
        let el = Element::new("chat").with_attribute("panel", "x");
        let err = CloseMessage::decode(&el).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }

    #[test]
    fn test_empty_stream_is_malformed() {
        let mut reader = ElementReader::new(&JsonCodec, b"   ");
        let err = CloseMessage::from_reader(&mut reader).unwrap_err();
        assert!(err.to_string().contains("stream ended before <close>"));
    }

    #[test]
    fn test_priority_is_last() {
        assert_eq!(CloseMessage::PRIORITY, Priority::Last);
    }
}
