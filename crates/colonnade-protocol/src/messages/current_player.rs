//! `setCurrentPlayer`: whose turn it is now.

use crate::dispatch::{AiCapabilities, ClientCapabilities};
use crate::{Attribute, Element, HandlerError, MessageKind, Outbox, Priority, ProtocolError};

const PLAYER: &str = "player";

/// Announces the player whose turn has started.
///
/// Sent early in a flush so that anything queued alongside it is applied
/// in the context of the new turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCurrentPlayerMessage {
    player: String,
}

impl SetCurrentPlayerMessage {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }
}

impl MessageKind for SetCurrentPlayerMessage {
    const TAG: &'static str = "setCurrentPlayer";
    const ATTRIBUTES: &'static [Attribute] = &[Attribute::required(PLAYER)];
    const PRIORITY: Priority = Priority::Early;

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        Ok(Self::new(element.require(PLAYER)?))
    }

    fn to_element(&self) -> Element {
        Element::new(Self::TAG).with_attribute(PLAYER, &self.player)
    }

    fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        if ai.player() == self.player {
            ai.begin_turn(outbox)
        } else {
            tracing::trace!(player = %self.player, "not our turn");
            Ok(())
        }
    }

    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        client.set_current_player(&self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_element() {
        let msg = SetCurrentPlayerMessage::new("Dutch");
        let el = msg.to_element();
        assert_eq!(el.tag(), "setCurrentPlayer");
        assert_eq!(SetCurrentPlayerMessage::decode(&el).unwrap(), msg);
    }

    #[test]
    fn test_missing_player_is_malformed() {
        let err = SetCurrentPlayerMessage::decode(&Element::new("setCurrentPlayer"))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMessage(_)));
    }
}
