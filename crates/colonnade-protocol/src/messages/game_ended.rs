//! `gameEnded`: the game is over.

use crate::dispatch::{AiCapabilities, ClientCapabilities};
use crate::{Attribute, Element, HandlerError, MessageKind, Outbox, Priority, ProtocolError};

const WINNER: &str = "winner";
const HIGH_SCORE: &str = "highScore";

/// Announces the winner. Sent late so the final updates land first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEndedMessage {
    winner: String,
    high_score: bool,
}

impl GameEndedMessage {
    pub fn new(winner: impl Into<String>) -> Self {
        Self {
            winner: winner.into(),
            high_score: false,
        }
    }

    /// Marks the result as a new high score for the recipient.
    pub fn with_high_score(mut self) -> Self {
        self.high_score = true;
        self
    }

    pub fn winner(&self) -> &str {
        &self.winner
    }

    pub fn is_high_score(&self) -> bool {
        self.high_score
    }
}

impl MessageKind for GameEndedMessage {
    const TAG: &'static str = "gameEnded";
    const ATTRIBUTES: &'static [Attribute] = &[
        Attribute::required(WINNER),
        Attribute::optional(HIGH_SCORE),
    ];
    const PRIORITY: Priority = Priority::Late;

    fn from_element(element: &Element) -> Result<Self, ProtocolError> {
        Ok(Self {
            winner: element.require(WINNER)?.to_string(),
            high_score: element.flag(HIGH_SCORE)?,
        })
    }

    fn to_element(&self) -> Element {
        let el = Element::new(Self::TAG).with_attribute(WINNER, &self.winner);
        if self.high_score {
            el.with_attribute(HIGH_SCORE, "true")
        } else {
            el
        }
    }

    fn ai_handler(
        &self,
        ai: &mut dyn AiCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        ai.game_ended(&self.winner)
    }

    fn client_handler(
        &self,
        client: &mut dyn ClientCapabilities,
        _outbox: &Outbox,
    ) -> Result<(), HandlerError> {
        client.game_ended(&self.winner, self.high_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_score_defaults_to_false_when_absent() {
        let el = Element::new("gameEnded").with_attribute("winner", "Dutch");
        let msg = GameEndedMessage::decode(&el).unwrap();
        assert_eq!(msg.winner(), "Dutch");
        assert!(!msg.is_high_score());
    }

    #[test]
    fn test_high_score_only_written_when_set() {
        let el = GameEndedMessage::new("Dutch").with_high_score().to_element();
        assert_eq!(el.attribute("highScore"), Some("true"));
        let el = GameEndedMessage::new("Dutch").to_element();
        assert_eq!(el.attribute("highScore"), None);
    }

    #[test]
    fn test_explicit_false_reencodes_like_absent() {
        let explicit = Element::new("gameEnded")
            .with_attribute("winner", "Dutch")
            .with_attribute("highScore", "false");
        let absent = Element::new("gameEnded").with_attribute("winner", "Dutch");

        let from_explicit = GameEndedMessage::decode(&explicit).unwrap();
        let from_absent = GameEndedMessage::decode(&absent).unwrap();
        assert_eq!(from_explicit, from_absent);
        assert_eq!(from_explicit.to_element(), absent);
    }
}
