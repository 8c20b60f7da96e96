//! Routing decoded messages to the side that received them.
//!
//! A link is opened either by the automated player or by the interactive
//! client, and that never changes for the life of the link. The
//! [`Endpoint`] records which one, together with the capability set the
//! handlers use to reach local state. [`Endpoint::dispatch`] then runs
//! exactly one handler per message:
//!
//! ```text
//! Decoded ──► Endpoint::Ai     ──► MessageKind::ai_handler     ──► Consumed
//!        └──► Endpoint::Client ──► MessageKind::client_handler ──► Consumed
//! ```
//!
//! A handler that cannot resolve what a message refers to reports
//! [`HandlerError`]. Dispatch logs it and drops the message; one stale
//! instruction must not take the whole link down.

use std::fmt;

use crate::{HandlerError, Message, Outbox};

/// Which participant decoded a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    /// The automated player.
    Ai,
    /// The interactive client.
    Client,
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai => f.write_str("ai"),
            Self::Client => f.write_str("client"),
        }
    }
}

/// What the automated player exposes to message handlers.
///
/// Implementations own (or lock) the AI's view of the game. Decision
/// logic lives behind these calls, not in the protocol layer.
pub trait AiCapabilities: Send {
    /// Identifier of the player this AI controls.
    fn player(&self) -> &str;

    /// Called when it becomes this AI's turn. May enqueue replies.
    fn begin_turn(&mut self, outbox: &Outbox) -> Result<(), HandlerError>;

    /// Called once the game is over.
    fn game_ended(&mut self, winner: &str) -> Result<(), HandlerError>;
}

/// What the interactive client exposes to message handlers.
///
/// These receive already-decoded instructions. Resolving names to live
/// UI surfaces or players happens here, not during decode.
pub trait ClientCapabilities: Send {
    /// Closes the named panel. Fails if no such panel is open.
    fn close_panel(&mut self, panel: &str) -> Result<(), HandlerError>;

    /// Shows a chat line.
    fn display_chat(
        &mut self,
        sender: &str,
        message: &str,
        private: bool,
    ) -> Result<(), HandlerError>;

    /// Marks `player` as the one whose turn it is.
    fn set_current_player(&mut self, player: &str) -> Result<(), HandlerError>;

    /// Shows the end-of-game result.
    fn game_ended(
        &mut self,
        winner: &str,
        high_score: bool,
    ) -> Result<(), HandlerError>;
}

/// The receiving side of a link, with its capability set.
pub enum Endpoint {
    /// Messages go to [`MessageKind::ai_handler`](crate::MessageKind::ai_handler).
    Ai(Box<dyn AiCapabilities>),
    /// Messages go to [`MessageKind::client_handler`](crate::MessageKind::client_handler).
    Client(Box<dyn ClientCapabilities>),
}

impl Endpoint {
    /// Wraps an AI capability set.
    pub fn ai(ai: impl AiCapabilities + 'static) -> Self {
        Self::Ai(Box::new(ai))
    }

    /// Wraps a client capability set.
    pub fn client(client: impl ClientCapabilities + 'static) -> Self {
        Self::Client(Box::new(client))
    }

    /// The role this endpoint plays.
    pub fn role(&self) -> EndpointRole {
        match self {
            Self::Ai(_) => EndpointRole::Ai,
            Self::Client(_) => EndpointRole::Client,
        }
    }

    /// Runs the role-appropriate handler for `message`.
    ///
    /// Never fails: a handler error is logged and reported as
    /// [`DispatchOutcome::Dropped`].
    pub fn dispatch(&mut self, message: &Message, outbox: &Outbox) -> DispatchOutcome {
        let role = self.role();
        let result = match self {
            Self::Ai(ai) => message.ai_handler(ai.as_mut(), outbox),
            Self::Client(client) => message.client_handler(client.as_mut(), outbox),
        };

        match result {
            Ok(()) => {
                tracing::trace!(tag = message.tag(), %role, "dispatched message");
                DispatchOutcome::Handled(role)
            }
            Err(error) => {
                tracing::warn!(
                    tag = message.tag(),
                    %role,
                    %error,
                    "dropping undeliverable message"
                );
                DispatchOutcome::Dropped { role, error }
            }
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ai(ai) => f.debug_tuple("Ai").field(&ai.player()).finish(),
            Self::Client(_) => f.write_str("Client"),
        }
    }
}

/// Result of dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion (including handlers that ignore the
    /// message on purpose).
    Handled(EndpointRole),
    /// The handler could not apply the message; it was logged and dropped.
    Dropped {
        /// Side that received the message.
        role: EndpointRole,
        /// Why it was dropped.
        error: HandlerError,
    },
}

impl DispatchOutcome {
    /// The role whose handler ran.
    pub fn role(&self) -> EndpointRole {
        match self {
            Self::Handled(role) | Self::Dropped { role, .. } => *role,
        }
    }

    /// Returns `true` if the message was applied.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_test::traced_test;

    use super::*;
    use crate::{ChatMessage, CloseMessage, GameEndedMessage, SetCurrentPlayerMessage};

    /// Every handler call, from either side, lands here.
    type Journal = Arc<Mutex<Vec<String>>>;

    struct JournalClient {
        journal: Journal,
        open_panels: Vec<String>,
    }

    impl ClientCapabilities for JournalClient {
        fn close_panel(&mut self, panel: &str) -> Result<(), HandlerError> {
            let index = self
                .open_panels
                .iter()
                .position(|p| p == panel)
                .ok_or_else(|| HandlerError::unresolved("panel", panel))?;
            self.open_panels.remove(index);
            self.journal.lock().push(format!("client:close:{panel}"));
            Ok(())
        }

        fn display_chat(
            &mut self,
            sender: &str,
            message: &str,
            _private: bool,
        ) -> Result<(), HandlerError> {
            self.journal.lock().push(format!("client:chat:{sender}:{message}"));
            Ok(())
        }

        fn set_current_player(&mut self, player: &str) -> Result<(), HandlerError> {
            self.journal.lock().push(format!("client:current:{player}"));
            Ok(())
        }

        fn game_ended(&mut self, winner: &str, _: bool) -> Result<(), HandlerError> {
            self.journal.lock().push(format!("client:ended:{winner}"));
            Ok(())
        }
    }

    struct JournalAi {
        journal: Journal,
        player: String,
    }

    impl AiCapabilities for JournalAi {
        fn player(&self) -> &str {
            &self.player
        }

        fn begin_turn(&mut self, _outbox: &Outbox) -> Result<(), HandlerError> {
            self.journal.lock().push(format!("ai:turn:{}", self.player));
            Ok(())
        }

        fn game_ended(&mut self, winner: &str) -> Result<(), HandlerError> {
            self.journal.lock().push(format!("ai:ended:{winner}"));
            Ok(())
        }
    }

    fn ai(journal: &Journal) -> Endpoint {
        Endpoint::ai(JournalAi {
            journal: Arc::clone(journal),
            player: "Dutch".into(),
        })
    }

    fn client(journal: &Journal, panels: &[&str]) -> Endpoint {
        Endpoint::client(JournalClient {
            journal: Arc::clone(journal),
            open_panels: panels.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[test]
    fn test_role_follows_endpoint() {
        let journal = Journal::default();
        assert_eq!(ai(&journal).role(), EndpointRole::Ai);
        assert_eq!(client(&journal, &[]).role(), EndpointRole::Client);
        assert_eq!(EndpointRole::Client.to_string(), "client");
    }

    #[test]
    fn test_exactly_one_handler_runs_per_message() {
        let journal = Journal::default();
        let outbox = Outbox::new();
        let msg = Message::new(GameEndedMessage::new("English"));

        let outcome = client(&journal, &[]).dispatch(&msg, &outbox);
        assert_eq!(outcome, DispatchOutcome::Handled(EndpointRole::Client));
        assert_eq!(*journal.lock(), ["client:ended:English"]);

        journal.lock().clear();
        let outcome = ai(&journal).dispatch(&msg, &outbox);
        assert_eq!(outcome, DispatchOutcome::Handled(EndpointRole::Ai));
        assert_eq!(*journal.lock(), ["ai:ended:English"]);
    }

    #[test]
    fn test_client_closes_open_panel() {
        let journal = Journal::default();
        let outbox = Outbox::new();
        let mut endpoint = client(&journal, &["negotiationDialog"]);
        let msg = Message::new(CloseMessage::new("negotiationDialog"));

        assert!(endpoint.dispatch(&msg, &outbox).is_handled());
        assert_eq!(*journal.lock(), ["client:close:negotiationDialog"]);
    }

    #[test]
    fn test_inert_ai_handler_is_success() {
        let journal = Journal::default();
        let outbox = Outbox::new();
        let mut endpoint = ai(&journal);

        let close = Message::new(CloseMessage::new("negotiationDialog"));
        let chat = Message::new(ChatMessage::new("English", "hello"));
        assert!(endpoint.dispatch(&close, &outbox).is_handled());
        assert!(endpoint.dispatch(&chat, &outbox).is_handled());
        assert!(journal.lock().is_empty());
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_ai_only_reacts_to_own_turn() {
        let journal = Journal::default();
        let outbox = Outbox::new();
        let mut endpoint = ai(&journal);

        let other = Message::new(SetCurrentPlayerMessage::new("English"));
        let own = Message::new(SetCurrentPlayerMessage::new("Dutch"));
        assert!(endpoint.dispatch(&other, &outbox).is_handled());
        assert!(endpoint.dispatch(&own, &outbox).is_handled());
        assert_eq!(*journal.lock(), ["ai:turn:Dutch"]);
        assert_eq!(format!("{endpoint:?}"), "Ai(\"Dutch\")");
    }

    #[test]
    #[traced_test]
    fn test_unresolved_reference_is_logged_and_dropped() {
        let journal = Journal::default();
        let outbox = Outbox::new();
        let msg = Message::new(CloseMessage::new("negotiationDialog"));

        let outcome = client(&journal, &[]).dispatch(&msg, &outbox);
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped {
                role: EndpointRole::Client,
                error: HandlerError::unresolved("panel", "negotiationDialog"),
            }
        );
        assert_eq!(outcome.role(), EndpointRole::Client);
        assert!(journal.lock().is_empty());
        assert!(logs_contain("dropping undeliverable message"));
    }
}
