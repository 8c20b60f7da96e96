//! Per-link state read by every dispatch.

use std::time::{Duration, Instant};

use colonnade_protocol::{DispatchOutcome, Endpoint, EndpointRole, Message, Outbox};
use colonnade_transport::ConnectionId;

/// State that belongs to exactly one link, from connect to disconnect.
///
/// Holds the [`Endpoint`], i.e. the capability set that resolves "this
/// panel" or "this AI player" for handlers. It is owned by the link's
/// [`Receiver`](crate::Receiver) and is neither `Clone` nor shared, so two
/// links can never end up dispatching through the same context.
pub struct LinkContext {
    id: ConnectionId,
    peer: String,
    endpoint: Endpoint,
    opened_at: Instant,
    delivered: u64,
    dropped: u64,
}

impl LinkContext {
    /// Creates the context for a freshly connected link.
    pub fn new(id: ConnectionId, peer: impl Into<String>, endpoint: Endpoint) -> Self {
        let peer = peer.into();
        tracing::debug!(conn_id = %id, %peer, role = %endpoint.role(), "link context created");
        Self {
            id,
            peer,
            endpoint,
            opened_at: Instant::now(),
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Who is on the other end (a player name, a server address).
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Which handler set this link dispatches to.
    pub fn role(&self) -> EndpointRole {
        self.endpoint.role()
    }

    /// Messages whose handler completed.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Messages dropped because their handler could not apply them.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Time since the link was opened.
    pub fn uptime(&self) -> Duration {
        self.opened_at.elapsed()
    }

    pub(crate) fn dispatch(&mut self, message: &Message, outbox: &Outbox) -> DispatchOutcome {
        let outcome = self.endpoint.dispatch(message, outbox);
        if outcome.is_handled() {
            self.delivered += 1;
        } else {
            self.dropped += 1;
        }
        outcome
    }
}

impl Drop for LinkContext {
    fn drop(&mut self) {
        tracing::debug!(
            conn_id = %self.id,
            peer = %self.peer,
            delivered = self.delivered,
            dropped = self.dropped,
            "link context torn down"
        );
    }
}

impl std::fmt::Debug for LinkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkContext")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("endpoint", &self.endpoint)
            .field("delivered", &self.delivered)
            .field("dropped", &self.dropped)
            .finish()
    }
}
