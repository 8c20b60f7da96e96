//! # Colonnade
//!
//! Message exchange between a turn-based strategy game's server and the
//! endpoints connected to it: human clients and AI players.
//!
//! Game code builds typed messages, queues them with a priority, and
//! flushes. On the receiving side every message is decoded and handed to
//! exactly one handler, chosen by whether the link belongs to an AI or a
//! client.
//!
//! ## Layers
//!
//! - `colonnade-transport` moves frames ([`MemoryConnection`],
//!   [`WebSocketConnection`]).
//! - `colonnade-protocol` defines elements, the wire codec, the message
//!   variants, priorities and dispatch.
//! - This crate ties them to a connection: [`Sender`] drains an
//!   [`Outbox`] onto the wire, [`Receiver`] decodes frames and dispatches,
//!   [`Link`] bundles both for an endpoint.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use colonnade::prelude::*;
//!
//! # async fn run(server_end: MemoryConnection, client_end: MemoryConnection, endpoint: Endpoint)
//! # -> Result<(), ColonnadeError> {
//! // Server side: queue and flush.
//! let server = Sender::new(Arc::new(server_end), Outbox::new(), LinkConfig::default());
//! server.push(CloseMessage::new("negotiationDialog"));
//! server.flush().await?;
//!
//! // Client side: receive and dispatch.
//! let registry = Arc::new(Registry::standard());
//! let mut link = Link::open(client_end, "server", endpoint, registry, LinkConfig::default());
//! let delivery = link.receive().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod deadline;
mod error;
mod inbound;
mod link;
mod outbound;

pub use config::LinkConfig;
pub use context::LinkContext;
pub use deadline::ResponseDeadline;
pub use error::ColonnadeError;
pub use inbound::{Delivery, Receiver};
pub use link::Link;
pub use outbound::Sender;

pub use colonnade_protocol::{
    AiCapabilities, ChatMessage, ClientCapabilities, CloseMessage, DispatchOutcome, Element,
    Endpoint, EndpointRole, GameEndedMessage, HandlerError, Message, MessageKind, Outbox,
    Priority, ProtocolError, Registry, SetCurrentPlayerMessage,
};
pub use colonnade_transport::{
    Connection, ConnectionId, MemoryConnection, Transport, TransportError, WebSocketConnection,
    WebSocketTransport,
};

/// Everything an endpoint or server loop usually needs.
pub mod prelude {
    pub use crate::{
        AiCapabilities, ChatMessage, ClientCapabilities, CloseMessage, ColonnadeError,
        Connection, Delivery, DispatchOutcome, Endpoint, EndpointRole, GameEndedMessage,
        HandlerError, Link, LinkConfig, LinkContext, MemoryConnection, Message, MessageKind,
        Outbox, Priority, ProtocolError, Receiver, Registry, ResponseDeadline, Sender,
        SetCurrentPlayerMessage, Transport, WebSocketConnection, WebSocketTransport,
    };
}
