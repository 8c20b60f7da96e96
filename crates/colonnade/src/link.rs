//! A connected endpoint: one connection, one context, one outbox.

use std::sync::Arc;

use colonnade_protocol::{Codec, Endpoint, JsonCodec, Message, MessageKind, Outbox, Registry};
use colonnade_transport::Connection;

use crate::{ColonnadeError, Delivery, LinkConfig, LinkContext, Receiver, ResponseDeadline, Sender};

/// An AI or client endpoint's view of its connection to the server.
///
/// Bundles a [`Sender`] and a [`Receiver`] over the same connection and
/// outbox. Use it directly from a single task, or [`split`](Self::split)
/// it to flush and receive concurrently.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use colonnade::prelude::*;
/// # async fn run(conn: MemoryConnection, endpoint: Endpoint) -> Result<(), ColonnadeError> {
/// let registry = Arc::new(Registry::standard());
/// let mut link = Link::open(conn, "server", endpoint, registry, LinkConfig::default());
/// while let Some(delivery) = link.receive().await? {
///     tracing::info!(tag = delivery.message.tag(), "handled");
///     link.flush().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Link<C: Connection, K: Codec + Clone = JsonCodec> {
    sender: Sender<C, K>,
    receiver: Receiver<C, K>,
    config: LinkConfig,
}

impl<C: Connection> Link<C> {
    /// Opens a link speaking the JSON wire format.
    pub fn open(
        conn: C,
        peer: impl Into<String>,
        endpoint: Endpoint,
        registry: Arc<Registry>,
        config: LinkConfig,
    ) -> Self {
        Self::with_codec(conn, peer, endpoint, registry, JsonCodec, config)
    }
}

impl<C: Connection, K: Codec + Clone> Link<C, K> {
    pub fn with_codec(
        conn: C,
        peer: impl Into<String>,
        endpoint: Endpoint,
        registry: Arc<Registry>,
        codec: K,
        config: LinkConfig,
    ) -> Self {
        let config = config.validated();
        let conn = Arc::new(conn);
        let outbox = Outbox::new();
        let context = LinkContext::new(conn.id(), peer, endpoint);
        tracing::info!(
            conn_id = %conn.id(),
            peer = context.peer(),
            role = %context.role(),
            "link opened"
        );

        let sender = Sender::with_codec(
            Arc::clone(&conn),
            outbox.clone(),
            codec.clone(),
            config.clone(),
        );
        let receiver = Receiver::with_codec(conn, registry, context, outbox, codec, config.clone());
        Self {
            sender,
            receiver,
            config,
        }
    }

    pub fn context(&self) -> &LinkContext {
        self.receiver.context()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The queue shared by handlers and the sender.
    pub fn outbox(&self) -> &Outbox {
        self.sender.outbox()
    }

    /// Queues a message for the next flush.
    pub fn enqueue(&self, message: Message) {
        self.sender.enqueue(message);
    }

    /// Queues a typed message for the next flush.
    pub fn push<M: MessageKind>(&self, message: M) {
        self.sender.push(message);
    }

    /// See [`Sender::flush`].
    pub async fn flush(&self) -> Result<usize, ColonnadeError> {
        self.sender.flush().await
    }

    /// See [`Receiver::receive`].
    pub async fn receive(&mut self) -> Result<Option<Delivery>, ColonnadeError> {
        self.receiver.receive().await
    }

    /// Starts the configured response deadline for `panel` on this link's
    /// outbox.
    pub fn arm_deadline(&self, panel: impl Into<String>) -> ResponseDeadline {
        ResponseDeadline::arm(self.outbox().clone(), panel, self.config.response_deadline)
    }

    /// Separates the two halves so they can live on different tasks.
    pub fn split(self) -> (Sender<C, K>, Receiver<C, K>) {
        (self.sender, self.receiver)
    }

    /// Closes the connection. Anything still queued is discarded.
    pub async fn close(self) -> Result<(), ColonnadeError> {
        let unsent = self.outbox().len();
        tracing::info!(
            conn_id = %self.sender.id(),
            peer = self.context().peer(),
            unsent,
            "closing link"
        );
        self.sender.close().await
    }
}

impl<C: Connection, K: Codec + Clone> std::fmt::Debug for Link<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .finish()
    }
}
