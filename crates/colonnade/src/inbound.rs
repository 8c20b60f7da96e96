//! Inbound half of a link: frames in, decoded and dispatched messages out.

use std::sync::Arc;

use colonnade_protocol::{
    Codec, DispatchOutcome, ElementReader, JsonCodec, Message, Outbox, ProtocolError, Registry,
};
use colonnade_transport::Connection;

use crate::{ColonnadeError, LinkConfig, LinkContext};

/// One message taken off the wire, together with what dispatch did with it.
#[derive(Debug)]
pub struct Delivery {
    pub message: Message,
    pub outcome: DispatchOutcome,
}

/// Reads frames from one connection and dispatches each message in them to
/// the link's endpoint.
pub struct Receiver<C: Connection, K: Codec = JsonCodec> {
    conn: Arc<C>,
    codec: K,
    registry: Arc<Registry>,
    context: LinkContext,
    outbox: Outbox,
    config: LinkConfig,
    frame: Vec<u8>,
    position: usize,
}

impl<C: Connection> Receiver<C> {
    /// A receiver using the JSON wire format.
    ///
    /// `outbox` is handed to every handler so replies land in the same
    /// queue the link's [`Sender`](crate::Sender) drains.
    pub fn new(
        conn: Arc<C>,
        registry: Arc<Registry>,
        context: LinkContext,
        outbox: Outbox,
        config: LinkConfig,
    ) -> Self {
        Self::with_codec(conn, registry, context, outbox, JsonCodec, config)
    }
}

impl<C: Connection, K: Codec> Receiver<C, K> {
    pub fn with_codec(
        conn: Arc<C>,
        registry: Arc<Registry>,
        context: LinkContext,
        outbox: Outbox,
        codec: K,
        config: LinkConfig,
    ) -> Self {
        Self {
            conn,
            codec,
            registry,
            context,
            outbox,
            config: config.validated(),
            frame: Vec::new(),
            position: 0,
        }
    }

    pub fn context(&self) -> &LinkContext {
        &self.context
    }

    /// Waits for the next message, decodes it and runs its handler.
    ///
    /// Returns `Ok(None)` once the peer has closed the link. A handler that
    /// cannot apply the message is not an error: the message is logged and
    /// the drop shows up in [`Delivery::outcome`].
    ///
    /// # Errors
    /// - `MalformedMessage` for a message with missing or bad attributes.
    ///   Only that message is lost; the next call carries on with the rest
    ///   of the frame.
    /// - `MalformedMessage` for bytes that do not parse or an oversized
    ///   frame. The rest of the frame is discarded.
    /// - `UnknownTag` for a tag no registered variant owns. The rest of the
    ///   frame is discarded; the link should be closed.
    /// - `TransportFailure` if the connection broke.
    pub async fn receive(&mut self) -> Result<Option<Delivery>, ColonnadeError> {
        loop {
            if self.position < self.frame.len() {
                if let Some(message) = self.next_message()? {
                    return Ok(Some(self.deliver(message)));
                }
            }

            let Some(frame) = self.conn.recv().await? else {
                tracing::debug!(conn_id = %self.conn.id(), "peer closed link");
                return Ok(None);
            };

            if frame.len() > self.config.max_frame_len {
                tracing::warn!(
                    conn_id = %self.conn.id(),
                    bytes = frame.len(),
                    max = self.config.max_frame_len,
                    "frame too large, discarded"
                );
                return Err(ProtocolError::MalformedMessage(format!(
                    "frame of {} bytes exceeds limit of {}",
                    frame.len(),
                    self.config.max_frame_len
                ))
                .into());
            }

            tracing::trace!(conn_id = %self.conn.id(), bytes = frame.len(), "received frame");
            self.frame = frame;
            self.position = 0;
        }
    }

    /// Decodes the next message of the current frame, or `None` once the
    /// frame is used up.
    fn next_message(&mut self) -> Result<Option<Message>, ProtocolError> {
        let mut reader = ElementReader::new(&self.codec, &self.frame[self.position..]);
        let result = self.registry.decode_next(&mut reader);
        let consumed = reader.position();

        match result {
            Ok(Some(message)) => {
                self.position += consumed;
                Ok(Some(message))
            }
            Ok(None) => {
                self.discard_frame();
                Ok(None)
            }
            Err(e) if consumed == 0 || e.is_protocol_mismatch() => {
                // Either the bytes did not parse, so there is no boundary to
                // resume from, or the peer speaks a protocol we do not.
                tracing::warn!(
                    conn_id = %self.conn.id(),
                    error = %e,
                    discarded = self.frame.len() - self.position,
                    "discarding rest of frame"
                );
                self.discard_frame();
                Err(e)
            }
            Err(e) => {
                tracing::debug!(
                    conn_id = %self.conn.id(),
                    error = %e,
                    "skipping malformed message"
                );
                self.position += consumed;
                Err(e)
            }
        }
    }

    fn deliver(&mut self, message: Message) -> Delivery {
        tracing::debug!(
            conn_id = %self.conn.id(),
            tag = message.tag(),
            role = %self.context.role(),
            "dispatching message"
        );
        let outcome = self.context.dispatch(&message, &self.outbox);
        Delivery { message, outcome }
    }

    fn discard_frame(&mut self) {
        self.frame.clear();
        self.position = 0;
    }
}

impl<C: Connection, K: Codec> std::fmt::Debug for Receiver<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("context", &self.context)
            .field("buffered", &(self.frame.len() - self.position))
            .finish_non_exhaustive()
    }
}
