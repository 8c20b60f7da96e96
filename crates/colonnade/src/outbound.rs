//! Outbound half of a link: drains the outbox onto the wire.

use std::sync::Arc;

use colonnade_protocol::{Codec, JsonCodec, Message, MessageKind, Outbox, ELEMENT_SEPARATOR};
use colonnade_transport::{Connection, ConnectionId};

use crate::{ColonnadeError, LinkConfig};

/// Sends pending messages over one connection, highest priority first.
///
/// A server holds a bare `Sender` per connected peer: it never dispatches
/// anything itself, it only enqueues and flushes. Endpoints get one as
/// half of a [`Link`](crate::Link).
pub struct Sender<C: Connection, K: Codec = JsonCodec> {
    conn: Arc<C>,
    codec: K,
    outbox: Outbox,
    config: LinkConfig,
}

impl<C: Connection> Sender<C> {
    /// A sender using the JSON wire format.
    pub fn new(conn: Arc<C>, outbox: Outbox, config: LinkConfig) -> Self {
        Self::with_codec(conn, outbox, JsonCodec, config)
    }
}

impl<C: Connection, K: Codec> Sender<C, K> {
    pub fn with_codec(conn: Arc<C>, outbox: Outbox, codec: K, config: LinkConfig) -> Self {
        Self {
            conn,
            codec,
            outbox,
            config: config.validated(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// The queue this sender drains. Clone it to hand producers a handle.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Queues a message for the next flush.
    pub fn enqueue(&self, message: Message) {
        self.outbox.enqueue(message);
    }

    /// Queues a typed message for the next flush.
    pub fn push<M: MessageKind>(&self, message: M) {
        self.outbox.push(message);
    }

    /// Sends everything queued so far and returns how many messages went
    /// out.
    ///
    /// The outbox is drained in priority order and packed into frames of
    /// at most `batch_limit` messages and `max_frame_len` bytes, separated
    /// by newlines. Messages enqueued while a flush is running wait for the
    /// next one.
    ///
    /// A message that encodes to more than `max_frame_len` bytes on its own
    /// is dropped with a warning and left out of the count.
    ///
    /// # Errors
    /// `TransportFailure` if a frame cannot be sent. Messages from that
    /// frame onward are lost; nothing is retried or put back.
    pub async fn flush(&self) -> Result<usize, ColonnadeError> {
        let batch = self.outbox.drain();
        if batch.is_empty() {
            return Ok(0);
        }

        let frames = self.pack(&batch)?;
        let total: usize = frames.iter().map(|(_, count)| count).sum();
        let mut sent = 0;

        for (frame, count) in &frames {
            if let Err(e) = self.conn.send(frame).await {
                tracing::warn!(
                    conn_id = %self.conn.id(),
                    lost = total - sent,
                    error = %e,
                    "flush aborted, unsent messages dropped"
                );
                return Err(e.into());
            }
            sent += count;
            tracing::trace!(
                conn_id = %self.conn.id(),
                messages = count,
                bytes = frame.len(),
                "sent frame"
            );
        }

        tracing::debug!(conn_id = %self.conn.id(), sent, frames = frames.len(), "flushed outbox");
        Ok(sent)
    }

    /// Closes the connection. Anything still queued stays in the outbox.
    pub async fn close(&self) -> Result<(), ColonnadeError> {
        self.conn.close().await?;
        Ok(())
    }

    /// Encodes `batch` into frames, each paired with its message count.
    fn pack(&self, batch: &[Message]) -> Result<Vec<(Vec<u8>, usize)>, ColonnadeError> {
        let mut frames = Vec::new();
        let mut frame = Vec::new();
        let mut count = 0;

        for message in batch {
            let encoded = self.codec.encode(&message.to_element())?;
            if encoded.len() > self.config.max_frame_len {
                tracing::warn!(
                    conn_id = %self.conn.id(),
                    tag = message.tag(),
                    bytes = encoded.len(),
                    max = self.config.max_frame_len,
                    "dropping message larger than max_frame_len"
                );
                continue;
            }

            let overflows = frame.len() + 1 + encoded.len() > self.config.max_frame_len;
            if count > 0 && (self.config.batch_full(count) || overflows) {
                frames.push((std::mem::take(&mut frame), count));
                count = 0;
            }

            if count > 0 {
                frame.push(ELEMENT_SEPARATOR);
            }
            frame.extend_from_slice(&encoded);
            count += 1;
        }

        if count > 0 {
            frames.push((frame, count));
        }
        Ok(frames)
    }
}

impl<C: Connection, K: Codec> std::fmt::Debug for Sender<C, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("id", &self.conn.id())
            .field("outbox", &self.outbox)
            .finish_non_exhaustive()
    }
}
