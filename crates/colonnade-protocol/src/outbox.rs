//! The outbound queue.
//!
//! An [`Outbox`] is a cheap, cloneable handle. Game code, handlers and
//! deadline timers all enqueue through their own clone while the link
//! owner drains it on flush. One lock guards both sides, so a message is
//! either in the drained batch or still queued for the next one, never
//! lost in between.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Message, MessageKind, Priority};

/// Pending messages keyed by `(priority, arrival)`.
///
/// Iterating a `BTreeMap` in key order gives exactly the flush order:
/// lower tiers first, FIFO within a tier.
#[derive(Default)]
struct Pending {
    queue: BTreeMap<(Priority, u64), Message>,
    next_seq: u64,
}

/// Thread-safe, priority-ordered queue of outbound messages.
#[derive(Clone, Default)]
pub struct Outbox {
    inner: Arc<Mutex<Pending>>,
}

impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an already-boxed message.
    pub fn enqueue(&self, message: Message) {
        let priority = message.priority();
        let tag = message.tag();
        let mut pending = self.inner.lock();
        let seq = pending.next_seq;
        pending.next_seq += 1;
        pending.queue.insert((priority, seq), message);
        tracing::trace!(tag, %priority, seq, "enqueued message");
    }

    /// Queues a concrete variant.
    pub fn push<M: MessageKind>(&self, message: M) {
        self.enqueue(Message::new(message));
    }

    /// Removes and returns every queued message in flush order.
    pub fn drain(&self) -> Vec<Message> {
        let queue = std::mem::take(&mut self.inner.lock().queue);
        queue.into_values().collect()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }
}

impl std::fmt::Debug for Outbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox").field("len", &self.len()).finish()
    }
}
