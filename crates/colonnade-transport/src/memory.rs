//! In-process transport: two connections joined by unbounded channels.

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, TransportError};

/// One end of an in-memory link created by [`MemoryConnection::pair`].
///
/// Frames sent on one end arrive, in order, on the other. Closing (or
/// dropping) one end makes the peer's `recv` return `Ok(None)` and its
/// `send` fail with [`TransportError::ConnectionClosed`].
pub struct MemoryConnection {
    id: ConnectionId,
    tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryConnection {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: ConnectionId::next(),
            tx: Mutex::new(Some(a_tx)),
            rx: Mutex::new(a_rx),
        };
        let b = Self {
            id: ConnectionId::next(),
            tx: Mutex::new(Some(b_tx)),
            rx: Mutex::new(b_rx),
        };
        tracing::debug!(a = %a.id, b = %b.id, "created in-memory link");
        (a, b)
    }
}

impl Connection for MemoryConnection {
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let tx = self.tx.lock().await;
        let Some(tx) = tx.as_ref() else {
            return Err(TransportError::ConnectionClosed(format!(
                "{} closed locally",
                self.id
            )));
        };
        tx.send(frame.to_vec()).map_err(|_| {
            TransportError::ConnectionClosed(format!(
                "peer of {} went away",
                self.id
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.rx.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        // Dropping our sender ends the peer's receive stream.
        self.tx.lock().await.take();
        // A task parked in `recv` holds the receiver; it sees the end of
        // stream once the peer drops its side.
        if let Ok(mut rx) = self.rx.try_lock() {
            rx.close();
        }
        tracing::debug!(id = %self.id, "closed in-memory connection");
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_delivers_frames_in_order() {
        let (a, b) = MemoryConnection::pair();
        a.send(b"one").await.unwrap();
        a.send(b"two").await.unwrap();

        assert_eq!(b.recv().await.unwrap().unwrap(), b"one");
        assert_eq!(b.recv().await.unwrap().unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_pair_ends_have_distinct_ids() {
        let (a, b) = MemoryConnection::pair();
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_close_ends_peer_stream() {
        let (a, b) = MemoryConnection::pair();
        a.close().await.unwrap();
        assert!(b.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_local_close_fails() {
        let (a, _b) = MemoryConnection::pair();
        a.close().await.unwrap();
        let err = a.send(b"late").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }

    #[tokio::test]
    async fn test_send_to_dropped_peer_fails() {
        let (a, b) = MemoryConnection::pair();
        drop(b);
        let err = a.send(b"nobody home").await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed(_)));
    }
}
