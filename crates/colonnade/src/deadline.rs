//! Server-side timeout that closes an unanswered panel.

use std::time::Duration;

use colonnade_protocol::{CloseMessage, Outbox};
use tokio::sync::oneshot;

/// A pending `close` for a panel the server offered to a peer.
///
/// When the deadline passes before [`answered`](Self::answered) is called,
/// a [`CloseMessage`] for the panel is queued on the outbox and goes out
/// with the next flush. Dropping the guard disarms it.
#[derive(Debug)]
pub struct ResponseDeadline {
    panel: String,
    cancel: Option<oneshot::Sender<()>>,
}

impl ResponseDeadline {
    /// Starts the clock. Must be called inside a Tokio runtime.
    pub fn arm(outbox: Outbox, panel: impl Into<String>, after: Duration) -> Self {
        let panel = panel.into();
        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let target = panel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = &mut cancelled => {
                    tracing::trace!(panel = %target, "response deadline disarmed");
                    return;
                }
                _ = tokio::time::sleep(after) => {}
            }

            // Lock out a late `answered` so exactly one side wins.
            cancelled.close();
            if cancelled.try_recv().is_ok() {
                return;
            }
            tracing::info!(panel = %target, ?after, "response deadline passed, closing panel");
            outbox.push(CloseMessage::new(target));
        });

        Self {
            panel,
            cancel: Some(cancel),
        }
    }

    pub fn panel(&self) -> &str {
        &self.panel
    }

    /// Records that the peer answered in time.
    ///
    /// Returns `false` if the deadline had already fired and the `close`
    /// is queued.
    pub fn answered(mut self) -> bool {
        self.cancel
            .take()
            .is_some_and(|cancel| cancel.send(()).is_ok())
    }
}
