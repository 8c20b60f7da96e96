//! Per-link configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tunables for one link.
///
/// Deserializable so a server can load it with the rest of its settings;
/// run it through [`validated`](Self::validated) afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Largest frame accepted or produced, in bytes. Inbound frames over
    /// this are rejected as malformed.
    pub max_frame_len: usize,

    /// Most messages packed into one outbound frame. 0 = no limit.
    pub batch_limit: usize,

    /// How long a popup offer may go unanswered before the server closes
    /// it (see [`ResponseDeadline`](crate::ResponseDeadline)).
    pub response_deadline: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_frame_len: 1024 * 1024,
            batch_limit: 64,
            response_deadline: Duration::from_secs(60),
        }
    }
}

impl LinkConfig {
    /// Smallest `max_frame_len` that still fits any built-in message.
    pub const MIN_FRAME_LEN: usize = 256;

    /// Clamp and fix any out-of-range values so the config is safe to use.
    ///
    /// Called automatically when a link is opened. Rules:
    /// - `max_frame_len` raised to at least [`Self::MIN_FRAME_LEN`].
    /// - A zero `response_deadline` is replaced by the default.
    pub fn validated(mut self) -> Self {
        if self.max_frame_len < Self::MIN_FRAME_LEN {
            warn!(
                max_frame_len = self.max_frame_len,
                min = Self::MIN_FRAME_LEN,
                "max_frame_len below minimum, raising"
            );
            self.max_frame_len = Self::MIN_FRAME_LEN;
        }
        if self.response_deadline.is_zero() {
            warn!("response_deadline is zero, using default");
            self.response_deadline = Self::default().response_deadline;
        }
        self
    }

    /// Returns `true` if a batch already holding `count` messages is full.
    pub(crate) fn batch_full(&self, count: usize) -> bool {
        self.batch_limit != 0 && count >= self.batch_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.max_frame_len, 1024 * 1024);
        assert_eq!(cfg.batch_limit, 64);
        assert_eq!(cfg.response_deadline, Duration::from_secs(60));
        assert_eq!(cfg.clone().validated(), cfg);
    }

    #[test]
    fn test_validated_raises_tiny_frame_limit() {
        let cfg = LinkConfig {
            max_frame_len: 10,
            ..LinkConfig::default()
        }
        .validated();
        assert_eq!(cfg.max_frame_len, LinkConfig::MIN_FRAME_LEN);
    }

    #[test]
    fn test_validated_replaces_zero_deadline() {
        let cfg = LinkConfig {
            response_deadline: Duration::ZERO,
            ..LinkConfig::default()
        }
        .validated();
        assert_eq!(cfg.response_deadline, Duration::from_secs(60));
    }

    #[test]
    fn test_batch_full() {
        let unlimited = LinkConfig {
            batch_limit: 0,
            ..LinkConfig::default()
        };
        assert!(!unlimited.batch_full(10_000));

        let two = LinkConfig {
            batch_limit: 2,
            ..LinkConfig::default()
        };
        assert!(!two.batch_full(1));
        assert!(two.batch_full(2));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let cfg: LinkConfig = serde_json::from_str(r#"{"batch_limit": 8}"#).unwrap();
        assert_eq!(cfg.batch_limit, 8);
        assert_eq!(cfg.max_frame_len, 1024 * 1024);
    }
}
