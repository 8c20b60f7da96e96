//! Priority tiers for pending outbound messages.

use std::fmt;

/// The order class of a message variant.
///
/// When several messages are waiting in an [`Outbox`](crate::Outbox),
/// lower tiers are sent first and ties keep their enqueue order. Priority
/// never appears on the wire: each variant declares it, so both ends
/// recompute the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    /// Must be applied before ordinary updates (turn changes).
    Early,
    /// Ordinary game updates.
    #[default]
    Normal,
    /// Applied after the updates it summarizes (end of game).
    Late,
    /// Cleanup instructions. Always sent after everything else in a flush.
    Last,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Early => "early",
            Self::Normal => "normal",
            Self::Late => "late",
            Self::Last => "last",
        };
        f.write_str(name)
    }
}
