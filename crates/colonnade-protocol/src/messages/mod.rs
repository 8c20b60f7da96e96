//! The concrete message variants shipped with the protocol.
//!
//! Each file defines one variant. Adding a variant means writing its
//! `MessageKind` impl and registering it; nothing in dispatch changes.

mod chat;
mod close;
mod current_player;
mod game_ended;

pub use chat::ChatMessage;
pub use close::CloseMessage;
pub use current_player::SetCurrentPlayerMessage;
pub use game_ended::GameEndedMessage;
