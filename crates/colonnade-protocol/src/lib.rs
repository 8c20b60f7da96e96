//! Wire protocol for Colonnade.
//!
//! This crate defines what a game instruction looks like on the wire and
//! what happens to it on arrival:
//!
//! - **Elements** ([`Element`]): a tag plus string attributes, the unit
//!   that travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`], [`ElementReader`]): how
//!   elements become bytes, whole or as an incremental stream.
//! - **Variants** ([`MessageKind`], [`Message`], the types in
//!   [`messages`]): typed instructions built from and written to elements.
//! - **Registry** ([`Registry`]): tag → variant lookup for decoding.
//! - **Priority** ([`Priority`], [`Outbox`]): the order pending messages
//!   are sent in.
//! - **Dispatch** ([`Endpoint`]): which handler runs on arrival.
//!
//! # Architecture
//!
//! The protocol layer sits between the transport (frames of bytes) and
//! the game (players, panels). It does not know about connections; the
//! `colonnade` crate wires it to one.
//!
//! ```text
//! event → MessageKind → Outbox → Element → Codec → frame
//! frame → Codec → Element → Registry → Message → Endpoint::dispatch
//! ```

mod codec;
mod dispatch;
mod element;
mod error;
mod message;
pub mod messages;
mod outbox;
mod priority;
mod registry;

pub use codec::{Codec, ElementReader, ELEMENT_SEPARATOR};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use dispatch::{
    AiCapabilities, ClientCapabilities, DispatchOutcome, Endpoint, EndpointRole,
};
pub use element::Element;
pub use error::{HandlerError, ProtocolError, RegistryError};
pub use message::{Attribute, Message, MessageKind};
pub use messages::{
    ChatMessage, CloseMessage, GameEndedMessage, SetCurrentPlayerMessage,
};
pub use outbox::Outbox;
pub use priority::Priority;
pub use registry::Registry;
