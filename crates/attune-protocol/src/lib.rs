//! Wire protocol for Attune.
//!
//! Defines the vocabulary clients and the server exchange:
//!
//! - **Value types** ([`ConnectionId`], [`RoomCode`], [`Team`], [`Phase`],
//!   colors, prompts, scores): the building blocks of every payload.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) plus the snapshot
//!   payloads ([`PlayerView`], [`RoundSnapshot`], [`GuessResult`]).
//! - **Codec** ([`Codec`], [`JsonCodec`]): how events become frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! This crate knows nothing about sockets, rooms, or timers; it is pure
//! data shared by every other layer.

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{InvalidTeam, ProtocolError};
pub use events::{
    ClientEvent, GuessResult, PlayerView, RoundSnapshot, ServerEvent,
};
pub use types::{
    Color, ConnectionId, Phase, Prompt, PromptColors, RoomCode, Team,
    TeamScores,
};
