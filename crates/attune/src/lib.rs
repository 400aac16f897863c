//! Real-time server for Attune, a four-player team guessing game
//! played around a hidden dial.
//!
//! This crate is the WebSocket edge: it accepts connections, decodes
//! frames into client events, and hands them to the session layer. The
//! rest of the game lives below it:
//!
//! - `attune-protocol`: wire events, value types, codec
//! - `attune-rules`: scoring bands, psychic rotation, palette, prompts
//! - `attune-room`: a single room's roster and round state machine
//! - `attune-timer`: cancellable deferred tasks
//! - `attune-session`: the room registry, reconnects, and timers

mod error;
mod handler;
mod server;

pub use attune_session::SessionConfig;
pub use error::ServerError;
pub use server::{Server, ServerBuilder};
