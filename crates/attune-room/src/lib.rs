//! Room roster and round state machine for Attune.
//!
//! A [`Room`] holds up to four seated players and, once everyone is
//! ready, the per-round game state. All operations are synchronous and
//! deterministic given the caller's `Rng`; the session layer owns
//! serialization, timers and event delivery.
//!
//! # Key types
//!
//! - [`Room`]: roster plus the lobby/round state machine
//! - [`Player`]: one seat with its name, team, color and ready flags
//! - [`RoomError`]: why an operation was refused

mod error;
mod player;
mod room;

pub use error::RoomError;
pub use player::Player;
pub use room::Room;
