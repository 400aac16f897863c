//! Pure game rules for Attune.
//!
//! Everything in this crate is a stateless function or a constant table:
//! proximity scoring, psychic rotation, the color palette and its
//! allocation rules, the prompt catalogue, and room code generation.
//! Randomized functions take `&mut impl Rng` so callers control the
//! generator: the session layer injects an OS-seeded one, tests a
//! pinned one.
//!
//! Nothing here touches rooms, connections, or the clock; state lives a
//! layer up.

mod codes;
mod colors;
mod prompts;
mod rotation;
mod scoring;
pub mod settings;

pub use codes::{ROOM_CODE_LEN, random_room_code};
pub use colors::{PALETTE, available_color, distinct_pair, random_color};
pub use prompts::{PROMPTS, random_prompt};
pub use rotation::{LastPsychics, RotationError, next_psychic};
pub use scoring::{MISS_POINTS, SCORE_BANDS, ScoreBand, score};
