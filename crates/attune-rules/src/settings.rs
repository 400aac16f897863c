//! Fixed game settings.
//!
//! Everything tunable about the game lives here as a named constant;
//! nothing below this module hardcodes a threshold or a duration at a
//! call site.

use std::time::Duration;

/// A room seats exactly this many players before a game can start.
pub const MAX_PLAYERS: usize = 4;

/// Players per team.
pub const TEAM_SIZE: usize = 2;

/// Dial position at round start, centered on the board.
pub const DEFAULT_DIAL_ANGLE: f64 = 90.0;

/// Target angles are drawn uniformly from `[0, TARGET_ANGLE_MAX)`;
/// dial angles are clamped into `[0, TARGET_ANGLE_MAX]`.
pub const TARGET_ANGLE_MAX: f64 = 180.0;

/// Delay between "everyone is ready" and the game actually starting,
/// giving any player a window to back out.
pub const READY_COUNTDOWN: Duration = Duration::from_secs(3);

/// How long an emptied room and its disconnected players are kept
/// around for a reconnect.
pub const RECONNECT_GRACE: Duration = Duration::from_secs(30);

/// Minimum palette index distance between the two gradient endpoint
/// colors of a prompt.
pub const MIN_COLOR_INDEX_DIFFERENCE: usize = 3;
