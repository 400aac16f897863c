use std::time::Duration;

use attune_rules::settings;

/// Tunable timings for a [`SessionManager`](crate::SessionManager).
///
/// The defaults mirror the game rules; tests shrink the durations so
/// flows complete under a paused clock.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between the last ready-up and the actual game start.
    pub ready_countdown: Duration,
    /// How long an empty room survives before it is deleted.
    pub reconnect_grace: Duration,
    /// Upper bound on room-code draws before creation gives up.
    pub max_code_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ready_countdown: settings::READY_COUNTDOWN,
            reconnect_grace: settings::RECONNECT_GRACE,
            max_code_attempts: 32,
        }
    }
}
