//! Error types for room operations.

use attune_protocol::{ConnectionId, Phase, Team};
use attune_rules::RotationError;

/// Errors that can occur while operating on a room.
///
/// Capacity errors (`RoomFull`, `TeamFull`) leave the room unchanged and
/// are reported back to the requesting connection only. The remaining
/// variants mark operations that arrived in a state that does not admit
/// them; callers drop those without broadcasting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    /// All four seats are taken.
    #[error("room is full")]
    RoomFull,

    /// The requested team already has two members.
    #[error("{0} is full")]
    TeamFull(Team),

    /// No roster member has this connection handle.
    #[error("player {0} is not in this room")]
    UnknownPlayer(ConnectionId),

    /// A game operation arrived while the room was still in the lobby.
    #[error("game has not started")]
    NotStarted,

    /// A lobby operation arrived while a game was running.
    #[error("game is already in progress")]
    GameInProgress,

    /// Start was requested without four seated, ready players.
    #[error("not every seat is ready")]
    NotReady,

    /// A phase-gated operation arrived in the wrong phase.
    #[error("expected phase {expected}, found {actual}")]
    Phase { expected: Phase, actual: Phase },

    /// The psychic seat is out of roster range or has no team. Happens
    /// only while the psychic is disconnected mid-game; the operation
    /// aborts and the room keeps its last-known-good state.
    #[error("psychic seat {0} is vacant or has no team")]
    PsychicSeat(usize),

    /// Psychic rotation could not pick a successor.
    #[error(transparent)]
    Rotation(#[from] RotationError),
}
