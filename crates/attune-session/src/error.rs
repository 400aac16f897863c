use attune_protocol::RoomCode;
use attune_room::RoomError;

/// Errors surfaced while routing a client event to a room.
///
/// The `Display` text of these variants is what clients receive in a
/// `join_error` event, so the wording stays user-facing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// A state restore was requested for a room still in the lobby.
    #[error("no game running in room {0}")]
    GameNotFound(RoomCode),

    /// The connection already belongs to a different room.
    #[error("already in another room")]
    AlreadyInRoom,

    /// Every code draw collided with an existing room.
    #[error("could not allocate a room code")]
    CodesExhausted,

    #[error(transparent)]
    Room(#[from] RoomError),
}
