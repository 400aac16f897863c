//! The inbound and outbound event vocabulary.
//!
//! Every frame on the wire is one JSON object with a `type` field naming
//! the event; the remaining fields are that event's payload, flattened to
//! the top level (internally tagged serde enums). [`ClientEvent`] is what
//! the server consumes, [`ServerEvent`] what it emits.
//!
//! Roster data inside events is always a [`PlayerView`] snapshot copied
//! at emit time; a later room mutation never alters a queued frame.

use serde::{Deserialize, Serialize};

use crate::types::{
    Color, ConnectionId, Phase, Prompt, PromptColors, RoomCode, Team,
    TeamScores,
};

// ---------------------------------------------------------------------------
// Payload structs
// ---------------------------------------------------------------------------

/// One roster member as clients see them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: ConnectionId,
    pub name: String,
    pub team: Option<Team>,
    pub ready: bool,
    pub ready_for_next: bool,
    pub color: Option<Color>,
}

/// Full state of the current round, shipped whenever a client needs to
/// (re)build its board: on game start, on round start, and on restore
/// after a reconnect.
///
/// The target angle is included for everyone; hiding it from non-psychic
/// players is the presentation layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub players: Vec<PlayerView>,
    pub target_angle: f64,
    pub prompt: Prompt,
    pub prompt_colors: PromptColors,
    pub psychic_team: Team,
    pub psychic_name: String,
    pub psychic_id: ConnectionId,
    /// Always equals `psychic_team`: the psychic's teammates do the
    /// guessing.
    pub guessing_team: Team,
    pub scores: TeamScores,
    pub round: u32,
    pub phase: Phase,
}

/// Outcome of a locked guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResult {
    pub points: u32,
    pub target_angle: f64,
    pub guess_angle: f64,
    pub scores: TeamScores,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Events sent by clients. All but `create_room` are room-scoped.
///
/// A connection-level disconnect is not an event; the server observes the
/// socket closing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateRoom {
        name: String,
    },
    /// Doubles as the reconnect path: the session layer first tries to
    /// rebind an existing roster entry under this name before treating
    /// the event as a fresh join.
    JoinRoom {
        room_code: RoomCode,
        name: String,
    },
    ChangeTeam {
        room_code: RoomCode,
        team: Team,
    },
    LeaveTeam {
        room_code: RoomCode,
    },
    SetReady {
        room_code: RoomCode,
    },
    SetUnready {
        room_code: RoomCode,
    },
    UpdateDial {
        room_code: RoomCode,
        angle: f64,
    },
    LockGuess {
        room_code: RoomCode,
    },
    UncoverBoard {
        room_code: RoomCode,
    },
    CoverAndBegin {
        room_code: RoomCode,
    },
    ReadyForNext {
        room_code: RoomCode,
    },
    /// Reconnect into a game already in progress.
    RequestGameState {
        room_code: RoomCode,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Events emitted by the server.
///
/// Point-to-point events (`room_created`, `room_joined`,
/// `game_state_restored`, `join_error`) go to a single connection; the
/// rest are room broadcasts. `dial_updated` is the one exception among
/// broadcasts: it skips the sender, who already has the value locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomCreated {
        room_code: RoomCode,
        name: String,
        players: Vec<PlayerView>,
    },
    RoomJoined {
        room_code: RoomCode,
        name: String,
    },
    PlayerJoined {
        players: Vec<PlayerView>,
        player_count: usize,
    },
    PlayerReadyUpdate {
        players: Vec<PlayerView>,
    },
    PlayerUnreadyUpdate {
        players: Vec<PlayerView>,
    },
    TeamChanged {
        players: Vec<PlayerView>,
    },
    GameStart(RoundSnapshot),
    DialUpdated {
        angle: f64,
    },
    GuessLocked(GuessResult),
    BoardUncovered {
        phase: Phase,
    },
    CoverBegin {
        phase: Phase,
    },
    PlayerReadyForNext {
        players: Vec<PlayerView>,
    },
    RoundStart(RoundSnapshot),
    PlayerLeft {
        players: Vec<PlayerView>,
    },
    GameStateRestored(RoundSnapshot),
    JoinError {
        message: String,
    },
}

// =========================================================================
// Tests
// =========================================================================
