//! Shared identifiers and small value types that travel on the wire.
//!
//! Everything here is serialization-friendly by construction: identifiers
//! are `#[serde(transparent)]` newtypes, teams serialize as the integers
//! 1/2, and phases as lowercase strings. Clients never see a Rust-flavored
//! representation of any of these.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::InvalidTeam;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identity handle: the process-unique id of the connection
/// they joined on.
///
/// The handle is opaque to clients but does travel on the wire (round
/// snapshots carry the psychic's handle so clients can tell who holds the
/// role). Reconnecting mints a fresh handle; the session layer rebinds the
/// roster entry to it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A six-character room code, unique among live rooms.
///
/// Serializes as a plain string. Codes are generated server-side from the
/// uppercase alphanumeric alphabet; lookups are exact-match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// One of the two fixed teams.
///
/// On the wire a team is the integer `1` or `2` (the representation the
/// original client understands), hence the `try_from`/`into` attributes
/// rather than the default string tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Team {
    One,
    Two,
}

impl Team {
    /// The other team. Rotation hands the psychic role back and forth
    /// through this.
    pub fn opponent(self) -> Team {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }
}

impl TryFrom<u8> for Team {
    type Error = InvalidTeam;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Team::One),
            2 => Ok(Team::Two),
            other => Err(InvalidTeam(other)),
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> u8 {
        match team {
            Team::One => 1,
            Team::Two => 2,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", u8::from(*self))
    }
}

// ---------------------------------------------------------------------------
// Round phases
// ---------------------------------------------------------------------------

/// Phase of an active round.
///
/// `psychic`: board covered, waiting for the psychic to peek.
/// `revealed`: target shown to the psychic, who composes a clue.
/// `guessing`: board covered again while the psychic's teammate drives
/// the dial.
///
/// The pre-game lobby is not a phase; a room without active-game state is
/// in the lobby by definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Psychic,
    Revealed,
    Guessing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Psychic => "psychic",
            Phase::Revealed => "revealed",
            Phase::Guessing => "guessing",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Colors and prompts
// ---------------------------------------------------------------------------

/// A player or gradient color as a `#rrggbb` hex string from the fixed
/// palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Color {
    fn from(hex: &str) -> Self {
        Self(hex.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A pair of opposing concept labels framing the hidden target's meaning,
/// e.g. "Hot" / "Cold".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub left: String,
    pub right: String,
}

impl Prompt {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// The two gradient endpoint colors behind the current prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptColors {
    pub color1: Color,
    pub color2: Color,
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// Running score totals for both teams.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct TeamScores {
    pub team1: u32,
    pub team2: u32,
}

impl TeamScores {
    pub fn get(&self, team: Team) -> u32 {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }

    pub fn add(&mut self, team: Team, points: u32) {
        match team {
            Team::One => self.team1 += points,
            Team::Two => self.team2 += points,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ConnectionId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "C-7");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::from("AB12CD")).unwrap();
        assert_eq!(json, "\"AB12CD\"");
    }

    #[test]
    fn test_team_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Team::One).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Team::Two).unwrap(), "2");
    }

    #[test]
    fn test_team_deserializes_from_integer() {
        let team: Team = serde_json::from_str("2").unwrap();
        assert_eq!(team, Team::Two);
    }

    #[test]
    fn test_team_rejects_out_of_range_integer() {
        let result: Result<Team, _> = serde_json::from_str("3");
        assert!(result.is_err());
    }

    #[test]
    fn test_team_opponent_flips() {
        assert_eq!(Team::One.opponent(), Team::Two);
        assert_eq!(Team::Two.opponent(), Team::One);
    }

    #[test]
    fn test_phase_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&Phase::Guessing).unwrap();
        assert_eq!(json, "\"guessing\"");
    }

    #[test]
    fn test_phase_display_matches_wire_name() {
        assert_eq!(Phase::Revealed.to_string(), "revealed");
    }

    #[test]
    fn test_scores_get_and_add_by_team() {
        let mut scores = TeamScores::default();
        scores.add(Team::One, 3);
        scores.add(Team::One, 4);
        scores.add(Team::Two, 2);
        assert_eq!(scores.get(Team::One), 7);
        assert_eq!(scores.get(Team::Two), 2);
        assert_eq!(scores.team1, 7);
    }

    #[test]
    fn test_prompt_colors_json_field_names() {
        let pair = PromptColors {
            color1: Color::from("#ff6b6b"),
            color2: Color::from("#0abde3"),
        };
        let json: serde_json::Value = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["color1"], "#ff6b6b");
        assert_eq!(json["color2"], "#0abde3");
    }
}
