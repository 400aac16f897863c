//! Psychic rotation.
//!
//! The psychic role alternates between teams every round, and within a
//! full two-player team it alternates between the members. Rotation is a
//! pure function over the roster's team assignments (by seat index), the
//! current psychic's seat, and each team's most recent psychic.

use attune_protocol::Team;

use crate::settings::TEAM_SIZE;

/// Last roster seat that held the psychic role, per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastPsychics {
    team1: Option<usize>,
    team2: Option<usize>,
}

impl LastPsychics {
    pub fn get(&self, team: Team) -> Option<usize> {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }

    pub fn record(&mut self, team: Team, seat: usize) {
        match team {
            Team::One => self.team1 = Some(seat),
            Team::Two => self.team2 = Some(seat),
        }
    }
}

/// Rotation failures. All of these are invariant violations: room
/// operations keep rosters in a shape where rotation cannot fail, so a
/// caller seeing one of these must abort without mutating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RotationError {
    #[error("psychic seat {0} is outside the roster")]
    SeatOutOfBounds(usize),
    #[error("psychic seat {0} has no team")]
    SeatWithoutTeam(usize),
    #[error("{0} has no players to take the psychic role")]
    EmptyTeam(Team),
}

/// Picks the seat of the next psychic.
///
/// `teams` is the roster's team assignment per seat, in seat order. The
/// opposing team (relative to the current psychic) supplies the next
/// psychic: if that team is full and one member was its last psychic, the
/// other member is chosen; otherwise its lowest-numbered seat is.
pub fn next_psychic(
    teams: &[Option<Team>],
    current: usize,
    last: &LastPsychics,
) -> Result<usize, RotationError> {
    let seat = *teams
        .get(current)
        .ok_or(RotationError::SeatOutOfBounds(current))?;
    let current_team = seat.ok_or(RotationError::SeatWithoutTeam(current))?;
    let opposing = current_team.opponent();

    let candidates: Vec<usize> = teams
        .iter()
        .enumerate()
        .filter_map(|(index, team)| (*team == Some(opposing)).then_some(index))
        .collect();

    if candidates.is_empty() {
        return Err(RotationError::EmptyTeam(opposing));
    }

    if candidates.len() == TEAM_SIZE {
        if let Some(previous) = last.get(opposing) {
            if let Some(&other) =
                candidates.iter().find(|&&index| index != previous)
            {
                return Ok(other);
            }
        }
    }

    Ok(candidates[0])
}

// =========================================================================
// Tests
// =========================================================================
