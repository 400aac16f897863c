//! Roster entries.

use attune_protocol::{Color, ConnectionId, PlayerView, Team};

/// A seated player. Seat order within the roster doubles as turn order,
/// so a player's position is as much state as its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Connection handle. Rebound in place on reconnect.
    pub id: ConnectionId,
    /// Display name. Reconnects are matched on this.
    pub name: String,
    pub team: Option<Team>,
    /// Lobby ready flag. Cleared whenever the team changes.
    pub ready: bool,
    /// Between-rounds ready flag. Cleared when a guess is locked and
    /// when a new round starts.
    pub ready_for_next: bool,
    /// Assigned on team join, distinct from teammates' colors.
    pub color: Option<Color>,
}

impl Player {
    pub fn new(id: ConnectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            team: None,
            ready: false,
            ready_for_next: false,
            color: None,
        }
    }

    /// Copies the player into its wire representation. Events carry
    /// owned copies, never references into the roster.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            ready: self.ready,
            ready_for_next: self.ready_for_next,
            color: self.color.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_is_unseated_and_unready() {
        let player = Player::new(ConnectionId(7), "Ann");
        assert_eq!(player.id, ConnectionId(7));
        assert_eq!(player.name, "Ann");
        assert!(player.team.is_none());
        assert!(!player.ready);
        assert!(!player.ready_for_next);
        assert!(player.color.is_none());
    }

    #[test]
    fn test_view_copies_every_field() {
        let mut player = Player::new(ConnectionId(3), "Bo");
        player.team = Some(Team::Two);
        player.ready = true;
        player.color = Some(Color::from("#ff6b6b"));

        let view = player.view();
        assert_eq!(view.id, ConnectionId(3));
        assert_eq!(view.name, "Bo");
        assert_eq!(view.team, Some(Team::Two));
        assert!(view.ready);
        assert!(!view.ready_for_next);
        assert_eq!(view.color, Some(Color::from("#ff6b6b")));
    }
}
