//! A single game room: the roster and the round state machine.
//!
//! `Room` is plain state with synchronous operations. It never spawns
//! tasks, never sends messages, and draws randomness only through the
//! `Rng` handed to it, so every transition is deterministic under test.
//! The session layer serializes access and turns results into events.

use attune_protocol::{
    ConnectionId, GuessResult, Phase, PlayerView, Prompt, PromptColors,
    RoomCode, RoundSnapshot, Team, TeamScores,
};
use attune_rules::settings::{
    DEFAULT_DIAL_ANGLE, MAX_PLAYERS, TARGET_ANGLE_MAX, TEAM_SIZE,
};
use attune_rules::{
    available_color, distinct_pair, next_psychic, random_prompt, score,
    LastPsychics,
};
use rand::Rng;

use crate::{Player, RoomError};

// ---------------------------------------------------------------------------
// ActiveGame
// ---------------------------------------------------------------------------

/// Round state, present only while a game is running. A room with no
/// `ActiveGame` is in the lobby.
#[derive(Debug, Clone, PartialEq)]
struct ActiveGame {
    phase: Phase,
    round: u32,
    /// Seat index of the current psychic.
    psychic: usize,
    last_psychics: LastPsychics,
    scores: TeamScores,
    /// Hidden target, drawn uniformly from [0, 180) each round.
    target_angle: f64,
    /// Last dial position reported by the guessing team.
    dial_angle: f64,
    prompt: Prompt,
    prompt_colors: PromptColors,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One room: a code, up to four seated players, and (once started) the
/// round state.
///
/// Seat order is turn order. Team composition is frozen once a game
/// starts; psychic rotation expects every seat to keep its team.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    code: RoomCode,
    players: Vec<Player>,
    game: Option<ActiveGame>,
}

impl Room {
    /// Creates a room in the lobby with its creator already seated.
    pub fn new(
        code: RoomCode,
        creator: ConnectionId,
        name: impl Into<String>,
    ) -> Self {
        Self {
            code,
            players: vec![Player::new(creator, name)],
            game: None,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// `true` until a game starts.
    pub fn is_lobby(&self) -> bool {
        self.game.is_none()
    }

    /// Current phase, or `None` in the lobby.
    pub fn phase(&self) -> Option<Phase> {
        self.game.as_ref().map(|game| game.phase)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.players.iter().any(|player| player.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    /// Copies the roster into its wire representation.
    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    fn player_mut(
        &mut self,
        id: ConnectionId,
    ) -> Result<&mut Player, RoomError> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RoomError::UnknownPlayer(id))
    }

    // -- lobby operations ---------------------------------------------------

    /// Seats a new player. Fails once all four seats are taken.
    pub fn join(
        &mut self,
        id: ConnectionId,
        name: impl Into<String>,
    ) -> Result<(), RoomError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(RoomError::RoomFull);
        }
        self.players.push(Player::new(id, name));
        Ok(())
    }

    /// Moves a player onto a team and assigns a color no other seated
    /// player holds. Clears the ready flag so the new lineup has to
    /// confirm again. Rejected once a game is running.
    pub fn change_team(
        &mut self,
        id: ConnectionId,
        team: Team,
        rng: &mut impl Rng,
    ) -> Result<(), RoomError> {
        if self.game.is_some() {
            return Err(RoomError::GameInProgress);
        }
        if !self.contains(id) {
            return Err(RoomError::UnknownPlayer(id));
        }
        let members = self
            .players
            .iter()
            .filter(|player| player.team == Some(team))
            .count();
        if members >= TEAM_SIZE {
            return Err(RoomError::TeamFull(team));
        }

        let used: Vec<_> = self
            .players
            .iter()
            .filter(|player| player.id != id)
            .filter_map(|player| player.color.clone())
            .collect();
        let color = available_color(rng, &used);

        let player = self.player_mut(id)?;
        player.team = Some(team);
        player.ready = false;
        player.color = Some(color);
        Ok(())
    }

    /// Returns a player to the unseated pool, clearing team, ready flag
    /// and color. Rejected once a game is running.
    pub fn leave_team(&mut self, id: ConnectionId) -> Result<(), RoomError> {
        if self.game.is_some() {
            return Err(RoomError::GameInProgress);
        }
        let player = self.player_mut(id)?;
        player.team = None;
        player.ready = false;
        player.color = None;
        Ok(())
    }

    /// Marks a player ready. Returns `true` when this call completed
    /// the lobby, which is the caller's cue to arm the countdown. A
    /// repeat ready-up from an already-ready player reports `false`;
    /// the lobby did not become eligible, it already was.
    pub fn set_ready(&mut self, id: ConnectionId) -> Result<bool, RoomError> {
        let player = self.player_mut(id)?;
        let flipped = !player.ready;
        player.ready = true;
        Ok(flipped && self.is_lobby() && self.all_ready())
    }

    pub fn set_unready(&mut self, id: ConnectionId) -> Result<(), RoomError> {
        self.player_mut(id)?.ready = false;
        Ok(())
    }

    /// Four seated players, each on a team and ready.
    pub fn all_ready(&self) -> bool {
        self.players.len() == MAX_PLAYERS
            && self
                .players
                .iter()
                .all(|player| player.ready && player.team.is_some())
    }

    // -- round state machine ------------------------------------------------

    /// Starts round one: picks a random psychic seat, target angle,
    /// prompt and gradient colors, and seeds the rotation history with
    /// the opening psychic.
    pub fn start_game(
        &mut self,
        rng: &mut impl Rng,
    ) -> Result<RoundSnapshot, RoomError> {
        if self.game.is_some() {
            return Err(RoomError::GameInProgress);
        }
        if !self.all_ready() {
            return Err(RoomError::NotReady);
        }

        let psychic = rng.random_range(0..self.players.len());
        let team = self.players[psychic]
            .team
            .ok_or(RoomError::PsychicSeat(psychic))?;
        let mut last_psychics = LastPsychics::default();
        last_psychics.record(team, psychic);

        self.game = Some(ActiveGame {
            phase: Phase::Psychic,
            round: 1,
            psychic,
            last_psychics,
            scores: TeamScores::default(),
            target_angle: rng.random_range(0.0..TARGET_ANGLE_MAX),
            dial_angle: DEFAULT_DIAL_ANGLE,
            prompt: random_prompt(rng),
            prompt_colors: distinct_pair(rng),
        });
        self.snapshot()
    }

    /// Reveals the target to the psychic: `psychic` → `revealed`.
    pub fn uncover(&mut self) -> Result<Phase, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;
        if game.phase != Phase::Psychic {
            return Err(RoomError::Phase {
                expected: Phase::Psychic,
                actual: game.phase,
            });
        }
        game.phase = Phase::Revealed;
        Ok(game.phase)
    }

    /// Hides the target again and opens guessing: `revealed` →
    /// `guessing`.
    pub fn begin_guessing(&mut self) -> Result<Phase, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;
        if game.phase != Phase::Revealed {
            return Err(RoomError::Phase {
                expected: Phase::Revealed,
                actual: game.phase,
            });
        }
        game.phase = Phase::Guessing;
        Ok(game.phase)
    }

    /// Stores the dial position as reported. Range policy belongs to
    /// the caller; the room only gates on phase.
    pub fn update_dial(&mut self, angle: f64) -> Result<f64, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;
        if game.phase != Phase::Guessing {
            return Err(RoomError::Phase {
                expected: Phase::Guessing,
                actual: game.phase,
            });
        }
        game.dial_angle = angle;
        Ok(angle)
    }

    /// Scores the locked dial position against the hidden target and
    /// credits the psychic's team, which is also the guessing team.
    /// Clears every between-rounds ready flag so the next round waits
    /// for everyone.
    pub fn lock_guess(&mut self) -> Result<GuessResult, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;
        if game.phase != Phase::Guessing {
            return Err(RoomError::Phase {
                expected: Phase::Guessing,
                actual: game.phase,
            });
        }
        let team = self
            .players
            .get(game.psychic)
            .and_then(|player| player.team)
            .ok_or(RoomError::PsychicSeat(game.psychic))?;

        let points = score(game.dial_angle, game.target_angle);
        game.scores.add(team, points);
        let result = GuessResult {
            points,
            target_angle: game.target_angle,
            guess_angle: game.dial_angle,
            scores: game.scores,
        };

        for player in &mut self.players {
            player.ready_for_next = false;
        }
        Ok(result)
    }

    /// Flags a player as ready for the next round. Returns `true` once
    /// every seated player has the flag, which is the caller's cue to
    /// advance the round.
    pub fn set_ready_for_next(
        &mut self,
        id: ConnectionId,
    ) -> Result<bool, RoomError> {
        if self.game.is_none() {
            return Err(RoomError::NotStarted);
        }
        self.player_mut(id)?.ready_for_next = true;
        Ok(self.all_ready_for_next())
    }

    pub fn all_ready_for_next(&self) -> bool {
        self.players.iter().all(|player| player.ready_for_next)
    }

    /// Advances to the next round: rotation hands the psychic role to
    /// the opposing team, then the round state is redrawn.
    ///
    /// Rotation runs before anything is mutated. If it fails the room
    /// is left exactly as it was and the error tells the caller not to
    /// broadcast.
    pub fn next_round(
        &mut self,
        rng: &mut impl Rng,
    ) -> Result<RoundSnapshot, RoomError> {
        if !self.all_ready_for_next() {
            return Err(RoomError::NotReady);
        }
        let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;

        let teams: Vec<Option<Team>> =
            self.players.iter().map(|player| player.team).collect();
        let next = next_psychic(&teams, game.psychic, &game.last_psychics)?;

        if let Some(team) = teams.get(game.psychic).copied().flatten() {
            game.last_psychics.record(team, game.psychic);
        }
        game.psychic = next;
        game.round += 1;
        game.phase = Phase::Psychic;
        game.dial_angle = DEFAULT_DIAL_ANGLE;
        game.target_angle = rng.random_range(0.0..TARGET_ANGLE_MAX);
        game.prompt = random_prompt(rng);
        game.prompt_colors = distinct_pair(rng);

        for player in &mut self.players {
            player.ready_for_next = false;
        }
        self.snapshot()
    }

    /// Builds the full round snapshot sent on game start, round start
    /// and reconnect restore.
    pub fn snapshot(&self) -> Result<RoundSnapshot, RoomError> {
        let game = self.game.as_ref().ok_or(RoomError::NotStarted)?;
        let psychic = self
            .players
            .get(game.psychic)
            .ok_or(RoomError::PsychicSeat(game.psychic))?;
        let psychic_team =
            psychic.team.ok_or(RoomError::PsychicSeat(game.psychic))?;

        Ok(RoundSnapshot {
            players: self.player_views(),
            target_angle: game.target_angle,
            prompt: game.prompt.clone(),
            prompt_colors: game.prompt_colors.clone(),
            psychic_team,
            psychic_name: psychic.name.clone(),
            psychic_id: psychic.id,
            guessing_team: psychic_team,
            scores: game.scores,
            round: game.round,
            phase: game.phase,
        })
    }

    // -- roster maintenance -------------------------------------------------

    /// Unseats a player, returning the vacated seat index and the
    /// player for the disconnect table. Later seats shift down until a
    /// restore puts the player back.
    pub fn remove(&mut self, id: ConnectionId) -> Option<(usize, Player)> {
        let seat = self.players.iter().position(|player| player.id == id)?;
        Some((seat, self.players.remove(seat)))
    }

    /// Reseats a previously removed player at (or as close as possible
    /// to) the original seat, preserving turn order across a
    /// disconnect/reconnect cycle.
    pub fn restore(
        &mut self,
        player: Player,
        seat: usize,
    ) -> Result<(), RoomError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(RoomError::RoomFull);
        }
        let seat = seat.min(self.players.len());
        self.players.insert(seat, player);
        Ok(())
    }

    /// Points an existing roster entry with this display name at a new
    /// connection, returning the handle it previously had. Covers a
    /// client that reconnects before its old entry was ever removed.
    pub fn rebind(
        &mut self,
        name: &str,
        id: ConnectionId,
    ) -> Option<ConnectionId> {
        let player =
            self.players.iter_mut().find(|player| player.name == name)?;
        let previous = player.id;
        player.id = id;
        Some(previous)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn code() -> RoomCode {
        RoomCode::from("AB12CD")
    }

    const ANN: ConnectionId = ConnectionId(1);
    const BO: ConnectionId = ConnectionId(2);
    const CY: ConnectionId = ConnectionId(3);
    const DI: ConnectionId = ConnectionId(4);

    /// Room with Ann/Bo on team one and Cy/Di on team two, all ready.
    fn full_lobby(rng: &mut StdRng) -> Room {
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.join(CY, "Cy").unwrap();
        room.join(DI, "Di").unwrap();
        for (id, team) in [
            (ANN, Team::One),
            (BO, Team::One),
            (CY, Team::Two),
            (DI, Team::Two),
        ] {
            room.change_team(id, team, rng).unwrap();
        }
        for id in [ANN, BO, CY, DI] {
            room.set_ready(id).unwrap();
        }
        room
    }

    fn started_room(rng: &mut StdRng) -> (Room, RoundSnapshot) {
        let mut room = full_lobby(rng);
        let snapshot = room.start_game(rng).unwrap();
        (room, snapshot)
    }

    // -- roster and teams ---------------------------------------------------

    #[test]
    fn test_join_caps_roster_at_four() {
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.join(CY, "Cy").unwrap();
        room.join(DI, "Di").unwrap();

        let err = room.join(ConnectionId(5), "Ed").unwrap_err();
        assert_eq!(err, RoomError::RoomFull);
        assert_eq!(room.len(), 4);
    }

    #[test]
    fn test_change_team_assigns_distinct_colors() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.change_team(BO, Team::One, &mut rng).unwrap();

        let colors: Vec<_> = room
            .players()
            .iter()
            .map(|p| p.color.clone().unwrap())
            .collect();
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn test_change_team_to_full_team_fails_without_mutation() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.join(CY, "Cy").unwrap();
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.change_team(BO, Team::One, &mut rng).unwrap();
        room.change_team(CY, Team::Two, &mut rng).unwrap();

        let err = room.change_team(CY, Team::One, &mut rng).unwrap_err();
        assert_eq!(err, RoomError::TeamFull(Team::One));
        assert_eq!(room.players()[2].team, Some(Team::Two));
    }

    #[test]
    fn test_change_team_resets_ready() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.set_ready(ANN).unwrap();

        room.change_team(ANN, Team::Two, &mut rng).unwrap();
        assert!(!room.players()[0].ready);
    }

    #[test]
    fn test_leave_team_clears_team_ready_and_color() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.set_ready(ANN).unwrap();

        room.leave_team(ANN).unwrap();
        let player = &room.players()[0];
        assert!(player.team.is_none());
        assert!(!player.ready);
        assert!(player.color.is_none());
    }

    #[test]
    fn test_team_moves_rejected_after_start() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        assert_eq!(
            room.change_team(ANN, Team::Two, &mut rng).unwrap_err(),
            RoomError::GameInProgress
        );
        assert_eq!(
            room.leave_team(ANN).unwrap_err(),
            RoomError::GameInProgress
        );
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let mut room = Room::new(code(), ANN, "Ann");
        let ghost = ConnectionId(99);
        assert_eq!(
            room.set_ready(ghost).unwrap_err(),
            RoomError::UnknownPlayer(ghost)
        );
    }

    // -- readiness ----------------------------------------------------------

    #[test]
    fn test_all_ready_requires_four_seated_ready_players() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.join(CY, "Cy").unwrap();
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.change_team(BO, Team::One, &mut rng).unwrap();
        room.change_team(CY, Team::Two, &mut rng).unwrap();
        for id in [ANN, BO, CY] {
            room.set_ready(id).unwrap();
        }
        // Three ready players are not enough.
        assert!(!room.all_ready());

        room.join(DI, "Di").unwrap();
        room.change_team(DI, Team::Two, &mut rng).unwrap();
        assert!(!room.all_ready());

        let eligible = room.set_ready(DI).unwrap();
        assert!(eligible);
        assert!(room.all_ready());
    }

    #[test]
    fn test_set_ready_signals_eligibility_only_when_complete() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        assert!(!room.set_ready(ANN).unwrap());
    }

    #[test]
    fn test_set_ready_repeat_in_ready_lobby_reports_ineligible() {
        let mut rng = rng();
        let mut room = full_lobby(&mut rng);
        // Eligibility was signaled by the completing ready-up; a
        // repeat reports nothing new.
        assert!(!room.set_ready(ANN).unwrap());
        assert!(room.all_ready());
    }

    #[test]
    fn test_unseated_player_blocks_readiness() {
        let mut rng = rng();
        let mut room = full_lobby(&mut rng);
        room.leave_team(DI).unwrap();
        room.set_ready(DI).unwrap();
        // Ready without a team does not count.
        assert!(!room.all_ready());
    }

    // -- start --------------------------------------------------------------

    #[test]
    fn test_start_game_requires_full_ready_lobby() {
        let mut rng = rng();
        let mut room = Room::new(code(), ANN, "Ann");
        assert_eq!(room.start_game(&mut rng).unwrap_err(), RoomError::NotReady);
    }

    #[test]
    fn test_start_game_initializes_round_one() {
        let mut rng = rng();
        let (room, snapshot) = started_room(&mut rng);

        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.phase, Phase::Psychic);
        assert!(snapshot.target_angle >= 0.0);
        assert!(snapshot.target_angle < TARGET_ANGLE_MAX);
        assert_eq!(snapshot.guessing_team, snapshot.psychic_team);
        assert_eq!(snapshot.scores, TeamScores::default());
        assert_eq!(snapshot.players.len(), 4);
        assert_eq!(room.phase(), Some(Phase::Psychic));
        assert!(!room.is_lobby());
    }

    #[test]
    fn test_start_game_twice_is_rejected() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        assert_eq!(
            room.start_game(&mut rng).unwrap_err(),
            RoomError::GameInProgress
        );
    }

    // -- phases -------------------------------------------------------------

    #[test]
    fn test_phase_walk_psychic_revealed_guessing() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        assert_eq!(room.uncover().unwrap(), Phase::Revealed);
        assert_eq!(room.begin_guessing().unwrap(), Phase::Guessing);
    }

    #[test]
    fn test_uncover_outside_psychic_phase_is_rejected() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        room.uncover().unwrap();

        assert_eq!(
            room.uncover().unwrap_err(),
            RoomError::Phase {
                expected: Phase::Psychic,
                actual: Phase::Revealed,
            }
        );
    }

    #[test]
    fn test_begin_guessing_requires_revealed_phase() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        assert_eq!(
            room.begin_guessing().unwrap_err(),
            RoomError::Phase {
                expected: Phase::Revealed,
                actual: Phase::Psychic,
            }
        );
    }

    #[test]
    fn test_update_dial_requires_guessing_phase() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        assert!(room.update_dial(45.0).is_err());
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        assert_eq!(room.update_dial(45.0).unwrap(), 45.0);
    }

    #[test]
    fn test_game_ops_in_lobby_are_rejected() {
        let mut room = Room::new(code(), ANN, "Ann");
        assert_eq!(room.uncover().unwrap_err(), RoomError::NotStarted);
        assert_eq!(room.lock_guess().unwrap_err(), RoomError::NotStarted);
        assert_eq!(room.snapshot().unwrap_err(), RoomError::NotStarted);
    }

    // -- scoring ------------------------------------------------------------

    #[test]
    fn test_lock_guess_credits_psychic_team() {
        let mut rng = rng();
        let (mut room, snapshot) = started_room(&mut rng);
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        room.update_dial(snapshot.target_angle + 5.0).unwrap();

        let result = room.lock_guess().unwrap();
        assert_eq!(result.points, 3);
        assert_eq!(result.scores.get(snapshot.psychic_team), 3);
        assert_eq!(result.scores.get(snapshot.psychic_team.opponent()), 0);
        assert_eq!(result.target_angle, snapshot.target_angle);
    }

    #[test]
    fn test_lock_guess_outside_guessing_phase_is_rejected() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        assert!(matches!(
            room.lock_guess().unwrap_err(),
            RoomError::Phase { .. }
        ));
    }

    #[test]
    fn test_lock_guess_clears_ready_for_next_flags() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        room.set_ready_for_next(ANN).unwrap();

        room.lock_guess().unwrap();
        assert!(room.players().iter().all(|p| !p.ready_for_next));
    }

    // -- round advance ------------------------------------------------------

    fn play_round(room: &mut Room) {
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        room.lock_guess().unwrap();
        for id in [ANN, BO, CY, DI] {
            room.set_ready_for_next(id).unwrap();
        }
    }

    #[test]
    fn test_set_ready_for_next_reports_when_all_flagged() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        assert!(!room.set_ready_for_next(ANN).unwrap());
        assert!(!room.set_ready_for_next(BO).unwrap());
        assert!(!room.set_ready_for_next(CY).unwrap());
        assert!(room.set_ready_for_next(DI).unwrap());
    }

    #[test]
    fn test_next_round_rotates_to_opposing_team() {
        let mut rng = rng();
        let (mut room, first) = started_room(&mut rng);
        play_round(&mut room);

        let second = room.next_round(&mut rng).unwrap();
        assert_eq!(second.round, 2);
        assert_eq!(second.phase, Phase::Psychic);
        assert_eq!(second.psychic_team, first.psychic_team.opponent());
        assert!(room.players().iter().all(|p| !p.ready_for_next));
    }

    #[test]
    fn test_next_round_requires_everyone_ready() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        room.lock_guess().unwrap();
        room.set_ready_for_next(ANN).unwrap();

        assert_eq!(room.next_round(&mut rng).unwrap_err(), RoomError::NotReady);
    }

    #[test]
    fn test_next_round_resets_dial_to_default() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        room.update_dial(12.0).unwrap();
        room.lock_guess().unwrap();
        for id in [ANN, BO, CY, DI] {
            room.set_ready_for_next(id).unwrap();
        }
        room.next_round(&mut rng).unwrap();

        // Lock immediately in round two: the guess must be the reset
        // default, not the 12.0 left over from round one.
        room.uncover().unwrap();
        room.begin_guessing().unwrap();
        let result = room.lock_guess().unwrap();
        assert_eq!(result.guess_angle, DEFAULT_DIAL_ANGLE);
    }

    #[test]
    fn test_rotation_visits_both_opposing_members() {
        let mut rng = rng();
        let (mut room, first) = started_room(&mut rng);

        // Two full cycles bring the role back to the opening team via
        // both members of the opposing team.
        let mut psychics = vec![first.psychic_id];
        for _ in 0..3 {
            play_round(&mut room);
            psychics.push(room.next_round(&mut rng).unwrap().psychic_id);
        }
        psychics.sort();
        psychics.dedup();
        assert_eq!(psychics.len(), 4);
    }

    #[test]
    fn test_next_round_failure_leaves_room_untouched() {
        let mut rng = rng();
        // Hand-built mid-game state whose opposing team is empty.
        let mut room = Room::new(code(), ANN, "Ann");
        room.join(BO, "Bo").unwrap();
        room.change_team(ANN, Team::One, &mut rng).unwrap();
        room.change_team(BO, Team::One, &mut rng).unwrap();
        room.game = Some(ActiveGame {
            phase: Phase::Guessing,
            round: 3,
            psychic: 0,
            last_psychics: LastPsychics::default(),
            scores: TeamScores::default(),
            target_angle: 90.0,
            dial_angle: 90.0,
            prompt: Prompt::new("Hot", "Cold"),
            prompt_colors: distinct_pair(&mut rng),
        });
        room.players[0].ready_for_next = true;
        room.players[1].ready_for_next = true;
        let before = room.clone();

        let err = room.next_round(&mut rng).unwrap_err();
        assert!(matches!(err, RoomError::Rotation(_)));
        assert_eq!(room, before);
    }

    // -- roster maintenance -------------------------------------------------

    #[test]
    fn test_remove_returns_seat_and_player() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        let (seat, player) = room.remove(BO).unwrap();
        assert_eq!(seat, 1);
        assert_eq!(player.name, "Bo");
        assert_eq!(room.len(), 3);
        assert!(room.remove(BO).is_none());
    }

    #[test]
    fn test_restore_preserves_turn_order() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);
        let order: Vec<_> = room.players().iter().map(|p| p.id).collect();

        let (seat, mut player) = room.remove(BO).unwrap();
        player.id = ConnectionId(20);
        room.restore(player, seat).unwrap();

        let restored: Vec<_> = room.players().iter().map(|p| p.id).collect();
        assert_eq!(restored[0], order[0]);
        assert_eq!(restored[1], ConnectionId(20));
        assert_eq!(&restored[2..], &order[2..]);
    }

    #[test]
    fn test_restore_into_refilled_room_is_rejected() {
        let mut rng = rng();
        let mut room = full_lobby(&mut rng);
        let (seat, player) = room.remove(DI).unwrap();
        room.join(ConnectionId(5), "Ed").unwrap();

        assert_eq!(room.restore(player, seat).unwrap_err(), RoomError::RoomFull);
        assert_eq!(room.len(), 4);
    }

    #[test]
    fn test_rebind_swaps_connection_handle() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        let previous = room.rebind("Bo", ConnectionId(20)).unwrap();
        assert_eq!(previous, BO);
        assert!(room.contains(ConnectionId(20)));
        assert!(!room.contains(BO));
        assert_eq!(room.find_by_name("Bo").map(|p| p.id), Some(ConnectionId(20)));
        assert!(room.rebind("Nobody", ConnectionId(21)).is_none());
    }

    #[test]
    fn test_snapshot_fails_while_psychic_seat_is_vacant() {
        let mut rng = rng();
        let (mut room, _) = started_room(&mut rng);

        // Empty the roster so the psychic index has nothing to point at.
        let ids: Vec<_> = room.players().iter().map(|p| p.id).collect();
        for id in ids {
            room.remove(id);
        }
        assert!(matches!(
            room.snapshot().unwrap_err(),
            RoomError::PsychicSeat(_)
        ));
    }
}
