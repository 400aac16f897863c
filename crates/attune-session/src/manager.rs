use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

use attune_protocol::{
    ConnectionId, Phase, RoomCode, ServerEvent, Team,
};
use attune_room::{Player, Room, RoomError};
use attune_rules::settings::TARGET_ANGLE_MAX;
use attune_rules::random_room_code;
use attune_timer::ScheduledTask;

use crate::config::SessionConfig;
use crate::error::SessionError;

/// A roster entry kept on ice between a disconnect and either a
/// reconnect or the room's deletion.
#[derive(Debug)]
struct DisconnectedPlayer {
    room: RoomCode,
    seat: usize,
    player: Player,
    since: Instant,
}

/// A pending timer and the generation it was armed under.
///
/// Every armed timer gets a fresh generation number. When the timer
/// fires it hands the generation back; a mismatch against the entry in
/// the table means the timer was superseded and the fire is ignored.
#[derive(Debug)]
struct TimerEntry {
    generation: u64,
    task: ScheduledTask,
}

/// Owns every room and routes client events to them.
///
/// The manager is synchronous and single-owner. [`SessionHandle`]
/// wraps it in a mutex and layers the actual timers on top; the
/// manager itself only mints timer generations and validates them when
/// a timer reports back, so every decision runs under one lock.
///
/// Outbound events go through per-connection channels registered by
/// [`connect`]. A send to a closed channel is ignored; that
/// connection is already being torn down.
///
/// [`SessionHandle`]: crate::SessionHandle
/// [`connect`]: SessionManager::connect
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    rng: StdRng,
    rooms: HashMap<RoomCode, Room>,
    /// Which room each live connection sits in.
    memberships: HashMap<ConnectionId, RoomCode>,
    /// Players inside the reconnect grace window, keyed by the
    /// connection they left on.
    disconnected: HashMap<ConnectionId, DisconnectedPlayer>,
    /// Pending game-start countdowns, at most one per room.
    countdowns: HashMap<RoomCode, TimerEntry>,
    /// Pending empty-room deletions, at most one per room.
    deletions: HashMap<RoomCode, TimerEntry>,
    senders: HashMap<ConnectionId, UnboundedSender<ServerEvent>>,
    generations: u64,
}

/// How [`SessionManager::admit`] seated a connection.
enum Admission {
    /// An existing roster entry was pointed at the new connection.
    Rebound,
    /// A player inside the grace window got their seat back.
    Restored,
    /// A brand-new player took a free seat.
    Joined,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Builds a manager over a caller-supplied RNG so tests can pin
    /// the room codes and round draws.
    pub fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            disconnected: HashMap::new(),
            countdowns: HashMap::new(),
            deletions: HashMap::new(),
            senders: HashMap::new(),
            generations: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // -- connection lifecycle ------------------------------------------------

    /// Registers the outbound channel for a new connection.
    pub fn connect(
        &mut self,
        id: ConnectionId,
        sender: UnboundedSender<ServerEvent>,
    ) {
        debug!(connection = %id, "connection registered");
        self.senders.insert(id, sender);
    }

    /// Handles a dropped connection: the player is unseated, parked in
    /// the disconnect table and the remaining roster is notified.
    ///
    /// Returns the room code and a freshly minted deletion generation
    /// when the roster just became empty, which is the caller's cue to
    /// arm the grace-period deletion via [`install_deletion`].
    ///
    /// [`install_deletion`]: SessionManager::install_deletion
    pub fn disconnect(
        &mut self,
        id: ConnectionId,
    ) -> Option<(RoomCode, u64)> {
        self.senders.remove(&id);
        let code = self.memberships.remove(&id)?;
        let room = self.rooms.get_mut(&code)?;
        let (seat, player) = room.remove(id)?;
        let players = room.player_views();
        let empty = room.is_empty();

        info!(room = %code, connection = %id, name = %player.name, "player disconnected");
        self.disconnected.insert(
            id,
            DisconnectedPlayer {
                room: code.clone(),
                seat,
                player,
                since: Instant::now(),
            },
        );
        self.broadcast(&code, ServerEvent::PlayerLeft { players });

        if empty {
            let generation = self.next_generation();
            debug!(room = %code, generation, "roster empty, deletion pending");
            Some((code, generation))
        } else {
            None
        }
    }

    // -- lobby ---------------------------------------------------------------

    /// Creates a room with the caller as its first player.
    pub fn create_room(&mut self, id: ConnectionId, name: &str) {
        if self.memberships.contains_key(&id) {
            self.send_to(id, join_error(&SessionError::AlreadyInRoom));
            return;
        }
        let Some(code) = self.unique_code() else {
            error!(
                attempts = self.config.max_code_attempts,
                "room code allocation failed"
            );
            self.send_to(id, join_error(&SessionError::CodesExhausted));
            return;
        };

        let room = Room::new(code.clone(), id, name);
        let players = room.player_views();
        self.rooms.insert(code.clone(), room);
        self.memberships.insert(id, code.clone());
        info!(room = %code, name, "room created");
        self.send_to(
            id,
            ServerEvent::RoomCreated {
                room_code: code,
                name: name.to_string(),
                players,
            },
        );
    }

    /// Seats a connection in a room, covering fresh joins as well as
    /// both reconnect shapes, and tells everyone about the roster.
    pub fn join_room(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
        name: &str,
    ) {
        match self.admit(id, code, name) {
            Ok(_) => {
                self.send_to(
                    id,
                    ServerEvent::RoomJoined {
                        room_code: code.clone(),
                        name: name.to_string(),
                    },
                );
                let Some(room) = self.rooms.get(code) else { return };
                let players = room.player_views();
                let player_count = room.len();
                self.broadcast(
                    code,
                    ServerEvent::PlayerJoined { players, player_count },
                );
            }
            Err(err) => {
                debug!(room = %code, name, %err, "join refused");
                self.send_to(id, join_error(&err));
            }
        }
    }

    /// Moves the caller onto a team, or reports why it could not.
    pub fn change_team(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
        team: Team,
    ) {
        let Some(room) = self.rooms.get_mut(code) else {
            self.send_to(id, join_error(&SessionError::RoomNotFound(code.clone())));
            return;
        };
        match room.change_team(id, team, &mut self.rng) {
            Ok(()) => {
                let players = room.player_views();
                self.broadcast(code, ServerEvent::TeamChanged { players });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "team change refused");
                self.send_to(id, join_error(&SessionError::Room(err)));
            }
        }
    }

    /// Takes the caller off their team. A refused request is dropped
    /// without a reply; the client keeps its current spectator view.
    pub fn leave_team(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "leave_team for unknown room");
            return;
        };
        match room.leave_team(id) {
            Ok(()) => {
                let players = room.player_views();
                self.broadcast(code, ServerEvent::TeamChanged { players });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "leave_team dropped");
            }
        }
    }

    /// Marks the caller ready and broadcasts the roster.
    ///
    /// Returns a countdown generation when this ready-up made the
    /// whole lobby ready. The caller arms the start timer and hands it
    /// back via [`install_countdown`]; the game itself starts only
    /// when [`countdown_elapsed`] re-validates the lobby.
    ///
    /// [`install_countdown`]: SessionManager::install_countdown
    /// [`countdown_elapsed`]: SessionManager::countdown_elapsed
    pub fn set_ready(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
    ) -> Option<u64> {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "set_ready for unknown room");
            return None;
        };
        match room.set_ready(id) {
            Ok(eligible) => {
                let players = room.player_views();
                self.broadcast(code, ServerEvent::PlayerReadyUpdate { players });
                if eligible {
                    let generation = self.next_generation();
                    info!(room = %code, generation, "lobby ready, start countdown pending");
                    Some(generation)
                } else {
                    None
                }
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "set_ready dropped");
                None
            }
        }
    }

    /// Clears the caller's ready flag and cancels any pending start
    /// countdown. The start countdown is the one timer canceled
    /// eagerly; every other stale timer is caught by fire-time
    /// re-validation.
    pub fn set_unready(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "set_unready for unknown room");
            return;
        };
        match room.set_unready(id) {
            Ok(()) => {
                let players = room.player_views();
                if let Some(entry) = self.countdowns.remove(code) {
                    entry.task.cancel();
                    info!(room = %code, "start countdown canceled");
                }
                self.broadcast(code, ServerEvent::PlayerUnreadyUpdate { players });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "set_unready dropped");
            }
        }
    }

    // -- start countdown -----------------------------------------------------

    /// Records an armed start countdown. A superseded entry is
    /// canceled so at most one countdown per room is live.
    pub fn install_countdown(
        &mut self,
        code: &RoomCode,
        generation: u64,
        task: ScheduledTask,
    ) {
        let entry = TimerEntry { generation, task };
        if let Some(old) = self.countdowns.insert(code.clone(), entry) {
            old.task.cancel();
        }
    }

    /// Called when a start countdown fires. The lobby is re-validated
    /// from scratch: the generation must still be current and every
    /// seat must still be ready. Anything that changed since arming
    /// turns the fire into a no-op.
    pub fn countdown_elapsed(&mut self, code: &RoomCode, generation: u64) {
        let current = self
            .countdowns
            .get(code)
            .is_some_and(|entry| entry.generation == generation);
        if !current {
            debug!(room = %code, generation, "stale start countdown ignored");
            return;
        }
        self.countdowns.remove(code);

        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "countdown fired for deleted room");
            return;
        };
        if !room.is_lobby() || !room.all_ready() {
            debug!(room = %code, "lobby changed during countdown, start skipped");
            return;
        }
        match room.start_game(&mut self.rng) {
            Ok(snapshot) => {
                info!(room = %code, psychic = %snapshot.psychic_name, "game started");
                self.broadcast(code, ServerEvent::GameStart(snapshot));
            }
            Err(err) => {
                error!(room = %code, %err, "game start failed");
            }
        }
    }

    // -- in-game -------------------------------------------------------------

    /// Applies a dial movement and echoes it to everyone except the
    /// mover, whose own dial is already there.
    pub fn update_dial(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
        angle: f64,
    ) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "update_dial for unknown room");
            return;
        };
        if !room.contains(id) {
            debug!(room = %code, connection = %id, "update_dial from non-member");
            return;
        }
        let angle = angle.clamp(0.0, TARGET_ANGLE_MAX);
        match room.update_dial(angle) {
            Ok(angle) => {
                self.broadcast_except(code, id, ServerEvent::DialUpdated { angle });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "update_dial dropped");
            }
        }
    }

    /// Locks the dial and scores the round.
    ///
    /// A vacant psychic seat is a roster integrity failure, not a bad
    /// request: the operation aborts without touching the scores and
    /// without telling the clients, and the room keeps its last good
    /// state for the psychic's reconnect.
    pub fn lock_guess(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "lock_guess for unknown room");
            return;
        };
        if !room.contains(id) {
            debug!(room = %code, connection = %id, "lock_guess from non-member");
            return;
        }
        match room.lock_guess() {
            Ok(result) => {
                info!(room = %code, points = result.points, "guess locked");
                self.broadcast(code, ServerEvent::GuessLocked(result));
            }
            Err(err @ RoomError::PsychicSeat(_)) => {
                error!(room = %code, %err, "lock_guess aborted");
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "lock_guess dropped");
            }
        }
    }

    /// Reveals the board to the psychic.
    pub fn uncover_board(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "uncover_board for unknown room");
            return;
        };
        if !room.contains(id) {
            debug!(room = %code, connection = %id, "uncover_board from non-member");
            return;
        }
        match room.uncover() {
            Ok(phase) => {
                self.broadcast(code, ServerEvent::BoardUncovered { phase });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "uncover_board dropped");
            }
        }
    }

    /// Covers the board again and opens guessing.
    pub fn cover_and_begin(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "cover_and_begin for unknown room");
            return;
        };
        if !room.contains(id) {
            debug!(room = %code, connection = %id, "cover_and_begin from non-member");
            return;
        }
        match room.begin_guessing() {
            Ok(phase) => {
                self.broadcast(code, ServerEvent::CoverBegin { phase });
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "cover_and_begin dropped");
            }
        }
    }

    /// Flags the caller ready for the next round and advances it once
    /// the whole roster agrees.
    pub fn ready_for_next(&mut self, id: ConnectionId, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else {
            debug!(room = %code, "ready_for_next for unknown room");
            return;
        };
        match room.set_ready_for_next(id) {
            Ok(all_ready) => {
                let players = room.player_views();
                self.broadcast(code, ServerEvent::PlayerReadyForNext { players });
                if all_ready {
                    self.advance_round(code);
                }
            }
            Err(err) => {
                debug!(room = %code, connection = %id, %err, "ready_for_next dropped");
            }
        }
    }

    /// Rotation failure leaves the room untouched and unannounced; the
    /// roster is missing a seat the rotation needs, and a reconnect
    /// can still repair it.
    fn advance_round(&mut self, code: &RoomCode) {
        let Some(room) = self.rooms.get_mut(code) else { return };
        match room.next_round(&mut self.rng) {
            Ok(snapshot) => {
                info!(room = %code, round = snapshot.round, psychic = %snapshot.psychic_name, "round started");
                self.broadcast(code, ServerEvent::RoundStart(snapshot));
            }
            Err(err) => {
                error!(room = %code, %err, "round advance aborted");
            }
        }
    }

    /// Reseats a reconnecting client into a running game and replays
    /// the current round to it.
    ///
    /// A room sitting in the revealed phase is nudged back to guessing
    /// before the snapshot is taken; a restored view never shows the
    /// uncovered board. The roster travels inside the snapshot, and
    /// this path sends no separate roster broadcast.
    pub fn request_game_state(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
        name: &str,
    ) {
        let active = self.rooms.get(code).map(|room| !room.is_lobby());
        if active != Some(true) {
            debug!(room = %code, name, "state requested without an active game");
            self.send_to(id, join_error(&SessionError::GameNotFound(code.clone())));
            return;
        }

        if let Err(err) = self.admit(id, code, name) {
            debug!(room = %code, name, %err, "state restore refused");
            self.send_to(id, join_error(&err));
            return;
        }

        if let Some(room) = self.rooms.get_mut(code) {
            if room.phase() == Some(Phase::Revealed) {
                if let Ok(phase) = room.begin_guessing() {
                    self.broadcast(code, ServerEvent::CoverBegin { phase });
                }
            }
        }

        match self.rooms.get(code).map(Room::snapshot) {
            Some(Ok(snapshot)) => {
                info!(room = %code, name, "game state restored");
                self.send_to(id, ServerEvent::GameStateRestored(snapshot));
            }
            Some(Err(err)) => {
                error!(room = %code, %err, "state snapshot failed");
                self.send_to(id, join_error(&SessionError::Room(err)));
            }
            None => {}
        }
    }

    // -- empty-room deletion -------------------------------------------------

    /// Records an armed grace-period deletion, canceling any entry it
    /// supersedes.
    pub fn install_deletion(
        &mut self,
        code: &RoomCode,
        generation: u64,
        task: ScheduledTask,
    ) {
        let entry = TimerEntry { generation, task };
        if let Some(old) = self.deletions.insert(code.clone(), entry) {
            old.task.cancel();
        }
    }

    /// Called when a grace-period deletion fires. The room is deleted
    /// only if the generation is still current and the roster is still
    /// empty; a room that was reoccupied in the meantime survives.
    pub fn deletion_elapsed(&mut self, code: &RoomCode, generation: u64) {
        let current = self
            .deletions
            .get(code)
            .is_some_and(|entry| entry.generation == generation);
        if !current {
            debug!(room = %code, generation, "stale deletion ignored");
            return;
        }
        self.deletions.remove(code);

        let occupied =
            self.rooms.get(code).is_some_and(|room| !room.is_empty());
        if occupied {
            debug!(room = %code, "room reoccupied during grace period, kept");
            return;
        }
        if self.rooms.remove(code).is_some() {
            if let Some(entry) = self.countdowns.remove(code) {
                entry.task.cancel();
            }
            let before = self.disconnected.len();
            self.disconnected.retain(|_, entry| entry.room != *code);
            info!(
                room = %code,
                dropped_reconnects = before - self.disconnected.len(),
                "empty room deleted"
            );
        }
    }

    // -- internals -----------------------------------------------------------

    /// Seats a connection in `code` under `name`, trying the three
    /// admission shapes in order: rebinding a live roster entry with
    /// that name, restoring a player from the disconnect table, and
    /// finally a fresh join.
    fn admit(
        &mut self,
        id: ConnectionId,
        code: &RoomCode,
        name: &str,
    ) -> Result<Admission, SessionError> {
        if let Some(current) = self.memberships.get(&id) {
            if current != code {
                return Err(SessionError::AlreadyInRoom);
            }
        }
        let Some(room) = self.rooms.get_mut(code) else {
            return Err(SessionError::RoomNotFound(code.clone()));
        };

        if let Some(previous) = room.rebind(name, id) {
            self.memberships.remove(&previous);
            self.memberships.insert(id, code.clone());
            if previous != id {
                self.senders.remove(&previous);
            }
            debug!(room = %code, name, "roster entry rebound to new connection");
            return Ok(Admission::Rebound);
        }

        let stored = self
            .disconnected
            .iter()
            .find(|(_, entry)| entry.room == *code && entry.player.name == name)
            .map(|(id, _)| *id);
        if let Some(key) = stored {
            if let Some(entry) = self.disconnected.remove(&key) {
                let mut player = entry.player;
                player.id = id;
                room.restore(player, entry.seat)?;
                self.memberships.insert(id, code.clone());
                info!(
                    room = %code,
                    name,
                    away_ms = entry.since.elapsed().as_millis() as u64,
                    "player reconnected"
                );
                return Ok(Admission::Restored);
            }
        }

        room.join(id, name)?;
        self.memberships.insert(id, code.clone());
        info!(room = %code, name, "player joined");
        Ok(Admission::Joined)
    }

    /// Draws room codes until one is free, bounded by the configured
    /// attempt limit.
    fn unique_code(&mut self) -> Option<RoomCode> {
        for _ in 0..self.config.max_code_attempts {
            let code = random_room_code(&mut self.rng);
            if !self.rooms.contains_key(&code) {
                return Some(code);
            }
        }
        None
    }

    fn next_generation(&mut self) -> u64 {
        self.generations += 1;
        self.generations
    }

    fn broadcast(&self, code: &RoomCode, event: ServerEvent) {
        let Some(room) = self.rooms.get(code) else { return };
        for player in room.players() {
            if let Some(sender) = self.senders.get(&player.id) {
                let _ = sender.send(event.clone());
            }
        }
    }

    fn broadcast_except(
        &self,
        code: &RoomCode,
        skip: ConnectionId,
        event: ServerEvent,
    ) {
        let Some(room) = self.rooms.get(code) else { return };
        for player in room.players() {
            if player.id == skip {
                continue;
            }
            if let Some(sender) = self.senders.get(&player.id) {
                let _ = sender.send(event.clone());
            }
        }
    }

    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&id) {
            let _ = sender.send(event);
        }
    }
}

fn join_error(err: &SessionError) -> ServerEvent {
    ServerEvent::JoinError { message: err.to_string() }
}
