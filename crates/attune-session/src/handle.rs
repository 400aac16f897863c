use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

use attune_protocol::{ClientEvent, ConnectionId, RoomCode, ServerEvent};
use attune_timer::ScheduledTask;

use crate::config::SessionConfig;
use crate::manager::SessionManager;

/// Cloneable async front door to the [`SessionManager`].
///
/// Connection tasks hold a clone each and feed decoded client events
/// in; the handle serializes everything through one mutex and arms the
/// deferred timers (start countdown, empty-room deletion) on the
/// manager's behalf. A timer callback re-enters through the same
/// mutex; a fire that lost its race against a cancel or a newer
/// generation finds stale state and backs off.
#[derive(Clone)]
pub struct SessionHandle {
    manager: Arc<Mutex<SessionManager>>,
}

impl SessionHandle {
    pub fn new(config: SessionConfig) -> Self {
        Self::from_manager(SessionManager::new(config))
    }

    /// Wraps an existing manager, letting tests inject a seeded RNG.
    pub fn from_manager(manager: SessionManager) -> Self {
        Self { manager: Arc::new(Mutex::new(manager)) }
    }

    /// Registers the outbound channel for a new connection.
    pub async fn connect(
        &self,
        id: ConnectionId,
        sender: UnboundedSender<ServerEvent>,
    ) {
        self.manager.lock().await.connect(id, sender);
    }

    /// Tears down a connection, arming the empty-room deletion when
    /// the disconnect left the room deserted.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut manager = self.manager.lock().await;
        if let Some((code, generation)) = manager.disconnect(id) {
            let delay = manager.config().reconnect_grace;
            let handle = self.clone();
            let room = code.clone();
            let task = ScheduledTask::spawn(delay, async move {
                handle.deletion_elapsed(room, generation).await;
            });
            manager.install_deletion(&code, generation, task);
        }
    }

    /// Routes one decoded client event to the manager.
    pub async fn handle_event(&self, id: ConnectionId, event: ClientEvent) {
        let mut manager = self.manager.lock().await;
        match event {
            ClientEvent::CreateRoom { name } => {
                manager.create_room(id, &name);
            }
            ClientEvent::JoinRoom { room_code, name } => {
                manager.join_room(id, &room_code, &name);
            }
            ClientEvent::ChangeTeam { room_code, team } => {
                manager.change_team(id, &room_code, team);
            }
            ClientEvent::LeaveTeam { room_code } => {
                manager.leave_team(id, &room_code);
            }
            ClientEvent::SetReady { room_code } => {
                if let Some(generation) = manager.set_ready(id, &room_code) {
                    let delay = manager.config().ready_countdown;
                    let handle = self.clone();
                    let room = room_code.clone();
                    let task = ScheduledTask::spawn(delay, async move {
                        handle.countdown_elapsed(room, generation).await;
                    });
                    manager.install_countdown(&room_code, generation, task);
                }
            }
            ClientEvent::SetUnready { room_code } => {
                manager.set_unready(id, &room_code);
            }
            ClientEvent::UpdateDial { room_code, angle } => {
                manager.update_dial(id, &room_code, angle);
            }
            ClientEvent::LockGuess { room_code } => {
                manager.lock_guess(id, &room_code);
            }
            ClientEvent::UncoverBoard { room_code } => {
                manager.uncover_board(id, &room_code);
            }
            ClientEvent::CoverAndBegin { room_code } => {
                manager.cover_and_begin(id, &room_code);
            }
            ClientEvent::ReadyForNext { room_code } => {
                manager.ready_for_next(id, &room_code);
            }
            ClientEvent::RequestGameState { room_code, name } => {
                manager.request_game_state(id, &room_code, &name);
            }
        }
    }

    async fn countdown_elapsed(&self, code: RoomCode, generation: u64) {
        self.manager.lock().await.countdown_elapsed(&code, generation);
    }

    async fn deletion_elapsed(&self, code: RoomCode, generation: u64) {
        self.manager.lock().await.deletion_elapsed(&code, generation);
    }
}
