//! Game simulation modules

pub mod arena;
pub mod combat;
pub mod controls;
pub mod player;
pub mod position;
pub mod snapshot;
pub mod trail;
pub mod tuning;
pub mod vector;

pub use arena::{ArenaHandle, ArenaRegistry, ArenaSlot, GameArena};
pub use player::{LifecyclePhase, Player, PlayerOpts};

use crate::ws::protocol::ClientMsg;
use uuid::Uuid;

/// Player input received from WebSocket
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: Uuid,
    pub msg: ClientMsg,
    pub received_at: u64,
}
