//! Snapshot building for periodic full-state sync

use crate::ws::protocol::{GameEvent, PlayerSnapshot, ServerMsg};

use super::player::Player;

/// Decides when to sync and builds the sync message
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for joins and deaths)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot message
    pub fn build(&self, tick: u64, players: &[Player], events: Vec<GameEvent>) -> ServerMsg {
        let players: Vec<PlayerSnapshot> = players.iter().map(Player::snapshot).collect();

        ServerMsg::Snapshot {
            tick,
            players,
            events,
        }
    }
}
