//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::controls::ControlState;
use crate::game::position::PositionState;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Enter the arena
    Join {
        /// Display name, falls back to the connection's name
        #[serde(default)]
        name: Option<String>,
    },

    /// Currently held inputs, sent whenever they change
    Controls { controls: ControlState },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave the arena
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome { player_id: Uuid, server_time: u64 },

    /// Confirmation of arena join
    Joined {
        arena_id: Uuid,
        /// Seed used for spawn placement
        seed: u64,
        /// All players in the arena at join time
        players: Vec<PlayerInfo>,
    },

    /// Player joined the arena
    PlayerJoined { player: PlayerInfo },

    /// Player left the arena
    PlayerLeft { player_id: Uuid, reason: String },

    /// Full state sync
    Snapshot {
        /// Server tick number
        tick: u64,
        players: Vec<PlayerSnapshot>,
        /// Events that occurred since last snapshot
        events: Vec<GameEvent>,
    },

    /// The simulation changed a player's controls (thrust ran out of energy).
    /// The owning client should adopt these.
    ControlsOverride {
        player_id: Uuid,
        controls: ControlState,
    },

    /// Error message; `player_id` set when only one session should see it
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<Uuid>,
        code: String,
        message: String,
    },

    /// Pong response
    Pong {
        player_id: Uuid,
        /// Echo back client timestamp
        t: u64,
    },
}

impl ServerMsg {
    /// The one session this message is meant for, if it is not for everyone
    pub fn recipient(&self) -> Option<Uuid> {
        match self {
            ServerMsg::Welcome { player_id, .. }
            | ServerMsg::ControlsOverride { player_id, .. }
            | ServerMsg::Pong { player_id, .. } => Some(*player_id),
            ServerMsg::Error { player_id, .. } => *player_id,
            _ => None,
        }
    }
}

/// Player info for join notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: Uuid,
    pub name: String,
}

/// Serialized view of a player; enough to rebuild it on the other side.
/// Trail and lifecycle phase are local state and not carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub controls: ControlState,
    pub position: PositionState,
    pub speed: f64,
    pub energy: f64,
    pub id: Uuid,
    pub name: String,
    pub damage: f64,
}

/// Game events (breath, ignition, burn-out)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Breath landed on a target
    Breath {
        attacker_id: Uuid,
        target_id: Uuid,
        damage: f64,
        bearing: f64,
    },

    /// Player committed and started burning
    Ignited { player_id: Uuid },

    /// Burn animation finished; player removed
    Burned { player_id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_msg_wire_format() {
        let msg: ClientMsg = serde_json::from_str(
            r#"{"type":"controls","controls":{"forward_held":true,"turn_left_held":true}}"#,
        )
        .unwrap();

        match msg {
            ClientMsg::Controls { controls } => {
                assert!(controls.forward_held);
                assert!(controls.turn_left_held);
                assert!(!controls.attack_held);
            }
            other => panic!("unexpected message: {:?}", other),
        }

        let join: ClientMsg = serde_json::from_str(r#"{"type":"join"}"#).unwrap();
        assert!(matches!(join, ClientMsg::Join { name: None }));
    }

    #[test]
    fn test_event_tagging() {
        let id = Uuid::nil();
        let json = serde_json::to_value(GameEvent::Ignited { player_id: id }).unwrap();
        assert_eq!(json["event_type"], "ignited");
        assert_eq!(json["player_id"], id.to_string());
    }

    #[test]
    fn test_snapshot_fields() {
        let snapshot = PlayerSnapshot {
            controls: ControlState::default(),
            position: PositionState::new(1.0, 2.0, 0.5),
            speed: 3.0,
            energy: 150.0,
            id: Uuid::nil(),
            name: "Fafnir".to_string(),
            damage: 4.0,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in ["controls", "position", "speed", "energy", "id", "name", "damage"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(!keys.contains(&"trail"));
        assert!(!keys.contains(&"phase"));
        assert_eq!(json["position"]["angle"], 0.5);
    }

    #[test]
    fn test_addressed_messages() {
        let id = Uuid::new_v4();

        let pong = ServerMsg::Pong { player_id: id, t: 5 };
        assert_eq!(pong.recipient(), Some(id));

        let broadcast_error = ServerMsg::Error {
            player_id: None,
            code: "x".to_string(),
            message: "y".to_string(),
        };
        assert_eq!(broadcast_error.recipient(), None);
        let json = serde_json::to_value(&broadcast_error).unwrap();
        assert!(json.get("player_id").is_none());

        let left = ServerMsg::PlayerLeft {
            player_id: id,
            reason: "disconnected".to_string(),
        };
        assert_eq!(left.recipient(), None);
    }
}
