//! Decoded control input for a single player

use serde::{Deserialize, Serialize};

/// Which inputs are currently held.
///
/// `attack_held` doubles as the commit trigger: held during the player's own
/// tick it sets the dragon alight, while other players' breath passes never
/// read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlState {
    #[serde(default)]
    pub forward_held: bool,
    #[serde(default)]
    pub brake_held: bool,
    #[serde(default)]
    pub turn_left_held: bool,
    #[serde(default)]
    pub turn_right_held: bool,
    #[serde(default)]
    pub attack_held: bool,
}

impl ControlState {
    /// Turn direction: +1 left, -1 right, 0 when neither or both are held
    pub fn turn_direction(&self) -> f64 {
        match (self.turn_left_held, self.turn_right_held) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_direction_is_exclusive() {
        let mut c = ControlState::default();
        assert_eq!(c.turn_direction(), 0.0);

        c.turn_left_held = true;
        assert_eq!(c.turn_direction(), 1.0);

        c.turn_right_held = true;
        assert_eq!(c.turn_direction(), 0.0);

        c.turn_left_held = false;
        assert_eq!(c.turn_direction(), -1.0);
    }

    #[test]
    fn test_missing_fields_default_to_released() {
        let c: ControlState = serde_json::from_str(r#"{"forward_held":true}"#).unwrap();
        assert!(c.forward_held);
        assert!(!c.attack_held);
        assert!(!c.brake_held);
    }
}
