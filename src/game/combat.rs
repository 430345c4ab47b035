//! Combat system - breath cone targeting and damage

use std::f64::consts::{PI, TAU};
use tracing::debug;
use uuid::Uuid;

use super::player::Player;
use super::tuning::{ConeAngleMode, Tuning};
use super::vector::{distance_squared, subtract};

/// A breath that landed this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathHit {
    pub attacker_id: Uuid,
    pub target_id: Uuid,
    pub damage: f64,
    /// Bearing from attacker to target, in the facing convention
    pub bearing: f64,
}

/// Combat system for breath attacks
pub struct CombatSystem;

impl CombatSystem {
    /// Bearing from `from` to `to` in the same convention as `PositionState::angle`.
    /// `None` when the two points coincide.
    pub fn bearing(from: &Player, to: &Player) -> Option<f64> {
        let delta = subtract(to.position.point(), from.position.point());
        if delta.is_zero() {
            return None;
        }
        Some(PI + delta.x.atan2(delta.y))
    }

    /// Angular gap between a bearing and a facing
    pub fn angle_difference(bearing: f64, facing: f64, mode: ConeAngleMode) -> f64 {
        let raw = (bearing - facing).abs();
        match mode {
            ConeAngleMode::Raw => raw,
            ConeAngleMode::Wrapped => {
                let raw = raw.rem_euclid(TAU);
                raw.min(TAU - raw)
            }
        }
    }

    /// Damage dealt by a breath; reversing dragons deal none
    pub fn breath_damage(attacker_speed: f64) -> f64 {
        attacker_speed.max(0.0)
    }

    /// Decide whether `attacker` breathes on `target` this tick.
    ///
    /// Pure: reads both players, mutates neither.
    pub fn check_breath(attacker: &Player, target: &Player, tuning: &Tuning) -> Option<BreathHit> {
        if attacker.id == target.id || !attacker.is_alive() {
            return None;
        }

        let dist_sq = distance_squared(attacker.position.point(), target.position.point());
        if dist_sq >= tuning.fire_distance_squared {
            return None;
        }

        let bearing = Self::bearing(attacker, target)?;
        let diff = Self::angle_difference(bearing, attacker.position.angle, tuning.cone_angle_mode);
        if diff >= tuning.breath_half_cone {
            return None;
        }

        Some(BreathHit {
            attacker_id: attacker.id,
            target_id: target.id,
            damage: Self::breath_damage(attacker.speed),
            bearing,
        })
    }

    /// Run breath resolution over every ordered pair of players.
    ///
    /// All hits are decided against the post-movement state before any damage
    /// is applied, so the order of `players` does not change the outcome.
    pub fn resolve_breaths(players: &mut [Player], tuning: &Tuning) -> Vec<BreathHit> {
        let mut hits: Vec<(usize, usize, BreathHit)> = Vec::new();

        for (a, attacker) in players.iter().enumerate() {
            for (t, target) in players.iter().enumerate() {
                if a == t {
                    continue;
                }
                if let Some(hit) = Self::check_breath(attacker, target, tuning) {
                    hits.push((a, t, hit));
                }
            }
        }

        for (a, t, hit) in &hits {
            players[*a].breathing_angle = Some(hit.bearing);
            players[*t].damage += hit.damage;

            debug!(
                attacker_id = %hit.attacker_id,
                target_id = %hit.target_id,
                damage = hit.damage,
                target_damage = players[*t].damage,
                "breath hit"
            );
        }

        hits.into_iter().map(|(_, _, hit)| hit).collect()
    }
}
