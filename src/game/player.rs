//! Player state machine: flight, energy, breath and burning

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

use crate::ws::protocol::PlayerSnapshot;

use super::combat::{BreathHit, CombatSystem};
use super::controls::ControlState;
use super::position::PositionState;
use super::trail::TrailBuffer;
use super::tuning::Tuning;

/// Lifecycle of a dragon. There is no way back from `Dying`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum LifecyclePhase {
    Alive,
    /// `ticks` counts dying ticks, starting at 1
    Dying { ticks: u32 },
}

/// Construction options. Anything left out takes its default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerOpts {
    pub id: Uuid,
    #[serde(default)]
    pub controls: Option<ControlState>,
    #[serde(default)]
    pub position: Option<PositionState>,
    #[serde(default)]
    pub speed: Option<f64>,
    /// Defaults to the tuning's maximum
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub damage: Option<f64>,
    /// 0 for alive, otherwise the dying tick count
    #[serde(default)]
    pub dead: Option<u32>,
    #[serde(default)]
    pub flash: Option<u32>,
}

impl PlayerOpts {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: PositionState) -> Self {
        self.position = Some(position);
        self
    }
}

pub const DEFAULT_NAME: &str = "unknown";

/// Authoritative dragon state
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub controls: ControlState,
    pub position: PositionState,
    pub speed: f64,
    pub energy: f64,
    pub damage: f64,
    pub phase: LifecyclePhase,
    /// Direction of this tick's breath, if any. Cleared every tick.
    pub breathing_angle: Option<f64>,
    pub trail: TrailBuffer,
    /// Render-only highlight counter
    pub flash: u32,
}

impl Player {
    pub fn new(opts: PlayerOpts, tuning: &Tuning) -> Self {
        let phase = match opts.dead.unwrap_or(0) {
            0 => LifecyclePhase::Alive,
            ticks => LifecyclePhase::Dying { ticks },
        };

        let mut position = opts.position.unwrap_or_default();
        position.normalize_angle();
        position.clamp_to(tuning.universe_width, tuning.universe_height);

        Self {
            id: opts.id,
            name: opts.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            controls: opts.controls.unwrap_or_default(),
            position,
            speed: opts
                .speed
                .unwrap_or(0.0)
                .clamp(tuning.min_speed, tuning.max_speed),
            energy: opts
                .energy
                .unwrap_or(tuning.max_energy)
                .clamp(0.0, tuning.max_energy),
            damage: opts.damage.unwrap_or(0.0).max(0.0),
            phase,
            breathing_angle: None,
            trail: TrailBuffer::new(tuning.max_trail_length, tuning.trail_sample_distance),
            flash: opts.flash.unwrap_or(0),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.phase == LifecyclePhase::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.phase, LifecyclePhase::Dying { .. })
    }

    /// Dying long enough for the burn animation to finish
    pub fn is_burnt_out(&self, tuning: &Tuning) -> bool {
        match self.phase {
            LifecyclePhase::Dying { ticks } => ticks > tuning.death_animation_ticks,
            LifecyclePhase::Alive => false,
        }
    }

    /// Forward held with at least one unit of energy to spend.
    /// Always derived from the current controls.
    pub fn thrusting(&self) -> bool {
        self.controls.forward_held && self.energy >= 1.0
    }

    /// Opacity of the burn effect; falls as damage piles up
    pub fn burn_opacity(&self, tuning: &Tuning) -> f64 {
        1.0 - (1.0 + self.damage / tuning.deadly_damage).ln()
    }

    /// Advance one simulation step.
    ///
    /// Returns the controls as they stand after the tick. They differ from
    /// the input when running out of energy released the forward control.
    pub fn tick(&mut self, tuning: &Tuning) -> ControlState {
        self.breathing_angle = None;

        match self.phase {
            LifecyclePhase::Alive => self.tick_alive(tuning),
            LifecyclePhase::Dying { ticks } => self.tick_dying(ticks, tuning),
        }

        self.controls
    }

    fn tick_alive(&mut self, tuning: &Tuning) {
        if self.controls.attack_held {
            self.ignite();
            return;
        }

        let thrusting = self.thrusting();

        // Forward always pushes; only the energy drain and turn bonus need thrust
        if self.controls.forward_held && self.speed < tuning.max_speed {
            self.speed = (self.speed + tuning.accel_rate).min(tuning.max_speed);
        }

        if self.controls.brake_held && self.speed > tuning.min_speed {
            self.speed -= tuning.braking_rate;
            if self.speed < tuning.min_speed {
                self.speed = 0.0;
            }
        } else if self.speed > tuning.coast_speed {
            self.speed -= tuning.decel_rate;
        }

        let multiplier = self.controls.turn_direction() * if thrusting { 4.0 } else { 1.0 };
        self.position.angle += tuning.turn_rate * self.speed * multiplier;
        self.position.normalize_angle();

        self.integrate(tuning);
        self.trail.record(&self.position);
        self.update_energy(thrusting, tuning);
    }

    fn tick_dying(&mut self, ticks: u32, tuning: &Tuning) {
        self.damage += ticks as f64;
        self.phase = LifecyclePhase::Dying {
            ticks: ticks.saturating_add(1),
        };
        self.speed /= tuning.dying_speed_decay;

        // The body keeps drifting along its last heading
        self.integrate(tuning);
    }

    /// Commit: the dragon breathes its last straight ahead and starts burning
    fn ignite(&mut self) {
        self.phase = LifecyclePhase::Dying { ticks: 1 };
        self.breathing_angle = Some(PI);
    }

    /// Positive speed moves against `(sin a, cos a)`
    fn integrate(&mut self, tuning: &Tuning) {
        let vel_x = self.speed * self.position.angle.sin();
        let vel_y = self.speed * self.position.angle.cos();

        self.position.x -= vel_x;
        self.position.y -= vel_y;
        self.position
            .clamp_to(tuning.universe_width, tuning.universe_height);
    }

    fn update_energy(&mut self, thrusting: bool, tuning: &Tuning) {
        if thrusting {
            self.energy -= 1.0;
            if self.energy <= 0.0 {
                self.energy = 0.0;
                self.controls.forward_held = false;
            }
        } else {
            self.energy = (self.energy + tuning.energy_regen_rate).min(tuning.max_energy);
        }
    }

    /// Breathe on `target` if it sits inside this player's cone.
    ///
    /// Records the bearing on the attacker and adds damage to the target.
    pub fn try_breathe(&mut self, target: &mut Player, tuning: &Tuning) -> Option<BreathHit> {
        let hit = CombatSystem::check_breath(self, target, tuning)?;
        self.breathing_angle = Some(hit.bearing);
        target.damage += hit.damage;
        Some(hit)
    }

    /// Serialization view for sync and rendering
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            controls: self.controls,
            position: self.position,
            speed: self.speed,
            energy: self.energy,
            id: self.id,
            name: self.name.clone(),
            damage: self.damage,
        }
    }

    /// Overwrite synced fields from a snapshot. Trail and phase stay local.
    ///
    /// Incoming values are brought back into range the same way `new` does.
    pub fn apply_snapshot(&mut self, snapshot: &PlayerSnapshot, tuning: &Tuning) {
        let mut position = snapshot.position;
        position.normalize_angle();
        position.clamp_to(tuning.universe_width, tuning.universe_height);

        self.controls = snapshot.controls;
        self.position = position;
        self.speed = snapshot.speed.clamp(tuning.min_speed, tuning.max_speed);
        self.energy = snapshot.energy.clamp(0.0, tuning.max_energy);
        self.name = snapshot.name.clone();
        self.damage = snapshot.damage.max(0.0);
    }
}
