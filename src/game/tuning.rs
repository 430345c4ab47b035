//! Gameplay tuning constants
//!
//! Kept separate from runtime/server configuration (tick rates, addresses).

/// How the breath cone compares the bearing to the attacker's facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConeAngleMode {
    /// Shortest angular distance, `min(|Δ|, 2π - |Δ|)`
    #[default]
    Wrapped,
    /// Plain `|bearing - angle|`; misses targets across the 0/2π seam
    Raw,
}

/// Dragon flight, energy and breath constants
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    /// Arena width in world units
    pub universe_width: f64,
    /// Arena height in world units
    pub universe_height: f64,

    pub max_energy: f64,
    /// Energy regained per tick while not thrusting
    pub energy_regen_rate: f64,

    pub max_speed: f64,
    pub min_speed: f64,
    /// Speed gained per thrusting tick
    pub accel_rate: f64,
    /// Speed shed per tick while braking
    pub braking_rate: f64,
    /// Above this speed, passive drag applies
    pub coast_speed: f64,
    /// Passive drag per tick
    pub decel_rate: f64,
    /// Radians turned per tick per unit of speed
    pub turn_rate: f64,

    pub max_trail_length: usize,
    /// Minimum distance between retained trail points
    pub trail_sample_distance: f64,

    /// Breath range, squared
    pub fire_distance_squared: f64,
    /// Half-width of the breath cone in radians
    pub breath_half_cone: f64,
    pub cone_angle_mode: ConeAngleMode,

    /// Damage scale for the burn effect
    pub deadly_damage: f64,
    /// Dying ticks before the body burns out
    pub death_animation_ticks: u32,
    /// Speed divisor applied every dying tick
    pub dying_speed_decay: f64,

    /// Ticks between full-state syncs
    pub sync_interval_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            universe_width: 800.0,
            universe_height: 600.0,
            max_energy: 200.0,
            energy_regen_rate: 0.25,
            max_speed: 8.0,
            min_speed: -1.0,
            accel_rate: 0.5,
            braking_rate: 0.4,
            coast_speed: 0.5,
            decel_rate: 0.02,
            turn_rate: 0.005,
            max_trail_length: 10,
            trail_sample_distance: 4.0,
            fire_distance_squared: 1600.0,
            breath_half_cone: 0.8,
            cone_angle_mode: ConeAngleMode::Wrapped,
            deadly_damage: 100.0,
            death_animation_ticks: 50,
            dying_speed_decay: 1.05,
            sync_interval_ticks: 25,
        }
    }
}
