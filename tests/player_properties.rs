use dragon_arena::game::combat::CombatSystem;
use dragon_arena::game::controls::ControlState;
use dragon_arena::game::position::PositionState;
use dragon_arena::game::tuning::Tuning;
use dragon_arena::game::{Player, PlayerOpts};
use proptest::prelude::*;
use uuid::Uuid;

fn controls_strategy() -> impl Strategy<Value = ControlState> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(forward_held, brake_held, turn_left_held, turn_right_held)| ControlState {
            forward_held,
            brake_held,
            turn_left_held,
            turn_right_held,
            attack_held: false,
        },
    )
}

fn spawn(x: f64, y: f64, angle: f64, tuning: &Tuning) -> Player {
    Player::new(
        PlayerOpts::new(Uuid::new_v4()).with_position(PositionState::new(x, y, angle)),
        tuning,
    )
}

proptest! {
    #[test]
    fn alive_ranges_hold(
        start_speed in -1.0f64..=8.0,
        start_energy in 0.0f64..=200.0,
        inputs in prop::collection::vec(controls_strategy(), 1..300),
    ) {
        let tuning = Tuning::default();
        let mut p = spawn(400.0, 300.0, 1.0, &tuning);
        p.speed = start_speed;
        p.energy = start_energy;

        for controls in inputs {
            p.controls = controls;
            p.tick(&tuning);

            prop_assert!(p.is_alive());
            prop_assert!(p.energy >= 0.0 && p.energy <= tuning.max_energy);
            prop_assert!(p.speed >= tuning.min_speed && p.speed <= tuning.max_speed);
            prop_assert!(p.position.angle >= 0.0 && p.position.angle < std::f64::consts::TAU);
            prop_assert!(p.position.x >= 0.0 && p.position.x <= tuning.universe_width);
            prop_assert!(p.position.y >= 0.0 && p.position.y <= tuning.universe_height);
            prop_assert!(p.trail.len() <= tuning.max_trail_length);
        }
    }

    #[test]
    fn released_controls_never_speed_up(
        start_speed in -1.0f64..=8.0,
        ticks in 1usize..500,
    ) {
        let tuning = Tuning::default();
        let mut p = spawn(400.0, 300.0, 2.0, &tuning);
        p.speed = start_speed;

        for _ in 0..ticks {
            let before = p.speed;
            p.tick(&tuning);
            prop_assert!(p.speed <= before);
        }
    }

    #[test]
    fn dying_damage_strictly_increases(
        inputs in prop::collection::vec(controls_strategy(), 1..100),
    ) {
        let tuning = Tuning::default();
        let mut p = spawn(400.0, 300.0, 0.0, &tuning);
        p.controls.attack_held = true;
        p.tick(&tuning);
        prop_assert!(p.is_dying());

        let mut expected_n = 1.0;
        for controls in inputs {
            let before = p.damage;
            p.controls = controls;
            p.tick(&tuning);
            prop_assert!(p.is_dying());
            prop_assert_eq!(p.damage - before, expected_n);
            expected_n += 1.0;
        }
    }

    #[test]
    fn breath_check_is_pure(
        ax in 0.0f64..800.0, ay in 0.0f64..600.0, angle in 0.0f64..6.28,
        dx in -50.0f64..50.0, dy in -50.0f64..50.0,
        speed in -1.0f64..8.0,
    ) {
        let tuning = Tuning::default();
        let mut attacker = spawn(ax, ay, angle, &tuning);
        attacker.speed = speed;
        let mut target = spawn(0.0, 0.0, 0.0, &tuning);
        target.position.x = ax + dx;
        target.position.y = ay + dy;

        let first = CombatSystem::check_breath(&attacker, &target, &tuning);
        let second = CombatSystem::check_breath(&attacker, &target, &tuning);
        prop_assert_eq!(first, second);

        if let Some(hit) = first {
            prop_assert!(dx * dx + dy * dy < tuning.fire_distance_squared + 1e-6);
            prop_assert_eq!(hit.damage, speed.max(0.0));
        }
    }
}

#[test]
fn trail_is_newest_first() {
    let tuning = Tuning::default();
    let mut p = spawn(400.0, 550.0, 0.0, &tuning);
    p.speed = 6.0;

    for _ in 0..60 {
        p.tick(&tuning);
    }

    // Flying toward -y, so newer points have smaller y
    let ys: Vec<f64> = p.trail.iter().map(|t| t.y).collect();
    assert_eq!(ys.len(), tuning.max_trail_length);
    assert!(ys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn exhaustion_does_not_rearm_thrust() {
    let tuning = Tuning::default();
    let mut p = spawn(400.0, 300.0, 0.0, &tuning);
    p.energy = 1.0;
    p.controls.forward_held = true;

    let controls = p.tick(&tuning);
    assert_eq!(p.energy, 0.0);
    assert!(!controls.forward_held);

    for _ in 0..10 {
        let controls = p.tick(&tuning);
        assert!(!controls.forward_held);
        assert!(!p.thrusting());
    }
}

#[test]
fn forward_with_fractional_energy_still_accelerates() {
    let tuning = Tuning::default();
    let mut p = spawn(400.0, 300.0, 0.0, &tuning);
    p.energy = 0.5;
    p.controls.forward_held = true;

    let controls = p.tick(&tuning);

    assert_eq!(p.speed, tuning.accel_rate);
    assert_eq!(p.energy, 0.5 + tuning.energy_regen_rate);
    assert!(controls.forward_held);
    assert!(!p.thrusting());
}
