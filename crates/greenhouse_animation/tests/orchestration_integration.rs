//! Integration tests for driver + orchestrator + interpolation
//!
//! These tests verify that:
//! - Interpolated transforms follow their driving values frame by frame
//! - Gestures layered over idle motion replace only the values they touch
//! - Composite timing (sequence, parallel, loop) holds across frame rates
//! - Tearing a session down stops every write it owns

use greenhouse_animation::{
    Animation, AnimationStatus, Clock, Driver, Easing, Interpolation, ManualClock, Orchestrator,
    StaggerPlan, Unit,
};

use pretty_assertions::assert_eq;

const EPS: f64 = 1e-9;

fn run(driver: &mut Driver, clock: &ManualClock, total_ms: f64, frame_ms: f64) {
    let end = clock.now_ms() + total_ms;
    while clock.now_ms() < end - EPS {
        let next = (clock.now_ms() + frame_ms).min(end);
        clock.set(next);
        driver.tick_clock(clock);
    }
}

fn mounted() -> (Driver, ManualClock) {
    let mut driver = Driver::new();
    let clock = ManualClock::new();
    driver.tick_clock(&clock);
    (driver, clock)
}

/// Header entrance: opacity and slide both derive from one value
#[test]
fn test_interpolated_header_entrance() {
    let (mut driver, clock) = mounted();
    let mut session = Orchestrator::new("settings");

    let header = session.create_value(&mut driver, 0.0).unwrap();
    let slide = Interpolation::new(&[0.0, 1.0], &[-50.0, 0.0]).unwrap();
    session
        .start(&mut driver, &Animation::linear(header, 1.0, 500.0).unwrap())
        .unwrap();

    assert_eq!(slide.eval(driver.read(header).unwrap()), -50.0);
    run(&mut driver, &clock, 250.0, 16.0);
    assert!((slide.eval(driver.read(header).unwrap()) + 25.0).abs() < EPS);
    run(&mut driver, &clock, 250.0, 16.0);
    assert_eq!(slide.eval(driver.read(header).unwrap()), 0.0);

    session.cancel(&mut driver);
}

/// A card flip layered on a running rotation only replaces the flip value
#[test]
fn test_gesture_over_idle_motion() {
    let (mut driver, clock) = mounted();
    let mut session = Orchestrator::new("settings");

    let rotation = session.create_value(&mut driver, 0.0).unwrap();
    let rotate_y = session.create_value(&mut driver, 0.0).unwrap();

    let turn = Animation::sequence([
        Animation::linear(rotation, std::f64::consts::TAU, 10_000.0).unwrap(),
        Animation::set(rotation, 0.0).unwrap(),
    ])
    .unwrap();
    let spin = session
        .start(&mut driver, &Animation::forever(turn).unwrap())
        .unwrap();

    let flip = Animation::sequence([
        Animation::linear(rotate_y, 10.0, 200.0).unwrap(),
        Animation::linear(rotate_y, -10.0, 400.0).unwrap(),
        Animation::linear(rotate_y, 0.0, 200.0).unwrap(),
    ])
    .unwrap();

    run(&mut driver, &clock, 1000.0, 16.0);
    let first = session.drive(&mut driver, &flip).unwrap();
    run(&mut driver, &clock, 400.0, 16.0);
    assert!((driver.read(rotate_y).unwrap() - 0.0).abs() < EPS);

    // pressing again mid-flip restarts from the current angle
    run(&mut driver, &clock, 100.0, 16.0);
    let mid = driver.read(rotate_y).unwrap();
    assert!((mid + 5.0).abs() < EPS);
    let second = session.drive(&mut driver, &flip).unwrap();
    // the interrupted flip is released by the session
    assert_eq!(driver.status(first), None);
    assert!(!session.animations().contains(&first));
    assert_eq!(driver.read(rotate_y).unwrap(), mid);
    run(&mut driver, &clock, 100.0, 16.0);
    assert!((driver.read(rotate_y).unwrap() - 2.5).abs() < EPS);

    // the background rotation never noticed
    assert_eq!(driver.status(spin), Some(AnimationStatus::Running));
    let angle = driver.read(rotation).unwrap();
    assert!((angle - std::f64::consts::TAU * 0.16).abs() < 1e-9);

    run(&mut driver, &clock, 700.0, 16.0);
    assert_eq!(driver.status(second), Some(AnimationStatus::Completed));
    assert_eq!(driver.read(rotate_y).unwrap(), 0.0);

    session.cancel(&mut driver);
}

/// Total sequence time equals the sum of its steps at any frame rate
#[test]
fn test_sequence_timing_independent_of_frame_rate() {
    for frame_ms in [1.0, 7.0, 16.0, 1000.0 / 60.0, 33.0, 250.0] {
        let (mut driver, clock) = mounted();
        let v = driver.create_value(0.0).unwrap();
        let id = driver
            .drive(
                &Animation::sequence([
                    Animation::delay(120.0).unwrap(),
                    Animation::timing(v, 4.0, 300.0, Easing::EaseOut).unwrap(),
                    Animation::delay(80.0).unwrap(),
                    Animation::linear(v, 0.0, 100.0).unwrap(),
                ])
                .unwrap(),
            )
            .unwrap();

        run(&mut driver, &clock, 599.0, frame_ms);
        assert!(driver.is_running(id), "frame {frame_ms}: finished early");
        run(&mut driver, &clock, 1.0, frame_ms);
        assert_eq!(
            driver.status(id),
            Some(AnimationStatus::Completed),
            "frame {frame_ms}: not finished at 600 ms"
        );
        assert_eq!(driver.read(v).unwrap(), 0.0);
    }
}

/// Parallel children progress independently of each other's durations
#[test]
fn test_parallel_children_are_independent() {
    let (mut driver, clock) = mounted();
    let short = driver.create_value(0.0).unwrap();
    let long = driver.create_value(0.0).unwrap();
    let id = driver
        .drive(
            &Animation::parallel([
                Animation::linear(short, 1.0, 200.0).unwrap(),
                Animation::linear(long, 1.0, 800.0).unwrap(),
            ])
            .unwrap(),
        )
        .unwrap();

    run(&mut driver, &clock, 100.0, 10.0);
    assert!((driver.read(short).unwrap() - 0.5).abs() < EPS);
    assert!((driver.read(long).unwrap() - 0.125).abs() < EPS);

    run(&mut driver, &clock, 699.0, 10.0);
    assert!(driver.is_running(id));
    run(&mut driver, &clock, 1.0, 10.0);
    assert_eq!(driver.take_completed(), vec![id]);
}

/// Torn-down sessions leave nothing running and nothing writable
#[test]
fn test_teardown_stops_every_write() {
    let (mut driver, clock) = mounted();
    let mut session = Orchestrator::new("settings");
    let items = session
        .stagger(
            &mut driver,
            0..8usize,
            StaggerPlan {
                from: 0.0,
                to: 1.0,
                start_ms: 500.0,
                interval_ms: 100.0,
                duration_ms: 400.0,
                easing: Easing::EaseOut,
            },
        )
        .unwrap();
    run(&mut driver, &clock, 650.0, 16.0);
    assert!(driver.has_active_animations());

    let first = items.get(&0).unwrap();
    session.cancel(&mut driver);
    session.cancel(&mut driver);

    assert!(!driver.has_active_animations());
    assert!(driver.read(first).is_err());
    run(&mut driver, &clock, 2000.0, 16.0);
    assert_eq!(driver.value_count(), 0);
    assert_eq!(session.running(&driver), 0);
}

/// Rotation interpolated to a degrees string, as a transform would consume it
#[test]
fn test_rotation_degrees_string() {
    let (mut driver, clock) = mounted();
    let mut session = Orchestrator::new("home");
    let press = session.create_value(&mut driver, 0.0).unwrap();
    let rotate_y = Interpolation::new(&[0.0, 1.0], &[0.0, 360.0])
        .unwrap()
        .with_unit(Unit::Degrees);

    let id = session
        .start(&mut driver, &Animation::linear(press, 1.0, 500.0).unwrap())
        .unwrap();
    run(&mut driver, &clock, 125.0, 5.0);
    assert_eq!(rotate_y.eval_string(driver.read(press).unwrap()), "90deg");
    run(&mut driver, &clock, 375.0, 5.0);
    assert_eq!(rotate_y.eval_string(driver.read(press).unwrap()), "360deg");
    assert_eq!(driver.status(id), Some(AnimationStatus::Completed));

    session.cancel(&mut driver);
}
