use std::time::{Duration, Instant};

use driftbelt::constants::TICKRATE;
use driftbelt::timing::{Stopwatch, TickClock, Timer};
use speculoos::prelude::*;

#[test]
fn test_one_shot_timer_completes_once() {
    let mut timer = Timer::new(3.0);

    assert!(!timer.update(1.0));
    assert!(!timer.update(1.0));
    assert!(timer.update(1.0));
    assert!(timer.complete());

    // Saturated; no more completions
    assert!(!timer.update(1.0));
}

#[test]
fn test_fraction_runs_zero_to_one() {
    let mut timer = Timer::new(4.0);
    assert_eq!(timer.fraction(), 0.0);

    timer.update(1.0);
    assert_eq!(timer.fraction(), 0.25);

    for _ in 0..3 {
        timer.update(1.0);
    }
    assert_eq!(timer.fraction(), 1.0);
}

#[test]
fn test_looping_timer_wraps() {
    let mut timer = Timer::looping(2.0);

    assert!(!timer.update(1.0));
    assert!(timer.update(1.0));
    assert!(!timer.update(1.0));
    assert!(timer.update(1.0));
}

#[test]
fn test_looping_timer_handles_large_steps() {
    let mut timer = Timer::looping(2.0);

    assert!(timer.update(5.0));

    // Wrapped back into range rather than going negative
    assert_that(&timer.time_left()).is_greater_than(0.0);
    assert_that(&timer.time_left()).is_less_than_or_equal_to(2.0);
}

#[test]
fn test_restart_rewinds_a_finished_timer() {
    let mut timer = Timer::new(2.0);
    timer.update(1.0);
    timer.update(1.0);
    assert!(timer.complete());

    timer.restart();
    assert!(!timer.complete());
    assert!(!timer.update(1.0));
    assert!(timer.update(1.0));
}

#[test]
fn test_stopwatch_converts_ticks_to_seconds() {
    let mut watch = Stopwatch::new();
    for _ in 0..TICKRATE as u32 {
        watch.update();
    }

    assert_eq!(watch.ticks(), TICKRATE as u64);
    assert_eq!(watch.seconds(), 1.0);

    watch.reset();
    assert_eq!(watch.ticks(), 0);
}

#[test]
fn test_render_clock_interpolates_between_ticks() {
    let start = Instant::now();
    let mut clock = TickClock::new(20.0);
    clock.mark_tick(start);

    assert_eq!(clock.lerp_amount(start), 0.0);
    // Half of a 50ms tick
    assert_that(&clock.lerp_amount(start + Duration::from_millis(25))).is_close_to(0.5, 1e-4);
    assert_that(&clock.lerp_amount(start + Duration::from_millis(50))).is_close_to(1.0, 1e-4);

    // The next tick opens a fresh window
    let next = start + Duration::from_millis(50);
    clock.mark_tick(next);
    assert_eq!(clock.lerp_amount(next), 0.0);
}

#[test]
fn test_render_clock_saturates_when_the_simulation_stalls() {
    let start = Instant::now();
    let mut clock = TickClock::new(20.0);
    clock.mark_tick(start);

    assert_eq!(clock.lerp_amount(start + Duration::from_secs(3)), 1.0);
}

#[test]
fn test_render_clock_never_runs_backwards() {
    let start = Instant::now();
    let later = start + Duration::from_millis(5);
    let mut clock = TickClock::new(20.0);
    clock.mark_tick(later);

    // Asking about a moment before the tick clamps to zero
    assert_eq!(clock.lerp_amount(start), 0.0);
}

#[test]
fn test_render_clock_counts_ticks() {
    let mut clock = TickClock::new(20.0);
    assert_eq!(clock.tick(), 0);

    clock.mark_tick(Instant::now());
    clock.mark_tick(Instant::now());

    assert_eq!(clock.tick(), 2);
}
