//! Tick-based timers and the clock that bridges the two loops.
//!
//! Everything in the simulation counts in ticks, not wall time. A speed
//! multiplier of 1.0 advances a timer by one tick per update.

use std::time::Instant;

use crate::constants::TICKRATE;

/// A countdown timer driven by simulation ticks.
///
/// Non-looping timers report completion exactly once and then saturate;
/// looping timers wrap and report completion on every wrap.
#[derive(Debug, Clone)]
pub struct Timer {
    duration: f32,
    time_left: f32,
    looping: bool,
}

impl Timer {
    /// Creates a one-shot timer.
    ///
    /// Panics if `duration` is not positive, since a zero-length timer is
    /// always a bug at the call site.
    pub fn new(duration: f32) -> Self {
        assert!(duration > 0.0, "timer duration must be positive, got {duration}");
        Self {
            duration,
            time_left: duration,
            looping: false,
        }
    }

    /// Creates a timer that wraps around instead of saturating.
    pub fn looping(duration: f32) -> Self {
        Self {
            looping: true,
            ..Self::new(duration)
        }
    }

    /// Advances the timer by `speed` ticks.
    ///
    /// Returns true on the update that brings the timer to completion. A
    /// completed one-shot timer ignores further updates and keeps
    /// returning false.
    pub fn update(&mut self, speed: f32) -> bool {
        if !self.looping && self.time_left <= 0.0 {
            return false;
        }
        self.time_left -= speed;
        if self.time_left > 0.0 {
            return false;
        }
        if self.looping {
            while self.time_left <= 0.0 {
                self.time_left += self.duration;
            }
        } else {
            self.time_left = 0.0;
        }
        true
    }

    /// The completed portion of the timer, from 0.0 to 1.0.
    pub fn fraction(&self) -> f32 {
        (1.0 - self.time_left / self.duration).clamp(0.0, 1.0)
    }

    pub fn complete(&self) -> bool {
        !self.looping && self.time_left <= 0.0
    }

    pub fn restart(&mut self) {
        self.time_left = self.duration;
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}

/// Counts ticks upward, for run timers and spawn pacing.
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    ticks: u64,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn seconds(&self) -> f32 {
        self.ticks as f32 / TICKRATE
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}

/// Tracks when the last simulation tick ran so the render loop can
/// interpolate between ticks.
#[derive(Debug, Clone)]
pub struct TickClock {
    last_tick: Instant,
    tick: u64,
    tickrate: f32,
}

impl TickClock {
    pub fn new(tickrate: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            tick: 0,
            tickrate,
        }
    }

    /// Records that a simulation tick just finished.
    pub fn mark_tick(&mut self, now: Instant) {
        self.last_tick = now;
        self.tick += 1;
    }

    /// How far the render time `now` has progressed into the current tick,
    /// from 0.0 (tick just ran) to 1.0 (next tick is due).
    ///
    /// Saturates at 1.0 when the simulation falls behind, so drawing never
    /// extrapolates past the last authoritative tick.
    pub fn lerp_amount(&self, now: Instant) -> f32 {
        let since = now.saturating_duration_since(self.last_tick).as_secs_f32();
        (since * self.tickrate).clamp(0.0, 1.0)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
