//! This module contains the global constants used by the game.

use std::time::Duration;

use glam::{UVec2, Vec2};

/// The target duration of a single render frame (60 FPS cap).
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The number of simulation ticks per second.
pub const TICKRATE: f32 = 20.0;
/// The duration of a single simulation tick.
pub const TICK_DURATION: Duration = Duration::from_nanos((1_000_000_000.0 / TICKRATE as f64) as u64);

/// The logical resolution the game is rendered at, in pixels.
pub const CANVAS_SIZE: UVec2 = UVec2::new(480, 270);

/// The scale factor for the window (integer zoom).
pub const SCALE: f32 = 3.0;

/// The size of the playfield, in world units. The camera pans across it.
pub const WORLD_SIZE: Vec2 = Vec2::new(1440.0, 810.0);

/// The distance from the listener within which sounds play at full volume.
/// Beyond it the volume falls off with distance.
pub const FULL_VOLUME_RADIUS: f32 = 180.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_time() {
        // 60 FPS = 16.67ms per frame
        let expected_nanos = (1_000_000_000.0 / 60.0) as u64;
        assert_eq!(LOOP_TIME.as_nanos() as u64, expected_nanos);
    }

    #[test]
    fn test_tick_duration() {
        // 20 Hz = 50ms per tick
        assert_eq!(TICK_DURATION, Duration::from_millis(50));
        assert_eq!(TICKRATE, 20.0);
    }

    #[test]
    fn test_canvas_fits_world() {
        assert!(WORLD_SIZE.x >= CANVAS_SIZE.x as f32);
        assert!(WORLD_SIZE.y >= CANVAS_SIZE.y as f32);
    }
}
