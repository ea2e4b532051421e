//! Render-loop frame timing over a sliding window.

use std::time::Duration;

use circular_buffer::CircularBuffer;
use thousands::Separable;

const WINDOW: usize = 120;

/// The last couple of seconds of frame durations.
pub struct FrameTiming {
    frames: CircularBuffer<WINDOW, Duration>,
}

impl FrameTiming {
    pub fn new() -> Self {
        Self {
            frames: CircularBuffer::new(),
        }
    }

    pub fn record(&mut self, frame: Duration) {
        self.frames.push_back(frame);
    }

    /// Mean frame time over the window.
    pub fn average(&self) -> Duration {
        if self.frames.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.frames.iter().sum();
        total / self.frames.len() as u32
    }

    /// Slowest frame in the window.
    pub fn worst(&self) -> Duration {
        self.frames.iter().max().copied().unwrap_or(Duration::ZERO)
    }

    pub fn fps(&self) -> f64 {
        let average = self.average().as_secs_f64();
        if average > 0.0 {
            1.0 / average
        } else {
            0.0
        }
    }

    /// Short human form for periodic log lines.
    pub fn summary(&self) -> String {
        let fps = self.fps();
        if fps >= 1000.0 {
            format!("{} fps", (fps as u64).separate_with_commas())
        } else {
            format!("{:.0} fps, worst {:.1?}", fps, self.worst())
        }
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_over_window() {
        let mut timing = FrameTiming::new();
        for _ in 0..10 {
            timing.record(Duration::from_millis(16));
        }
        let average = timing.average();
        assert_eq!(average, Duration::from_millis(16));
        assert!((timing.fps() - 62.5).abs() < 0.1);
    }

    #[test]
    fn test_window_drops_old_frames() {
        let mut timing = FrameTiming::new();
        timing.record(Duration::from_millis(100));
        for _ in 0..WINDOW {
            timing.record(Duration::from_millis(10));
        }
        // The slow frame has been pushed out of the window.
        assert_eq!(timing.worst(), Duration::from_millis(10));
    }

    #[test]
    fn test_empty_timing_reports_zero() {
        let timing = FrameTiming::new();
        assert_eq!(timing.average(), Duration::ZERO);
        assert_eq!(timing.fps(), 0.0);
    }
}
