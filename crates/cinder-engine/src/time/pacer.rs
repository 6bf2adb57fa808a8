use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::core::Timer;
use crate::diagnostics::RingBuffer;

/// Frame timing snapshot handed to services.
#[derive(Debug, Copy, Clone, Default)]
pub struct FrameTime {
    /// Time elapsed since the previous iteration, in seconds.
    pub dt: f32,

    /// Seconds since the timing source was started.
    pub time: f64,

    /// Monotonic iteration counter, starting at 0.
    pub frame_index: u64,
}

/// Wall-clock timing source that paces the loop to a target frame rate.
///
/// `next_frame` sleeps until the next frame boundary, then measures the delta
/// since the previous boundary. Delta is clamped to avoid pathological values
/// when the process is paused by a debugger, minimized, or stalls:
/// - the minimum prevents zero-dt behavior from tight loops
/// - the maximum prevents simulation explosions after long stalls
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Duration,
    dt_min: Duration,
    dt_max: Duration,
    paced: bool,

    origin: Instant,
    last: Instant,
    deadline: Instant,
    dt: f32,
    recent: RingBuffer<f64>,
}

impl FramePacer {
    pub fn new(config: &EngineConfig) -> Self {
        let now = Instant::now();
        Self {
            frame_duration: config.frame_duration(),
            dt_min: config.dt_min,
            dt_max: config.dt_max,
            paced: true,
            origin: now,
            last: now,
            deadline: now,
            dt: 0.0,
            recent: RingBuffer::new(config.stats_capacity()),
        }
    }

    /// Disables sleeping between frames. Deltas are still measured.
    pub fn unpaced(mut self) -> Self {
        self.paced = false;
        self
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    fn clamp(&self, dt: Duration) -> Duration {
        dt.clamp(self.dt_min, self.dt_max)
    }
}

impl Timer for FramePacer {
    fn start(&mut self) {
        let now = Instant::now();
        self.origin = now;
        self.last = now;
        self.deadline = now + self.frame_duration;
        self.dt = 0.0;
        self.recent.clear();
    }

    fn next_frame(&mut self) {
        if self.paced {
            let now = Instant::now();
            if now < self.deadline {
                std::thread::sleep(self.deadline - now);
            }
        }

        let now = Instant::now();
        let dt = self.clamp(now.saturating_duration_since(self.last));
        self.last = now;
        self.dt = dt.as_secs_f32();
        self.recent.push(dt.as_secs_f64());

        // Fell more than a frame behind: rebase instead of bursting to catch up.
        self.deadline += self.frame_duration;
        if self.deadline < now {
            self.deadline = now + self.frame_duration;
        }
    }

    fn delta_seconds(&self) -> f32 {
        self.dt
    }

    fn time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn average_fps(&self) -> f32 {
        let mean = self.recent.mean();
        if mean > 0.0 { (1.0 / mean) as f32 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacer() -> FramePacer {
        let cfg =
            EngineConfig::new().dt_clamps(Duration::from_millis(1), Duration::from_millis(50));
        let mut p = FramePacer::new(&cfg).unpaced();
        p.start();
        p
    }

    #[test]
    fn delta_is_zero_before_first_frame() {
        let p = pacer();
        assert_eq!(p.delta_seconds(), 0.0);
        assert_eq!(p.average_fps(), 0.0);
    }

    #[test]
    fn delta_is_clamped_to_minimum() {
        let mut p = pacer();
        p.next_frame();
        assert!(p.delta_seconds() >= 0.001);
        assert!(p.delta_seconds() <= 0.05);
    }

    #[test]
    fn delta_is_clamped_to_maximum() {
        let mut p = pacer();
        std::thread::sleep(Duration::from_millis(80));
        p.next_frame();
        assert!((p.delta_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn average_fps_tracks_deltas() {
        let mut p = pacer();
        std::thread::sleep(Duration::from_millis(80));
        p.next_frame();
        // One clamped 50ms sample.
        assert!((p.average_fps() - 20.0).abs() < 0.01);
    }

    #[test]
    fn paced_frames_take_at_least_one_frame_duration() {
        let cfg = EngineConfig::new().target_frame_rate(100);
        let mut p = FramePacer::new(&cfg);
        p.start();
        let begin = Instant::now();
        p.next_frame();
        assert!(begin.elapsed() >= Duration::from_millis(9));
    }
}
