//! Engine configuration.
//!
//! Configuration is an explicit value handed to the [`Engine`](crate::core::Engine)
//! and lent to services through [`TickCtx`](crate::service::TickCtx). There is
//! no global or thread-local configuration.

use std::time::Duration;

/// How the schedule reacts to a failing service.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FailurePolicy {
    /// Abort the tick and propagate the error out of `update`.
    Abort,
    /// Log the failure, skip the rest of that service for this tick, and
    /// continue with the next service.
    #[default]
    Isolate,
}

/// Ordering strategy used to build the execution plan.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum OrderingKind {
    /// Services run in registration order.
    #[default]
    Registration,
    /// Writers of a component kind run before its readers.
    Dependency,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target frames per second. Also the capacity of the CPU-time ring.
    pub target_frame_rate: u32,

    /// Lower clamp for measured frame delta.
    pub dt_min: Duration,

    /// Upper clamp for measured frame delta.
    pub dt_max: Duration,

    pub failure_policy: FailurePolicy,
    pub ordering: OrderingKind,

    /// Stop after this many iterations. `None` runs until the window closes.
    pub max_frames: Option<u64>,

    /// Log a frame-time summary every N frames. `0` disables it.
    pub stats_log_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 60,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            failure_policy: FailurePolicy::default(),
            ordering: OrderingKind::default(),
            max_frames: None,
            stats_log_interval: 0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target frame rate. Values below 1 are raised to 1.
    pub fn target_frame_rate(mut self, fps: u32) -> Self {
        self.target_frame_rate = fps.max(1);
        self
    }

    pub fn dt_clamps(mut self, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        self.dt_min = dt_min;
        self.dt_max = dt_max;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn ordering(mut self, ordering: OrderingKind) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn stats_log_interval(mut self, frames: u64) -> Self {
        self.stats_log_interval = frames;
        self
    }

    /// Duration of one frame at the target rate.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_frame_rate.max(1)))
    }

    /// CPU-time ring capacity; equals the target frame rate.
    pub fn stats_capacity(&self) -> usize {
        self.target_frame_rate.max(1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sixty_fps() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.target_frame_rate, 60);
        assert_eq!(cfg.stats_capacity(), 60);
        assert_eq!(cfg.failure_policy, FailurePolicy::Isolate);
        assert_eq!(cfg.ordering, OrderingKind::Registration);
        assert!(cfg.max_frames.is_none());
    }

    #[test]
    fn zero_frame_rate_is_raised() {
        let cfg = EngineConfig::new().target_frame_rate(0);
        assert_eq!(cfg.target_frame_rate, 1);
        assert_eq!(cfg.frame_duration(), Duration::from_secs(1));
    }
}
