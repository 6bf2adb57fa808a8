use super::RingBuffer;

/// Rolling CPU-time statistics for the frame loop.
///
/// Holds the last `capacity` per-iteration CPU times in milliseconds. The
/// driver sizes it to the target frame rate, so the average covers roughly
/// the last second.
#[derive(Debug, Clone)]
pub struct FrameStats {
    cpu_ms: RingBuffer<f64>,
    average_ms: f64,
    frames: u64,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu_ms: RingBuffer::new(capacity),
            average_ms: 0.0,
            frames: 0,
        }
    }

    /// Records one iteration and recomputes the rolling average.
    pub fn record(&mut self, cpu_ms: f64) {
        self.cpu_ms.push(cpu_ms);
        self.average_ms = self.cpu_ms.mean();
        self.frames += 1;
    }

    /// Rolling mean CPU time, 0 before the first sample.
    pub fn average_ms(&self) -> f64 {
        self.average_ms
    }

    pub fn last_ms(&self) -> Option<f64> {
        self.cpu_ms.last().copied()
    }

    /// Total iterations recorded, including those evicted from the ring.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn samples(&self) -> &RingBuffer<f64> {
        &self.cpu_ms
    }
}
