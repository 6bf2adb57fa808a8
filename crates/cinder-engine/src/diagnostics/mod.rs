//! Frame diagnostics: a fixed-capacity ring and the rolling CPU-time average
//! built on it.

mod frame_stats;
mod ring;

pub use frame_stats::FrameStats;
pub use ring::RingBuffer;
