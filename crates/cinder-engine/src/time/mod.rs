//! Time subsystem.
//!
//! Intended usage:
//! - one `FramePacer` per frame loop, handed to the engine as its `Timer`
//! - the engine calls `next_frame()` once per iteration and snapshots
//!   `FrameTime` for services

mod pacer;

pub use pacer::{FramePacer, FrameTime};
