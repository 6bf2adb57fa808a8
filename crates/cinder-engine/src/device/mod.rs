//! GPU device + surface management.
//!
//! Responsible for:
//! - creating the wgpu Device/Queue and configuring the window surface
//! - acquiring frames with a clear pass and presenting them
//! - mapping surface errors to recovery actions

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
