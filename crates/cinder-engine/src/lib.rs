//! Cinder engine crate.
//!
//! Composes game objects from components and drives them each frame through
//! an ordered set of services:
//! - [`ecs`]: entity identity and type-keyed component attachment
//! - [`service`]: the per-frame processor contract
//! - [`schedule`]: execution plan construction and the two-phase tick
//! - [`core`]: collaborator contracts and the frame driver
//!
//! Everything runs on one thread. The graphics context is thread-affine, so
//! the engine, its services, and its window stay on the thread that made them.

pub mod config;
pub mod core;
pub mod device;
pub mod diagnostics;
pub mod ecs;
pub mod error;
pub mod logging;
pub mod resources;
pub mod schedule;
pub mod service;
pub mod time;
pub mod window;

pub use error::{EngineError, Result};
