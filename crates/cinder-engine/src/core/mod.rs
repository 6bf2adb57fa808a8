//! Core engine-facing contracts and the frame driver.
//!
//! `Timer` and `Window` are the narrow collaborator contracts the driver
//! consumes; [`Engine`] owns the loop that ties them to the schedule.

mod contracts;
mod driver;

pub use contracts::{Timer, Window};
pub use driver::{DriverState, Engine};
