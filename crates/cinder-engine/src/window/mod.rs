//! Window collaborators.
//!
//! [`WinitWindow`] owns a winit event loop and window wired to the GPU layer;
//! [`HeadlessWindow`] stands in where no display is available.

mod headless;
mod winit;

pub use self::headless::HeadlessWindow;
pub use self::winit::{WindowConfig, WinitWindow};
