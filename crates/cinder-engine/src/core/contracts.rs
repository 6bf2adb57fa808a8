use anyhow::Result;

/// Timing source driving the frame loop.
pub trait Timer {
    /// Establishes the time origin. Called once while the driver initializes.
    fn start(&mut self);

    /// Advances to the next frame boundary, pacing if the source paces.
    fn next_frame(&mut self);

    /// Seconds between the two most recent frame boundaries.
    fn delta_seconds(&self) -> f32;

    /// Seconds since `start`.
    fn time(&self) -> f64;

    fn average_fps(&self) -> f32;
}

/// Render/window collaborator. All calls arrive on the thread that created it.
pub trait Window {
    /// Begins a new frame.
    fn prepare(&mut self) -> Result<()>;

    /// Whether the platform asked the loop to stop.
    fn should_close(&self) -> bool;

    /// Presents the frame and polls the platform.
    fn update(&mut self, delta: f32) -> Result<()>;

    /// Releases the window and its graphics context.
    fn dispose(&mut self) -> Result<()>;
}
