use anyhow::{bail, Result};

use crate::core::Window;

/// Window collaborator without a display.
///
/// Requests close once `frame_limit` frames have been presented; `None`
/// never closes on its own. Counts calls so callers can check the protocol.
#[derive(Debug, Default, Clone)]
pub struct HeadlessWindow {
    frame_limit: Option<u64>,
    prepared: u64,
    presented: u64,
    disposed: u32,
    in_frame: bool,
}

impl HeadlessWindow {
    pub fn new(frame_limit: Option<u64>) -> Self {
        Self {
            frame_limit,
            ..Self::default()
        }
    }

    pub fn prepared(&self) -> u64 {
        self.prepared
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of `dispose` calls received.
    pub fn disposed(&self) -> u32 {
        self.disposed
    }
}

impl Window for HeadlessWindow {
    fn prepare(&mut self) -> Result<()> {
        if self.disposed > 0 {
            bail!("headless window already disposed");
        }
        if self.in_frame {
            bail!("prepare called twice without presenting");
        }
        self.in_frame = true;
        self.prepared += 1;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.frame_limit.is_some_and(|limit| self.presented >= limit)
    }

    fn update(&mut self, _delta: f32) -> Result<()> {
        if !self.in_frame {
            bail!("present without a prepared frame");
        }
        self.in_frame = false;
        self.presented += 1;
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.disposed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::Engine;
    use crate::time::FramePacer;

    #[test]
    fn closes_after_frame_limit() {
        let mut w = HeadlessWindow::new(Some(2));
        for _ in 0..2 {
            assert!(!w.should_close());
            w.prepare().unwrap();
            w.update(0.0).unwrap();
        }
        assert!(w.should_close());
    }

    #[test]
    fn rejects_out_of_order_calls() {
        let mut w = HeadlessWindow::new(None);
        assert!(w.update(0.0).is_err());
        w.prepare().unwrap();
        assert!(w.prepare().is_err());
    }

    #[test]
    fn drives_a_full_engine_run() {
        let config = EngineConfig::new().target_frame_rate(240);
        let pacer = FramePacer::new(&config).unpaced();
        let mut engine = Engine::new(config, pacer, HeadlessWindow::new(Some(5)));

        engine.run(|_| Ok(())).unwrap();

        assert_eq!(engine.window().prepared(), 5);
        assert_eq!(engine.window().presented(), 5);
        assert_eq!(engine.window().disposed(), 1);
        assert_eq!(engine.stats().frames(), 5);
        assert!(engine.stats().average_ms() >= 0.0);
    }
}
