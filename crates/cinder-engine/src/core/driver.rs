use std::time::Instant;

use crate::config::EngineConfig;
use crate::diagnostics::FrameStats;
use crate::ecs::World;
use crate::error::{EngineError, Result};
use crate::resources::{ResourceManager, TeardownReport};
use crate::schedule::{Schedule, TickReport};
use crate::service::{Commands, TickCtx};
use crate::time::FrameTime;

use super::{Timer, Window};

/// Lifecycle of the frame driver.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DriverState {
    Initializing,
    Running,
    /// Terminal. Teardown has run or is running.
    Terminating,
}

/// The frame driver.
///
/// Owns the entity registry, the schedule, the resource manager, and the two
/// collaborators. The whole loop runs on the calling thread; the window
/// collaborator is typically bound to it.
pub struct Engine<T: Timer, W: Window> {
    config: EngineConfig,
    world: World,
    schedule: Schedule,
    resources: ResourceManager,
    stats: FrameStats,
    commands: Commands,
    last_tick: TickReport,

    timer: T,
    window: W,

    state: DriverState,
    frame_index: u64,
    torn_down: bool,
}

impl<T: Timer, W: Window> Engine<T, W> {
    pub fn new(config: EngineConfig, timer: T, window: W) -> Self {
        Self {
            schedule: Schedule::from_config(&config),
            stats: FrameStats::new(config.stats_capacity()),
            world: World::new(),
            resources: ResourceManager::new(),
            commands: Commands::default(),
            last_tick: TickReport::default(),
            config,
            timer,
            window,
            state: DriverState::Initializing,
            frame_index: 0,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut Schedule {
        &mut self.schedule
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Iterations completed so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Report of the most recent tick.
    pub fn last_tick(&self) -> &TickReport {
        &self.last_tick
    }

    pub fn average_fps(&self) -> f32 {
        self.timer.average_fps()
    }

    /// Runs the loop to completion.
    ///
    /// `setup` runs once after the timing source starts and before the first
    /// iteration. Teardown (window disposal, then resource release) runs once
    /// on every exit path; if the loop failed, that error is returned.
    pub fn run<F>(&mut self, setup: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> anyhow::Result<()>,
    {
        if self.state != DriverState::Initializing {
            return Err(EngineError::AlreadyRan);
        }

        let outcome = self.start(setup).and_then(|()| {
            while self.step()? {}
            Ok(())
        });

        let teardown = self.shutdown();
        outcome.and(teardown)
    }

    /// Starts the timing source, runs `setup` and enters the running state.
    ///
    /// For embedders driving [`step`](Self::step) themselves; pair with
    /// [`shutdown`](Self::shutdown). On a setup failure the driver stays in
    /// `Initializing` and still needs `shutdown`.
    pub fn start<F>(&mut self, setup: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> anyhow::Result<()>,
    {
        if self.state != DriverState::Initializing {
            return Err(EngineError::AlreadyRan);
        }

        log::info!("frame driver initializing");
        self.timer.start();
        setup(self).map_err(EngineError::Setup)?;

        self.state = DriverState::Running;
        log::info!(
            "frame driver running: {} services, plan {:?}",
            self.schedule.len(),
            self.schedule.plan_names()
        );
        Ok(())
    }

    /// Runs one iteration: prepare, update the schedule, apply buffered
    /// commands, present, record CPU time, advance the timer.
    ///
    /// Returns `false` once the loop should stop. Fails with
    /// [`EngineError::NotRunning`] before the driver has started or after it
    /// has shut down.
    pub fn step(&mut self) -> Result<bool> {
        if self.state != DriverState::Running {
            return Err(EngineError::NotRunning);
        }
        let started = Instant::now();

        self.window.prepare().map_err(EngineError::Collaborator)?;

        let delta = self.timer.delta_seconds();
        let time = FrameTime {
            dt: delta,
            time: self.timer.time(),
            frame_index: self.frame_index,
        };

        let mut ctx = TickCtx::new(&self.config, time, &mut self.commands);
        self.last_tick = self.schedule.update(&mut self.world, &mut ctx, delta)?;
        self.apply_commands();

        self.window.update(delta).map_err(EngineError::Collaborator)?;

        self.stats.record(started.elapsed().as_secs_f64() * 1000.0);
        self.log_stats();

        self.timer.next_frame();
        self.frame_index += 1;

        Ok(!self.should_stop())
    }

    fn apply_commands(&mut self) {
        for id in self.commands.drain_despawns() {
            if !self.world.despawn(id) {
                log::debug!("despawn of {id} ignored: not live");
            }
        }
    }

    fn should_stop(&self) -> bool {
        if self.window.should_close() {
            log::info!("window requested close");
            return true;
        }
        if self.commands.exit_requested() {
            log::info!("exit requested by a service");
            return true;
        }
        self.config
            .max_frames
            .is_some_and(|max| self.frame_index >= max)
    }

    fn log_stats(&self) {
        let interval = self.config.stats_log_interval;
        if interval == 0 || self.frame_index % interval != 0 {
            return;
        }
        log::debug!(
            "frame {}: cpu {:.3} ms (avg {:.3} ms), {:.1} fps, {} entities",
            self.frame_index,
            self.stats.last_ms().unwrap_or(0.0),
            self.stats.average_ms(),
            self.timer.average_fps(),
            self.world.len(),
        );
    }

    /// Enters the terminal state and tears down: window disposal, then
    /// resource release. Only the first call does any work.
    pub fn shutdown(&mut self) -> Result<()> {
        self.state = DriverState::Terminating;
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        log::info!("frame driver terminating after {} frames", self.frame_index);

        let window = self.window.dispose().map_err(EngineError::Collaborator);
        if let Err(e) = &window {
            log::error!("window disposal failed: {e}");
        }

        let report: TeardownReport = self.resources.dispose_all();
        if !report.is_clean() {
            log::warn!(
                "teardown: {} released, {} failed",
                report.released.len(),
                report.failures.len()
            );
        }

        window
    }
}
