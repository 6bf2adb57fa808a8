mod components;
mod services;

use anyhow::{bail, Context, Result};

use cinder_engine::config::EngineConfig;
use cinder_engine::core::{Engine, Timer, Window};
use cinder_engine::logging::{init_logging, LoggingConfig};
use cinder_engine::time::FramePacer;
use cinder_engine::window::{HeadlessWindow, WindowConfig, WinitWindow};

use components::{Lifetime, Position, Target, Velocity};
use services::{Census, Chase, Expiry, Motion};

#[derive(Debug, Default)]
struct Options {
    headless: bool,
    frames: Option<u64>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut opts = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => opts.headless = true,
                "--frames" => {
                    let n = args.next().context("--frames needs a value")?;
                    let frames = n
                        .parse()
                        .with_context(|| format!("bad frame count `{n}`"))?;
                    opts.frames = Some(frames);
                }
                other => bail!("unknown argument `{other}` (expected --headless, --frames N)"),
            }
        }
        Ok(opts)
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let opts = Options::parse(std::env::args().skip(1))?;

    let mut config = EngineConfig::new().target_frame_rate(60).stats_log_interval(120);
    if let Some(frames) = opts.frames {
        config = config.max_frames(frames);
    }
    let pacer = FramePacer::new(&config);

    if opts.headless {
        let window = HeadlessWindow::new(Some(opts.frames.unwrap_or(600)));
        run(Engine::new(config, pacer, window))
    } else {
        let window = WinitWindow::new(WindowConfig {
            title: "cinder demo".to_string(),
            ..WindowConfig::default()
        })?;
        run(Engine::new(config, pacer, window))
    }
}

fn run<W: Window>(mut engine: Engine<FramePacer, W>) -> Result<()> {
    engine.run(populate::<FramePacer, W>)?;

    log::info!(
        "ran {} frames, avg cpu {:.3} ms, {:.1} fps",
        engine.frame_index(),
        engine.stats().average_ms(),
        engine.average_fps()
    );
    Ok(())
}

/// Spawns a ring of wanderers with short lifetimes and a pair of hunters
/// chasing them.
fn populate<T: Timer, W: Window>(engine: &mut Engine<T, W>) -> Result<()> {
    let schedule = engine.schedule_mut();
    schedule.add_service(Chase)?;
    schedule.add_service(Motion)?;
    schedule.add_service(Expiry)?;
    schedule.add_service(Census::default())?;

    let world = engine.world_mut();
    let mut prey = Vec::new();
    for i in 0..8 {
        let angle = i as f32 / 8.0 * std::f32::consts::TAU;
        let id = world.create_entity()?;
        let (sin, cos) = angle.sin_cos();
        world.add_component(id, Position { x: cos * 100.0, y: sin * 100.0 })?;
        world.add_component(id, Velocity { x: -sin * 20.0, y: cos * 20.0 })?;
        world.add_component(id, Lifetime(2.0 + i as f32))?;
        prey.push(id);
    }

    for (n, &quarry) in prey.iter().step_by(4).enumerate() {
        let id = world.create_entity()?;
        world.add_component(id, Position { x: 0.0, y: 0.0 })?;
        let speed = 35.0 + n as f32 * 10.0;
        world.add_component(id, Target { entity: quarry, speed })?;
        world.add_component(id, Lifetime(12.0))?;
    }

    engine.resources_mut().register_fn("population log", || {
        log::info!("demo population released");
        Ok(())
    });

    log::info!("spawned {} entities", engine.world().len());
    Ok(())
}
