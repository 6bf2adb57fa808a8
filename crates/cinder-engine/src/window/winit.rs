use std::time::Duration;

use anyhow::{bail, Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as OsWindow, WindowId};

use crate::core::Window;
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};

/// Window + GPU configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub clear_color: wgpu::Color,
    pub gpu: GpuInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "cinder".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.08,
                a: 1.0,
            },
            gpu: GpuInit::default(),
        }
    }
}

#[self_referencing]
struct Surface {
    window: OsWindow,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Event-loop side of the window: receives winit callbacks during a pump.
struct Platform {
    config: WindowConfig,
    surface: Option<Surface>,
    close_requested: bool,
    init_error: Option<anyhow::Error>,
}

impl Platform {
    fn create_surface(&self, event_loop: &ActiveEventLoop) -> Result<Surface> {
        let attrs = OsWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        SurfaceTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }
}

impl ApplicationHandler for Platform {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_some() {
            return;
        }
        match self.create_surface(event_loop) {
            Ok(surface) => self.surface = Some(surface),
            Err(e) => {
                log::error!("failed to create window surface: {e:#}");
                self.init_error = Some(e);
                self.close_requested = true;
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => surface.with_gpu_mut(|gpu| gpu.resize(size)),
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = surface.with_window(|w| w.inner_size());
                surface.with_gpu_mut(|gpu| gpu.resize(size));
            }
            _ => {}
        }
    }
}

/// Desktop window collaborator backed by winit and wgpu.
///
/// The event loop is pumped without blocking from `update`, so the frame
/// driver keeps control of the loop. Must be created and used on the main
/// thread on platforms that require it.
pub struct WinitWindow {
    event_loop: Option<EventLoop<()>>,
    platform: Platform,
    frame: Option<GpuFrame>,
}

impl WinitWindow {
    pub fn new(config: WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        Ok(Self {
            event_loop: Some(event_loop),
            platform: Platform {
                config,
                surface: None,
                close_requested: false,
                init_error: None,
            },
            frame: None,
        })
    }

    fn pump(&mut self) -> Result<()> {
        let Some(event_loop) = self.event_loop.as_mut() else {
            bail!("window already disposed");
        };

        let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.platform);
        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited with code {code}");
            self.platform.close_requested = true;
        }

        match self.platform.init_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Window for WinitWindow {
    fn prepare(&mut self) -> Result<()> {
        // The surface is created on the first `resumed`, delivered by a pump.
        if self.platform.surface.is_none() && !self.platform.close_requested {
            self.pump()?;
        }

        let clear = self.platform.config.clear_color;
        let Some(surface) = self.platform.surface.as_mut() else {
            return Ok(());
        };

        match surface.with_gpu(|gpu| gpu.begin_frame(clear)) {
            Ok(frame) => self.frame = Some(frame),
            Err(err) => match surface.with_gpu_mut(|gpu| gpu.recover(err)) {
                SurfaceErrorAction::Fatal => bail!("unrecoverable surface error"),
                action => log::debug!("frame skipped: {action:?}"),
            },
        }
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.platform.close_requested
    }

    fn update(&mut self, _delta: f32) -> Result<()> {
        if let (Some(frame), Some(surface)) = (self.frame.take(), self.platform.surface.as_ref()) {
            surface.with(|fields| {
                fields.window.pre_present_notify();
                fields.gpu.present(frame);
            });
        }
        self.pump()
    }

    fn dispose(&mut self) -> Result<()> {
        // Frame, then GPU context, then window, then event loop.
        self.frame = None;
        self.platform.surface = None;
        self.event_loop = None;
        log::debug!("window disposed");
        Ok(())
    }
}
