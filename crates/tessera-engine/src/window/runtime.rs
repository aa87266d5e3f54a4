use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::device::{GpuContextManager, GpuInit, WgpuPlatform};
use crate::render::{FrameControl, FrameLoop, StopToken};
use crate::shader::{FsShaderLoader, ShaderConfig};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessera".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Events posted to the event loop from helper threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuntimeEvent {
    /// The GPU context is published; the first frame can be scheduled.
    GpuReady,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, starts GPU initialization and renders until the
    /// window closes or a frame fails.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, shaders: ShaderConfig) -> Result<()> {
        let event_loop = EventLoop::<RuntimeEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let proxy = event_loop.create_proxy();
        let mut state = RuntimeState::new(config, gpu_init, shaders, proxy);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

type WindowFrameLoop = FrameLoop<WgpuPlatform, Arc<Window>>;

struct RuntimeState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    shaders: ShaderConfig,
    proxy: EventLoopProxy<RuntimeEvent>,

    window: Option<Arc<Window>>,
    frame_loop: Option<WindowFrameLoop>,
    gpu_ready: bool,
    stop: StopToken,

    error: Option<anyhow::Error>,
}

impl RuntimeState {
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        shaders: ShaderConfig,
        proxy: EventLoopProxy<RuntimeEvent>,
    ) -> Self {
        Self {
            config,
            gpu_init,
            shaders,
            proxy,
            window: None,
            frame_loop: None,
            gpu_ready: false,
            stop: StopToken::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.stop.stop();
        event_loop.exit();
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        // Resize recovery is not supported, so the surface size is fixed.
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        // Surface creation stays on the event-loop thread.
        let platform = WgpuPlatform::new(Arc::clone(&window), self.gpu_init.clone());
        let loader = FsShaderLoader::new(&self.shaders.root);
        let manager = GpuContextManager::spawn(platform, loader, self.shaders.clone())?;

        let frame_loop = FrameLoop::new(manager, Arc::clone(&window), self.stop.clone());
        let proxy = self.proxy.clone();
        frame_loop.notify_when_ready(move || {
            if proxy.send_event(RuntimeEvent::GpuReady).is_err() {
                log::debug!("event loop closed before the GPU was ready");
            }
        })?;

        self.window = Some(window);
        self.frame_loop = Some(frame_loop);
        Ok(())
    }
}

impl ApplicationHandler<RuntimeEvent> for RuntimeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e.context("failed to start runtime"));
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: RuntimeEvent) {
        match event {
            RuntimeEvent::GpuReady => {
                self.gpu_ready = true;
                if let Some(frame_loop) = &self.frame_loop {
                    frame_loop.start();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.stop.stop();
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                // Redraws the platform sends before the GPU is ready are ignored.
                if !self.gpu_ready {
                    return;
                }
                let Some(frame_loop) = self.frame_loop.as_mut() else {
                    return;
                };

                match frame_loop.render_frame() {
                    Ok(FrameControl::Scheduled) => {}
                    Ok(FrameControl::Stopped) => event_loop.exit(),
                    Err(e) => self.fail(event_loop, anyhow::Error::new(e).context("frame failed")),
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(frame_loop) = &self.frame_loop {
            log::info!("exiting after {} frames", frame_loop.frames_rendered());
        }
    }
}
