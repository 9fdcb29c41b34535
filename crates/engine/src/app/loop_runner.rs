use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::metrics::FrameWindow;
use super::rendering::Renderer;
use super::{AssetLoader, FrameContext, InputSignal, InputState, Scene};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub metrics_log_interval: Duration,
    /// `None` waits for assets forever.
    pub asset_load_timeout: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Race Car".to_string(),
            window_width: 1280,
            window_height: 720,
            metrics_log_interval: Duration::from_secs(1),
            asset_load_timeout: Some(Duration::from_secs(10)),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` once per display refresh until the
/// window closes or Escape is pressed.
pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let loader = AssetLoader::new(config.asset_load_timeout);
    info!(
        window_width = config.window_width,
        window_height = config.window_height,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        asset_load_timeout_ms = ?config.asset_load_timeout.map(|timeout| timeout.as_millis() as u64),
        "loop_config"
    );

    scene.load(&loader);

    let loop_start = Instant::now();
    let mut last_frame_instant = loop_start;
    let mut frame_window = FrameWindow::new(metrics_log_interval, loop_start);
    let mut host_input = HostInput::default();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    resize_renderer(&mut renderer, new_size.width, new_size.height);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    resize_renderer(&mut renderer, size.width, size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    host_input.handle_key_event(&event);
                    if host_input.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    host_input.handle_mouse_input(button, state);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let context = FrameContext {
                        timestamp_ms: now.saturating_duration_since(loop_start).as_secs_f64()
                            * 1000.0,
                        now,
                        input: &host_input.state,
                        viewport: renderer.viewport(),
                    };
                    if let Err(error) = renderer.render_with(|canvas| scene.frame(context, canvas))
                    {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    frame_window.push(frame_dt);
                    if let Some(stats) = frame_window.close_if_elapsed(now) {
                        info!(
                            frames = stats.frames,
                            fps = stats.fps,
                            mean_frame_ms = stats.mean_frame_ms,
                            worst_frame_ms = stats.worst_frame_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn resize_renderer(renderer: &mut Renderer, width: u32, height: u32) {
    match renderer.resize(width, height) {
        Ok(true) => info!(width, height, "viewport_resized"),
        Ok(false) => {}
        Err(error) => warn!(error = %error, width, height, "renderer_resize_failed"),
    }
}

/// Projects raw window events onto the core's [`InputState`].
#[derive(Debug, Default)]
struct HostInput {
    state: InputState,
    left_mouse_is_down: bool,
    quit_requested: bool,
}

impl HostInput {
    fn handle_key_event(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        if matches!(key, PhysicalKey::Code(KeyCode::Escape)) && state == ElementState::Pressed {
            self.quit_requested = true;
            return;
        }
        let Some(signal) = signal_for_key(key) else {
            return;
        };
        match state {
            ElementState::Pressed => self.state.press(signal),
            ElementState::Released => self.state.release(signal),
        }
    }

    /// A click is a left press followed by its release.
    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => self.left_mouse_is_down = true,
            ElementState::Released => {
                if self.left_mouse_is_down {
                    self.state.notify_select();
                }
                self.left_mouse_is_down = false;
            }
        }
    }
}

fn signal_for_key(key: PhysicalKey) -> Option<InputSignal> {
    match key {
        PhysicalKey::Code(KeyCode::ArrowUp) | PhysicalKey::Code(KeyCode::KeyW) => {
            Some(InputSignal::Accelerate)
        }
        PhysicalKey::Code(KeyCode::ArrowDown) | PhysicalKey::Code(KeyCode::KeyS) => {
            Some(InputSignal::Brake)
        }
        PhysicalKey::Code(KeyCode::ArrowLeft) | PhysicalKey::Code(KeyCode::KeyA) => {
            Some(InputSignal::TurnLeft)
        }
        PhysicalKey::Code(KeyCode::ArrowRight) | PhysicalKey::Code(KeyCode::KeyD) => {
            Some(InputSignal::TurnRight)
        }
        _ => None,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
