use anyhow::{Context, Result};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::StdRng;
use reflex_core::Level;
use reflex_experiment::{EngineConfig, RngSource, TrialEngine};
use reflex_render::SkiaRenderer;
use reflex_store::{DeviceIdentity, IdentityProvider, JsonlStore, NoIdentity, ScoreReporter};
use reflex_timing::{Clock, MonotonicClock};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Icon, Window, WindowId},
};

use crate::args::Cli;
use crate::controller::{Controller, Flow};
use crate::input::{UiAction, map_key};
use crate::profile::Profile;

/// How often a pending score write is checked while nothing else is due.
const SAVE_POLL: Duration = Duration::from_millis(50);

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    controller: Controller<RngSource<StdRng>>,
    clock: MonotonicClock,
    icon: Option<Icon>,
    windowed: bool,
    start_level: Option<Level>,
    /// Last cursor position in physical pixels, which is canvas space.
    cursor: (f32, f32),

    should_exit: bool,
}

impl App {
    pub fn new(cli: &Cli) -> Result<Self> {
        let profile = Profile::load(&cli.data_dir, cli.nickname.as_deref())?;

        let identity: Arc<dyn IdentityProvider> = if cli.anonymous {
            Arc::new(NoIdentity)
        } else {
            match DeviceIdentity::load_or_create(profile.identity_path()) {
                Ok(id) => Arc::new(id),
                Err(e) => {
                    warn!(error = %e, "no device identity, scores will not be saved");
                    Arc::new(NoIdentity)
                }
            }
        };
        let store = Arc::new(JsonlStore::new(profile.scores_path()));
        let reporter = ScoreReporter::new(store, identity);

        let rng = cli
            .seed
            .map_or_else(RngSource::from_os_rng, RngSource::seeded);
        let engine = TrialEngine::new(EngineConfig::default(), rng);

        let start_level = cli.level.map(Level::new).transpose()?;

        info!(
            data_dir = %profile.data_dir().display(),
            nickname = profile.nickname(),
            seed = cli.seed,
            "starting"
        );

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            controller: Controller::new(engine, reporter, profile),
            clock: MonotonicClock::new(),
            icon: Self::build_icon(),
            windowed: cli.windowed,
            start_level,
            cursor: (0.0, 0.0),
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        debug!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "event loop ready"
        );
        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut window_attributes = Window::default_attributes()
            .with_title("Reflex")
            .with_window_icon(self.icon.clone());

        if self.windowed {
            window_attributes = window_attributes
                .with_inner_size(LogicalSize::new(1024.0, 768.0))
                .with_resizable(true);
        } else {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next())
                .context("no monitor available")?;
            if let Some(rate) = monitor.refresh_rate_millihertz() {
                debug!(refresh_hz = rate as f64 / 1000.0, "primary monitor");
            }
            window_attributes = window_attributes
                .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
                .with_resizable(false);
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            "window created"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);
        self.renderer = Some(SkiaRenderer::new(size.width, size.height)?);
        self.controller.resize(size.width, size.height);

        if let Some(level) = self.start_level.take() {
            let now = self.clock.now_ms();
            self.controller.handle(UiAction::StartLevel(level), now);
        }

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let stats = renderer.render_frame(self.controller.scene(), pixels.frame_mut())?;
        let t = Instant::now();
        pixels.render()?;
        trace!(
            present_us = t.elapsed().as_micros() as u64,
            clear_us = stats.clear.as_micros() as u64,
            scene_us = stats.scene.as_micros() as u64,
            copy_us = stats.copy.as_micros() as u64,
            dirty = stats.dirty_count,
            "frame presented"
        );
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = map_key(self.controller.scene().screen, code) else {
            return;
        };
        let now = self.clock.now_ms();
        trace!(?action, now_ms = now, "key");
        if self.controller.handle(action, now) == Flow::Exit {
            self.cleanup_and_exit(event_loop);
        }
        self.request_redraw();
    }

    fn handle_mouse(&mut self, state: ElementState) {
        let now = self.clock.now_ms();
        let (x, y) = self.cursor;
        match state {
            ElementState::Pressed => self.controller.pointer_down(x, y, now),
            ElementState::Released => self.controller.pointer_up(x, y, now),
        }
        self.request_redraw();
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize renderer");
            }
        }
        self.controller.resize(new_size.width, new_size.height);
        debug!(width = new_size.width, height = new_size.height, "display resized");
        self.request_redraw();
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.controller.is_saving() {
            info!("waiting for score write");
            self.controller.finish_pending_save();
        }
        self.should_exit = true;
        event_loop.exit();
    }

    /// Green disk on transparent background, built at startup.
    fn build_icon() -> Option<Icon> {
        const SIZE: u32 = 32;
        let mut pm = Pixmap::new(SIZE, SIZE)?;
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(34, 197, 94, 255));
        paint.anti_alias = true;
        let r = SIZE as f32 * 0.5;
        let path = PathBuilder::from_circle(r, r, r - 1.0)?;
        pm.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

        let rgba: Vec<u8> = pm
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        match Icon::from_rgba(rgba, SIZE, SIZE) {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!(error = %e, "window icon rejected");
                None
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render failed");
                    self.cleanup_and_exit(event_loop);
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.handle_mouse(state),
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                debug!(scale_factor, "scale factor changed");
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }

        let now = self.clock.now_ms();
        if self.controller.tick(now) {
            self.request_redraw();
        }

        let start = self.clock.start;
        let mut wake = self
            .controller
            .next_due()
            .map(|due| start + Duration::from_secs_f64(due.max(0.0) / 1000.0));
        if self.controller.is_saving() {
            let poll = Instant::now() + SAVE_POLL;
            wake = Some(wake.map_or(poll, |at| at.min(poll)));
        }
        event_loop.set_control_flow(match wake {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }
}
