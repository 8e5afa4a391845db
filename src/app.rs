use crate::config::{self, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};
use crate::core::audio::AudioEngine;
use crate::core::clock::SystemClock;
use crate::core::effects::LogHaptics;
use crate::core::input;
use crate::game::session::{Command, Effects, Session};
use crate::screens::{ScreenAction, campanadas};
use crate::ui::confetti::ConfettiField;
use crate::ui::layout::Layout;
use crate::ui::render::{self, Frame};
use crate::utils::fps::FPSCounter;
use softbuffer::{Context, Surface};
use tiny_skia::Pixmap;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use log::{error, info, warn};
use std::{error::Error, num::NonZeroU32, sync::Arc, time::Instant};

type WindowSurface = Surface<Arc<Window>, Arc<Window>>;

pub struct App {
    window: Option<Arc<Window>>,
    surface: Option<WindowSurface>,
    pixmap: Option<Pixmap>,
    layout: Layout,
    session: Session<SystemClock>,
    audio: AudioEngine,
    haptics: LogHaptics,
    confetti: ConfettiField,
    fps: FPSCounter,
    last_fps: Option<u32>,
    last_frame_time: Instant,
    cursor: Option<(f32, f32)>,
    windowed: bool,
    rehearse_on_start: bool,
}

impl App {
    fn new(session: Session<SystemClock>, config: &config::Config, rehearse_on_start: bool) -> Self {
        let now = Instant::now();
        Self {
            window: None,
            surface: None,
            pixmap: None,
            layout: Layout::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            session,
            audio: AudioEngine::new(config.enable_audio, config.master_volume),
            haptics: LogHaptics { enabled: config.vibration },
            confetti: ConfettiField::new(),
            fps: FPSCounter::new(now),
            last_fps: None,
            last_frame_time: now,
            cursor: None,
            windowed: config.windowed,
            rehearse_on_start,
        }
    }

    fn dispatch(&mut self, command: Command, now: Instant) {
        let mut fx = Effects { sounds: &mut self.audio, haptics: &mut self.haptics, confetti: &mut self.confetti };
        if let Some(outcome) = self.session.handle(command, now, &mut fx) {
            log::debug!("{:?} -> {:?}", command, outcome);
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Ok(());
        };
        if let Some(surface) = &mut self.surface {
            surface.resize(w, h)?;
        }
        self.pixmap = Pixmap::new(width, height);
        self.layout = Layout::new(width, height);
        self.session.set_layout(self.layout);
        Ok(())
    }

    #[inline(always)]
    fn update_title(&mut self, window: &Window, now: Instant) {
        if let Some(fps) = self.fps.update(now) {
            self.last_fps = Some(fps);
        }
        if let Some(snap) = self.session.snapshot() {
            let title = campanadas::window_title(snap, self.session.board(), self.session.target_year(), self.last_fps);
            window.set_title(&title);
        }
    }

    fn draw(&mut self, now: Instant) -> Result<(), Box<dyn Error>> {
        let dt = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let snap = {
            let mut fx = Effects { sounds: &mut self.audio, haptics: &mut self.haptics, confetti: &mut self.confetti };
            self.session.tick(now, &mut fx)
        };
        self.confetti.update(dt);

        let (Some(surface), Some(pixmap)) = (&mut self.surface, &mut self.pixmap) else {
            return Ok(());
        };
        let frame = Frame {
            snap: &snap,
            board: self.session.board(),
            stage: self.session.stage(),
            confetti: self.confetti.particles(),
            year: self.session.target_year(),
            now,
        };
        render::render(pixmap, &self.layout, &frame);

        let mut buffer = surface.buffer_mut()?;
        render::copy_to_buffer(pixmap, &mut buffer);
        buffer.present()?;
        Ok(())
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let mut window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(true);
        if self.windowed {
            window_attributes = window_attributes.with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        } else {
            info!("Fullscreen: using BORDERLESS.");
            window_attributes = window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let context = Context::new(window.clone())?;
        self.surface = Some(Surface::new(&context, window.clone())?);
        let sz = window.inner_size();
        self.resize(sz.width, sz.height)?;
        self.window = Some(window);

        if self.rehearse_on_start {
            self.dispatch(Command::Rehearse, Instant::now());
        }
        info!("Starting event loop...");
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_graphics(event_loop) {
                error!("Failed to initialize graphics: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref().cloned() else { return };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested. Shutting down.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Err(e) = self.resize(new_size.width, new_size.height) {
                    warn!("Failed to resize surface: {}", e);
                }
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let Some(code) = input::pressed_key(&key_event) else { return };
                let now = Instant::now();
                // Any key counts as the gesture that unlocks audio.
                self.dispatch(Command::ResumeAudio, now);
                match campanadas::handle_key_press(code) {
                    ScreenAction::Exit => event_loop.exit(),
                    ScreenAction::Command(command) => self.dispatch(command, now),
                    ScreenAction::None => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                let now = Instant::now();
                self.dispatch(Command::ResumeAudio, now);
                let Some((x, y)) = self.cursor else { return };
                if self.session.stage().overlay().is_some() && self.layout.overlay_at(x, y) {
                    self.dispatch(Command::DismissMessage, now);
                } else if let Some(grape) = self.layout.grape_at(x, y) {
                    self.dispatch(Command::Tap(grape), now);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Err(e) = self.draw(now) {
                    error!("Failed to draw frame: {}", e);
                    event_loop.exit();
                    return;
                }
                self.update_title(&window, now);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session.shutdown();
        self.audio.dispose();
        self.surface = None;
    }
}

pub fn run(session: Session<SystemClock>, config: &config::Config, rehearse: bool) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(session, config, rehearse);
    event_loop.run_app(&mut app)?;
    Ok(())
}
