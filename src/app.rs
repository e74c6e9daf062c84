use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::gallery::config::GalleryConfig;
use crate::gallery::dome::Gallery;
use crate::gallery::gesture::{PointerEvent, VelocityTracker};
use crate::gallery::ports::PointerQueue;
use crate::gallery::tiles::ImageRef;
use crate::render::engine::RenderEngine;
use crate::sim::tick::FrameClock;
use crate::ui::settings::{settings_panel, PanelOutcome, PanelStats};

/// The configured pool, kept aside while the command line overrides it so
/// that saving settings does not persist the override.
pub struct SavedPool {
    pub images: Vec<ImageRef>,
    pub image_root: Option<PathBuf>,
}

pub struct App {
    config: GalleryConfig,
    saved_pool: Option<SavedPool>,
    gallery: Gallery,
    clock: FrameClock,
    pointer: PointerQueue,
    tracker: VelocityTracker,
    pending_size: Option<(f64, f64)>,
    cursor: Option<DVec2>,
    mouse_dragging: bool,
    active_touch: Option<u64>,
    started: Instant,
    settings_open: bool,
    tiles_dirty: bool,
    engine: Option<RenderEngine>,
}

impl App {
    pub fn new(config: GalleryConfig, saved_pool: Option<SavedPool>) -> Self {
        let gallery = Gallery::new(&config);
        log::info!(
            "dome: {} tiles over {} segments from {} images",
            gallery.tiles().len(),
            gallery.segments(),
            config.images.len()
        );
        Self {
            config,
            saved_pool,
            gallery,
            clock: FrameClock::new(),
            pointer: PointerQueue::new(),
            tracker: VelocityTracker::new(),
            pending_size: None,
            cursor: None,
            mouse_dragging: false,
            active_touch: None,
            started: Instant::now(),
            settings_open: false,
            tiles_dirty: true,
            engine: None,
        }
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn scale_factor(&self) -> f64 {
        self.engine.as_ref().map_or(1.0, |e| e.gpu.window.scale_factor())
    }

    fn to_logical(&self, position: PhysicalPosition<f64>) -> DVec2 {
        let logical = position.to_logical::<f64>(self.scale_factor());
        DVec2::new(logical.x, logical.y)
    }

    fn pointer_down(&mut self, position: DVec2) {
        let t = self.now_ms();
        self.tracker.press(t, position);
        self.pointer.push(PointerEvent::Start { position });
    }

    fn pointer_move(&mut self, position: DVec2) {
        let t = self.now_ms();
        self.tracker.record(t, position);
        self.pointer.push(PointerEvent::Move { position });
    }

    fn pointer_up(&mut self, position: DVec2) {
        let t = self.now_ms();
        let release = self.tracker.release(t, position);
        self.pointer.push(PointerEvent::End { position, release });
    }

    fn toggle_settings(&mut self) {
        self.settings_open = !self.settings_open;
        if !self.settings_open {
            self.save_config();
        }
    }

    fn save_config(&self) {
        let mut persisted = self.config.clone();
        if let Some(saved) = &self.saved_pool {
            persisted.images = saved.images.clone();
            persisted.image_root = saved.image_root.clone();
        }
        persisted.save();
    }

    fn apply_panel_outcome(&mut self, outcome: PanelOutcome) {
        if outcome.changed {
            if self.gallery.reconfigure(&self.config) {
                log::info!("dome rebuilt with {} segments", self.gallery.segments());
            }
            self.tiles_dirty = true;
        }
        if outcome.closed {
            self.save_config();
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, over_panel: bool) {
        let Some(position) = self.cursor else {
            return;
        };
        match state {
            ElementState::Pressed if !over_panel && self.active_touch.is_none() => {
                self.mouse_dragging = true;
                self.pointer_down(position);
            }
            ElementState::Released if self.mouse_dragging => {
                self.mouse_dragging = false;
                self.pointer_up(position);
            }
            _ => {}
        }
    }

    fn handle_touch(&mut self, id: u64, phase: TouchPhase, position: DVec2, over_panel: bool) {
        match phase {
            TouchPhase::Started if self.active_touch.is_none() && !self.mouse_dragging && !over_panel => {
                self.active_touch = Some(id);
                self.pointer_down(position);
            }
            TouchPhase::Moved if self.active_touch == Some(id) => self.pointer_move(position),
            TouchPhase::Ended | TouchPhase::Cancelled if self.active_touch == Some(id) => {
                self.active_touch = None;
                self.pointer_up(position);
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let stats = PanelStats {
            fps: self.clock.fps,
            tps: self.clock.tps,
            rotation: self.gallery.rotation(),
            radius_px: self.gallery.style().radius_px,
            tile_count: self.gallery.tiles().len(),
            image_count: self.config.images.len(),
        };
        let window = engine.gpu.window.clone();
        let settings_open = &mut self.settings_open;
        let config = &mut self.config;
        let mut outcome = PanelOutcome::default();
        let full_output = engine.egui.run(&window, |ctx| {
            outcome = settings_panel(ctx, settings_open, config, &stats);
        });

        let frame = engine.draw_and_submit(&full_output)?;
        window.pre_present_notify();
        frame.present();

        self.apply_panel_outcome(outcome);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("domefit")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("create window"),
        );

        let logical = window.inner_size().to_logical::<f64>(window.scale_factor());
        self.pending_size = Some((logical.width, logical.height));
        self.engine = Some(RenderEngine::new(window));
        self.tiles_dirty = true;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        use winit::keyboard::{KeyCode, PhysicalKey};

        let (consumed, over_panel, wants_keyboard) = match self.engine.as_mut() {
            Some(engine) => {
                let consumed = engine.egui.on_window_event(&engine.gpu.window, &event);
                (consumed, engine.egui.is_pointer_over_panel(), engine.egui.wants_keyboard_input())
            }
            None => (false, false, false),
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let scale = self.scale_factor();
                if let Some(engine) = &mut self.engine {
                    engine.resize(new_size.width, new_size.height);
                }
                let logical = new_size.to_logical::<f64>(scale);
                self.pending_size = Some((logical.width, logical.height));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if wants_keyboard || !event.state.is_pressed() || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                    self.toggle_settings();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = self.to_logical(position);
                self.cursor = Some(position);
                if self.mouse_dragging {
                    self.pointer_move(position);
                }
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.handle_mouse_button(state, consumed || over_panel);
            }
            WindowEvent::Touch(touch) => {
                let position = self.to_logical(touch.location);
                self.handle_touch(touch.id, touch.phase, position, consumed || over_panel);
            }
            WindowEvent::RedrawRequested => match self.render_frame() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    if let Some(engine) = &self.engine {
                        engine.gpu.surface.configure(&engine.gpu.device, &engine.gpu.config);
                    }
                }
                Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                Err(e) => log::error!("render error: {e:?}"),
            },
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let ticks = self.clock.advance();
        let size = self.pending_size.take();
        let output = self.gallery.frame(&size, &mut self.pointer, ticks);
        if output.layout_changed {
            log::debug!("layout: radius {}px, padding {}px", output.style.radius_px, output.style.padding_px);
        }

        let Some(engine) = &mut self.engine else {
            return;
        };
        if output.layout_changed || self.tiles_dirty {
            engine.rebuild_tiles(self.gallery.tiles(), self.gallery.segments(), output.style.radius_px, &self.config);
            self.tiles_dirty = false;
        }
        engine.update_globals(&output.transform, &output.style);
        engine.gpu.window.request_redraw();
    }
}
