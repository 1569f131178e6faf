use crate::asset::LoadMessage;
use crate::error::ViewerError;
use crate::frame::FrameClock;
use crate::renderer::{Overlay, Renderer};
use crate::session::ViewerSession;
use crate::settings::Settings;
use crate::ui::{Ui, UiResponse};
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use std::sync::Arc;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

impl EventResponse {
    fn handled(repaint: bool) -> Self {
        Self {
            repaint,
            exit: false,
        }
    }

    fn exit() -> Self {
        Self {
            repaint: false,
            exit: true,
        }
    }
}

pub struct App {
    pub window: Arc<Window>,
    ui: Ui,
    renderer: Renderer,
    session: ViewerSession,
    clock: FrameClock,
    egui_state: State,
    egui_wants_pointer: bool,
    settings: Settings,
}

impl App {
    pub async fn new(window: Arc<Window>, settings: Settings) -> Result<Self, ViewerError> {
        let renderer = Renderer::new(Arc::clone(&window)).await?;

        let egui_ctx = renderer.egui_context();
        let egui_state = State::new(
            egui_ctx,
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let (width, height) = renderer.size();
        let session = ViewerSession::new(&settings.scene, settings.actions.clone(), width, height);

        Ok(Self {
            window,
            ui: Ui::new(settings.assets.model.clone()),
            renderer,
            session,
            clock: FrameClock::new(),
            egui_state,
            egui_wants_pointer: false,
            settings,
        })
    }

    pub fn handle_load(&mut self, message: LoadMessage) {
        self.session.handle_load(message);
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);

        match event {
            WindowEvent::CloseRequested => return EventResponse::exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_response.consumed || event.state != ElementState::Pressed {
                    return EventResponse::handled(egui_response.repaint);
                }
                match &event.logical_key {
                    Key::Named(NamedKey::Escape) => return EventResponse::exit(),
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => {
                        self.session.camera.reset();
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.session.resize(size.width, size.height);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.session.camera.on_modifiers(modifiers.state().shift_key());
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                // releases always reach the camera so a drag never sticks
                if pressed && self.egui_wants_pointer {
                    return EventResponse::handled(egui_response.repaint);
                }
                self.session.camera.on_mouse_button(*button, pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.egui_wants_pointer {
                    return EventResponse::handled(egui_response.repaint);
                }
                self.session.camera.on_mouse_move((position.x, position.y));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if self.egui_wants_pointer {
                    return EventResponse::handled(egui_response.repaint);
                }
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.session.camera.simple_zoom(*y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        self.session.camera.simple_zoom(pos.y as f32 * 0.05)
                    }
                }
            }
            _ => {}
        }

        EventResponse::handled(egui_response.repaint)
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let delta = self.clock.delta();
        let tick = self.session.frame(delta);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();

        let mut response = UiResponse::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            response = self.ui.show(ctx, &self.session, &mut self.settings.ui);
        });
        self.egui_wants_pointer = egui_ctx.wants_pointer_input();

        let UiResponse {
            action,
            reset_camera,
        } = response;
        if let Some(name) = action {
            self.session.set_action(&name);
        }
        if reset_camera {
            self.session.camera.reset();
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = self.renderer.size();
        let overlay = Overlay {
            paint_jobs,
            textures_delta: full_output.textures_delta,
            screen: ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point: full_output.pixels_per_point,
            },
        };

        match tick {
            Some(_) => self
                .renderer
                .render_scene(&self.session.scene, self.session.camera.state(), overlay),
            None => self.renderer.render_overlay(&self.session.scene, overlay),
        }
    }
}
