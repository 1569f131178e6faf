use crate::app::app::App;
use crate::asset::{AssetLoader, LoadMessage};
use crate::settings::Settings;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

pub struct AppHandler {
    pub app: Option<App>,
    settings: Settings,
    runtime: Runtime,
    load_sender: UnboundedSender<LoadMessage>,
    load_receiver: UnboundedReceiver<LoadMessage>,
}

impl AppHandler {
    pub fn new(settings: Settings, runtime: Runtime) -> Self {
        let (load_sender, load_receiver) = mpsc::unbounded_channel();
        Self {
            app: None,
            settings,
            runtime,
            load_sender,
            load_receiver,
        }
    }

    fn start_loads(&self) {
        let loader = AssetLoader::new(
            self.runtime.handle().clone(),
            self.settings.assets.asset_root.clone(),
            self.load_sender.clone(),
        );
        // fire and forget; results come back through the channel
        drop(loader.load_environment(&self.settings.assets.environment));
        drop(loader.load_model(&self.settings.assets.model));
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let [width, height] = self.settings.ui.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(format!("glbvis-rs - {}", self.settings.assets.model))
            .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(App::new(window, self.settings.clone())) {
            Ok(app) => {
                self.app = Some(app);
                self.start_loads();
            }
            Err(e) => {
                log::error!("Failed to initialise renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            while let Ok(message) = self.load_receiver.try_recv() {
                app.handle_load(message);
            }

            match app.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    log::debug!("Surface lost, reconfiguring");
                    let size = app.window.inner_size();
                    app.handle_event(&WindowEvent::Resized(size));
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
            app.window.request_redraw();
        }
    }
}
