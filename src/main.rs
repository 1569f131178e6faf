use winit::event_loop::{ControlFlow, EventLoop};

mod animation;
mod app;
mod asset;
mod error;
mod frame;
mod model;
mod renderer;
mod scene;
mod session;
mod settings;
mod ui;

pub const CONFY_APP_NAME: &str = "glbvis-rs";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut settings = settings::Settings::load();

    // Optional model name: `glbvis-rs <name>` loads `<asset_root>/<name>.glb`
    if let Some(model) = std::env::args().nth(1) {
        settings.assets.model = model;
    }
    log::info!(
        "Viewing {}/{}.glb",
        settings.assets.asset_root,
        settings.assets.model
    );

    let runtime = tokio::runtime::Runtime::new()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = app::handler::AppHandler::new(settings, runtime);
    event_loop.run_app(&mut handler)?;

    Ok(())
}
