pub mod camera;
pub mod renderer;
pub mod skinning;
pub mod vertex;

pub use renderer::{Overlay, Renderer};
