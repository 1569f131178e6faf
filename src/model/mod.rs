mod mesh;
mod skin;
pub mod model;

pub use mesh::*;
pub use model::{Model, Node};
pub use skin::*;
