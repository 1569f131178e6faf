pub mod decode;
pub mod fetch;
pub mod loader;

pub use decode::LoadedAsset;
pub use loader::{AssetLoader, LoadMessage, LoadResult, progress_fraction};
