use crate::asset::decode::{LoadedAsset, decode_gltf};
use crate::asset::fetch::{AssetSource, fetch};
use crate::error::ViewerError;
use crate::scene::EnvironmentMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Exactly one `Success` or `Error` ends every load; `Progress` only comes before it.
#[derive(Debug)]
pub enum LoadResult<T> {
    Progress { loaded: u64, total: Option<u64> },
    Success(T),
    Error(ViewerError),
}

/// Completed fraction in `[0, 1]`, when the total size is known.
pub fn progress_fraction(loaded: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(total) if total > 0 => Some((loaded as f64 / total as f64).clamp(0.0, 1.0) as f32),
        _ => None,
    }
}

impl<T> LoadResult<T> {
    #[cfg(test)]
    pub fn is_final(&self) -> bool {
        !matches!(self, LoadResult::Progress { .. })
    }
}

#[derive(Debug)]
pub enum LoadMessage {
    Model(LoadResult<Box<LoadedAsset>>),
    Environment(LoadResult<EnvironmentMap>),
}

/// Starts background loads and reports back through a channel drained by
/// the event loop. Loads are detached: no cancel, no retry.
#[derive(Clone)]
pub struct AssetLoader {
    runtime: Handle,
    asset_root: String,
    sender: UnboundedSender<LoadMessage>,
}

impl AssetLoader {
    pub fn new(runtime: Handle, asset_root: impl Into<String>, sender: UnboundedSender<LoadMessage>) -> Self {
        Self {
            runtime,
            asset_root: asset_root.into(),
            sender,
        }
    }

    /// Load `<asset_root>/<name>.glb`.
    pub fn load_model(&self, name: &str) -> JoinHandle<()> {
        let source = AssetSource::resolve(&self.asset_root, &format!("{name}.glb"));
        let sender = self.sender.clone();
        let name = name.to_string();

        self.runtime.spawn(async move {
            log::info!("Loading model {} from {}", name, source);
            let progress = sender.clone();
            let result = async {
                let bytes = fetch(&source, |loaded, total| {
                    let _ = progress.send(LoadMessage::Model(LoadResult::Progress { loaded, total }));
                })
                .await?;
                tokio::task::spawn_blocking(move || decode_gltf(&bytes, &name)).await?
            }
            .await;

            let message = match result {
                Ok(asset) => LoadResult::Success(Box::new(asset)),
                Err(e) => LoadResult::Error(ViewerError::new("model-load").with_arg("source", &source).push_viewer(e)),
            };
            if sender.send(LoadMessage::Model(message)).is_err() {
                log::debug!("Model load for {} finished after the viewer closed", source);
            }
        })
    }

    /// Load an equirectangular HDR image relative to the asset root.
    pub fn load_environment(&self, relative: &str) -> JoinHandle<()> {
        let source = AssetSource::resolve(&self.asset_root, relative);
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            log::info!("Loading environment from {}", source);
            let progress = sender.clone();
            let result = async {
                let bytes = fetch(&source, |loaded, total| {
                    let _ = progress.send(LoadMessage::Environment(LoadResult::Progress { loaded, total }));
                })
                .await?;
                tokio::task::spawn_blocking(move || EnvironmentMap::decode_hdr(&bytes)).await?
            }
            .await;

            let message = match result {
                Ok(map) => LoadResult::Success(map),
                Err(e) => LoadResult::Error(
                    ViewerError::new("environment-load").with_arg("source", &source).push_viewer(e),
                ),
            };
            if sender.send(LoadMessage::Environment(message)).is_err() {
                log::debug!("Environment load from {} finished after the viewer closed", source);
            }
        })
    }
}
