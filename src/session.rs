use crate::animation::{ActionController, AnimationMixer, Transition};
use crate::asset::{LoadMessage, LoadResult, LoadedAsset, progress_fraction};
use crate::frame::{FrameDriver, FrameStats, FrameTick};
use crate::renderer::camera::CameraController;
use crate::scene::{EnvironmentMap, Scene};
use crate::settings::{ActionSettings, SceneSettings};

/// Model loading as seen by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingState {
    Pending { fraction: Option<f32> },
    Ready,
    Failed(String),
}

/// All state of one viewer: scene, camera, animation and frame driving.
/// Created once at startup and owned by the app.
pub struct ViewerSession {
    pub scene: Scene,
    pub camera: CameraController,
    actions: Option<ActionController>,
    mixer: Option<AnimationMixer>,
    model: Option<usize>,
    loading: LoadingState,
    driver: FrameDriver,
    stats: FrameStats,
    settings: ActionSettings,
}

impl ViewerSession {
    pub fn new(scene_settings: &SceneSettings, settings: ActionSettings, width: u32, height: u32) -> Self {
        let (scene, camera) = crate::scene::bootstrap(scene_settings, width, height);
        Self {
            scene,
            camera,
            actions: None,
            mixer: None,
            model: None,
            loading: LoadingState::Pending { fraction: None },
            driver: FrameDriver::default(),
            stats: FrameStats::default(),
            settings,
        }
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn buttons(&self) -> &[String] {
        &self.settings.buttons
    }

    pub fn current_action(&self) -> Option<&str> {
        self.actions.as_ref().and_then(|a| a.current_name())
    }

    /// Running actions and the weight each contributed to the last frame.
    pub fn blend(&self) -> Vec<(&str, f32)> {
        self.mixer
            .iter()
            .flat_map(|m| m.running_actions())
            .map(|(_, action)| (action.name(), action.effective_weight()))
            .collect()
    }

    #[cfg(test)]
    pub fn actions(&self) -> Option<&ActionController> {
        self.actions.as_ref()
    }

    #[cfg(test)]
    pub fn model_index(&self) -> Option<usize> {
        self.model
    }

    pub fn handle_load(&mut self, message: LoadMessage) {
        match message {
            LoadMessage::Model(LoadResult::Progress { loaded, total }) => {
                if let LoadingState::Pending { fraction } = &mut self.loading {
                    *fraction = progress_fraction(loaded, total);
                }
            }
            LoadMessage::Model(LoadResult::Success(asset)) => self.install(*asset),
            LoadMessage::Model(LoadResult::Error(e)) => {
                log::error!("Failed to load model: {}", e);
                if self.model.is_none() {
                    self.loading = LoadingState::Failed(e.to_string());
                }
            }
            LoadMessage::Environment(LoadResult::Progress { .. }) => {}
            LoadMessage::Environment(LoadResult::Success(map)) => self.install_environment(map),
            LoadMessage::Environment(LoadResult::Error(e)) => {
                log::warn!("Environment map unavailable: {}", e);
            }
        }
    }

    fn install(&mut self, asset: LoadedAsset) {
        if self.model.is_some() {
            log::warn!("Ignoring second model {}: one model per viewer", asset.model.name);
            return;
        }

        let LoadedAsset { mut model, clips } = asset;
        let actions = ActionController::from_clips(clips, &self.settings.renames)
            .with_crossfade(self.settings.crossfade_seconds)
            .with_terminal(self.settings.terminal_action.clone());
        log::info!("Actions available: {:?}", actions.names());

        if let Some(index) = self.settings.hidden_child {
            match model.hide_root_child(index).map(str::to_string) {
                Some(hidden) => log::info!("Hiding root child {} ({})", index, hidden),
                None => log::debug!("{} has no root child {} to hide", model.name, index),
            }
        }

        let mixer = AnimationMixer::new(&model);
        self.model = Some(self.scene.add(model));
        self.actions = Some(actions);
        self.mixer = Some(mixer);
        self.loading = LoadingState::Ready;

        let initial = self.settings.initial_action.clone();
        self.set_action(&initial);
        self.driver.start();
    }

    fn install_environment(&mut self, map: EnvironmentMap) {
        log::info!("Environment map {}x{} installed", map.width, map.height);
        self.scene.environment = Some(map);
    }

    /// Play the action named `name`. `None` while no model is loaded.
    pub fn set_action(&mut self, name: &str) -> Option<Transition> {
        let (actions, mixer) = (self.actions.as_mut()?, self.mixer.as_mut()?);
        let transition = actions.set_action(name, mixer);
        match &transition {
            Transition::Unknown => log::debug!("No action named {:?}", name),
            Transition::Unchanged => {}
            Transition::Started => log::info!("Playing {}", name),
            Transition::CrossFaded { from } => log::info!("Cross-fading {} -> {}", from, name),
        }
        Some(transition)
    }

    /// Advance one frame. `None` means nothing may be rendered yet.
    pub fn frame(&mut self, delta: f32) -> Option<FrameTick> {
        let tick = self.driver.tick(delta)?;
        if let (Some(mixer), Some(model)) = (
            self.mixer.as_mut(),
            self.model.and_then(|i| self.scene.models.get_mut(i)),
        ) {
            mixer.update(delta, model);
        }
        self.stats.record(tick);
        Some(tick)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.state_mut().set_viewport(width, height);
    }
}
