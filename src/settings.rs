use crate::CONFY_APP_NAME;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory or `http(s)://` base the model and environment map are resolved against.
    pub asset_root: String,
    /// Model file stem, `<asset_root>/<model>.glb`.
    pub model: String,
    pub environment: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            model: "knight".to_string(),
            environment: "hdr/venice_sunset_1k.hdr".to_string(),
        }
    }
}

impl AssetSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "assets").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub background: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub hemisphere_sky: [f32; 3],
    pub hemisphere_ground: [f32; 3],
    pub hemisphere_intensity: f32,
    pub sun_color: [f32; 3],
    pub sun_intensity: f32,
    pub sun_position: [f32; 3],
    pub environment_intensity: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: hex_rgb(0x505050),
            fov_degrees: 50.0,
            near: 0.1,
            far: 1000.0,
            camera_position: [0.0, 1.6, 3.0],
            camera_target: [0.0, 1.0, 0.0],
            hemisphere_sky: hex_rgb(0x606060),
            hemisphere_ground: hex_rgb(0x404040),
            hemisphere_intensity: 1.0,
            sun_color: hex_rgb(0xffffff),
            sun_intensity: 3.0,
            sun_position: [1.0, 1.0, 1.0],
            environment_intensity: 1.0,
        }
    }
}

impl SceneSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "scene").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    /// Button labels, passed verbatim as action names.
    pub buttons: Vec<String>,
    pub initial_action: String,
    pub terminal_action: String,
    pub crossfade_seconds: f32,
    /// Source clip name -> exposed action name.
    pub renames: Vec<(String, String)>,
    /// Root child of the loaded model to hide once loaded.
    pub hidden_child: Option<usize>,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            buttons: ["Idle", "Walk", "Attack", "Die"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            initial_action: "Idle".to_string(),
            terminal_action: crate::animation::TERMINAL_ACTION.to_string(),
            crossfade_seconds: crate::animation::CROSSFADE_SECONDS,
            renames: vec![
                ("Look Around".to_string(), "Idle".to_string()),
                ("Walking".to_string(), "Walk".to_string()),
            ],
            hidden_child: Some(1),
        }
    }
}

impl ActionSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "actions").unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub show_stats: bool,
    pub window_size: [u32; 2],
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_stats: true,
            window_size: [1200, 800],
        }
    }
}

impl UiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "ui").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "ui", self) {
            log::warn!("Failed to store ui settings: {}", e);
        }
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub assets: AssetSettings,
    pub scene: SceneSettings,
    pub actions: ActionSettings,
    pub ui: UiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            assets: AssetSettings::load(),
            scene: SceneSettings::load(),
            actions: ActionSettings::load(),
            ui: UiSettings::load(),
        }
    }
}

/// `0xRRGGBB` to an sRGB float triple.
pub fn hex_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_setup() {
        let settings = Settings::default();
        assert_eq!(settings.actions.hidden_child, Some(1));
        assert_eq!(settings.actions.crossfade_seconds, 0.5);
        assert_eq!(settings.actions.buttons.len(), 4);
        assert_eq!(settings.scene.fov_degrees, 50.0);
    }

    #[test]
    fn hex_colours_split_into_channels() {
        assert_eq!(hex_rgb(0xffffff), [1.0, 1.0, 1.0]);
        let grey = hex_rgb(0x505050);
        assert!((grey[0] - 80.0 / 255.0).abs() < 1e-6);
        assert_eq!(grey[0], grey[2]);
    }
}
