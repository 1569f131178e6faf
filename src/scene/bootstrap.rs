use super::{DirectionalLight, HemisphereLight, Scene};
use crate::renderer::camera::{CameraController, CameraState};
use crate::settings::SceneSettings;

/// Build the empty lit scene and the orbit camera. Runs once at startup;
/// the environment map and the model arrive later.
pub fn bootstrap(settings: &SceneSettings, width: u32, height: u32) -> (Scene, CameraController) {
    let mut camera = CameraState::looking_at(settings.camera_position, settings.camera_target)
        .with_projection(settings.fov_degrees, settings.near, settings.far);
    camera.set_viewport(width, height);

    let scene = Scene {
        background: settings.background,
        hemisphere: HemisphereLight {
            sky: settings.hemisphere_sky,
            ground: settings.hemisphere_ground,
            intensity: settings.hemisphere_intensity,
        },
        sun: DirectionalLight::from_position(
            settings.sun_color,
            settings.sun_intensity,
            settings.sun_position,
        ),
        environment: None,
        environment_intensity: settings.environment_intensity,
        models: Vec::new(),
    };

    log::debug!(
        "Scene ready: camera distance {:.2}, aspect {:.3}",
        camera.distance,
        camera.aspect
    );

    (scene, CameraController::new(camera))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_uses_viewer_defaults() {
        let (scene, camera) = bootstrap(&SceneSettings::default(), 1200, 800);
        assert!(scene.models.is_empty());
        assert!(scene.environment.is_none());
        assert_eq!(scene.sun.intensity, 3.0);

        let d = 1.0 / 3.0_f32.sqrt();
        for c in scene.sun.direction {
            assert!((c - d).abs() < 1e-6);
        }

        let state = camera.state();
        assert_eq!(state.aspect, 1.5);
        assert!((state.fov_y - 50.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(state.target, [0.0, 1.0, 0.0]);
    }
}
