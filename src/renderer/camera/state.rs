use nalgebra_glm as glm;

/// Perspective camera orbiting a target, Y up.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: [f32; 3],
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_distance: f32,
    pub default_target: [f32; 3],
}

impl CameraState {
    pub fn new(yaw: f32, pitch: f32, distance: f32, target: [f32; 3]) -> Self {
        Self {
            yaw,
            pitch,
            distance,
            target,
            fov_y: 50.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
            default_yaw: yaw,
            default_pitch: pitch,
            default_distance: distance,
            default_target: target,
        }
    }

    /// Orbit parameters that put the eye at `position` looking at `target`.
    pub fn looking_at(position: [f32; 3], target: [f32; 3]) -> Self {
        let offset = glm::vec3(
            position[0] - target[0],
            position[1] - target[1],
            position[2] - target[2],
        );
        let distance = glm::length(&offset).max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(yaw, pitch, distance, target)
    }

    pub fn with_projection(mut self, fov_degrees: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_degrees.to_radians();
        self.near = near;
        self.far = far;
        self
    }

    /// Update the aspect ratio from a surface size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn eye(&self) -> glm::Vec3 {
        glm::vec3(
            self.target[0] + self.distance * self.pitch.cos() * self.yaw.sin(),
            self.target[1] + self.distance * self.pitch.sin(),
            self.target[2] + self.distance * self.pitch.cos() * self.yaw.cos(),
        )
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        let center = glm::vec3(self.target[0], self.target[1], self.target[2]);
        glm::look_at_rh(&self.eye(), &center, &glm::vec3(0.0, 1.0, 0.0))
    }

    pub fn projection_matrix(&self) -> glm::Mat4 {
        glm::perspective_rh_zo(self.aspect, self.fov_y, self.near, self.far)
    }

    pub fn view_proj(&self) -> glm::Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn reset(&mut self) {
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.distance = self.default_distance;
        self.target = self.default_target;
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::looking_at([0.0, 1.6, 3.0], [0.0, 1.0, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_round_trips_the_eye() {
        let camera = CameraState::looking_at([0.0, 1.6, 3.0], [0.0, 1.0, 0.0]);
        let eye = camera.eye();
        assert!((eye.x - 0.0).abs() < 1e-5);
        assert!((eye.y - 1.6).abs() < 1e-5);
        assert!((eye.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn viewport_sets_aspect_and_ignores_zero() {
        let mut camera = CameraState::default();
        camera.set_viewport(1600, 800);
        assert_eq!(camera.aspect, 2.0);
        camera.set_viewport(0, 800);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut camera = CameraState::default();
        camera.set_viewport(1200, 800);
        let clip = camera.view_proj() * glm::vec4(0.0, 1.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }
}
