use glam::{Mat4, Vec3};
use tileworld_render::Camera;

/// Camera that trails a target on the ground from a fixed offset.
/// Camera motion is not part of the world model; it lives with the shell.
pub struct FollowCamera {
    pub target: Vec3,
    /// Eye position relative to the target.
    pub offset: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            offset: Vec3::new(0.0, 7.0, 9.0),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl FollowCamera {
    pub fn eye(&self) -> Vec3 {
        self.target + self.offset
    }

    /// Track a ground-plane point (`x`, `depth`).
    pub fn follow(&mut self, x: f32, depth: f32) {
        self.target = Vec3::new(x, 0.0, depth);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Camera for FollowCamera {
    fn view(&self) -> Mat4 {
        self.view_matrix()
    }

    fn projection(&self) -> Mat4 {
        self.projection_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = FollowCamera::default();
        assert!(cam.eye().y > 0.0);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn follow_moves_eye_with_target() {
        let mut cam = FollowCamera::default();
        cam.follow(4.0, 6.0);
        assert_eq!(cam.target, Vec3::new(4.0, 0.0, 6.0));
        assert_eq!(cam.eye(), Vec3::new(4.0, 0.0, 6.0) + cam.offset);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let mut cam = FollowCamera::default();
        cam.follow(10.0, 3.0);
        let clip = cam.view_projection() * cam.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
    }

    #[test]
    fn viewport_sets_aspect_and_ignores_zero_height() {
        let mut cam = FollowCamera::default();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }
}
