use glam::{Mat4, Quat, Vec3, Vec4};

use super::picking::{Aabb, Ray};

/// Arc-ball camera for 3D viewport
#[derive(Clone, Debug)]
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: 0.6,
            pitch: 0.5,
            distance: 18.0,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 500.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        let offset = right * dx + up * dy;
        self.target += offset;
    }

    /// Center the target on a model and back off far enough to see all of it
    pub fn frame(&mut self, bounds: &Aabb) {
        self.target = bounds.center();
        let radius = (bounds.diagonal() * 0.5).max(0.5);
        self.distance = (radius / (self.fov * 0.5).tan() * 1.2).clamp(0.5, 500.0);
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// Camera rotation in world space; labels copy it to face the viewer
    pub fn orientation(&self) -> Quat {
        let (_, rotation, _) = self.view_matrix().inverse().to_scale_rotation_translation();
        rotation
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let far = (self.distance * 10.0).max(200.0);
        Mat4::perspective_rh_gl(self.fov, aspect, 0.05, far)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        let right = self.right_vector();
        right.cross(fwd).normalize_or_zero()
    }

    /// Project a 3D point to 2D screen coords (for overlay text)
    pub fn project(&self, point: Vec3, rect: egui::Rect) -> Option<egui::Pos2> {
        let aspect = rect.width() / rect.height();
        let vp = self.view_projection(aspect);
        let p = vp * point.extend(1.0);
        if p.w <= 0.0 {
            return None;
        }
        let ndc = p.truncate() / p.w;
        let screen_x = rect.center().x + ndc.x * rect.width() * 0.5;
        let screen_y = rect.center().y - ndc.y * rect.height() * 0.5;
        Some(egui::pos2(screen_x, screen_y))
    }

    /// Ray through normalized device coordinates (-1..1 on both axes)
    pub fn ndc_ray(&self, ndc_x: f32, ndc_y: f32, aspect: f32) -> Ray {
        let vp_inv = self.view_projection(aspect).inverse();

        let near_world = vp_inv * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far_world = vp_inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let near = near_world.truncate() / near_world.w;
        let far = far_world.truncate() / far_world.w;

        Ray::new(self.eye_position(), far - near)
    }

    /// Cast a ray from a screen position into the 3D scene
    pub fn screen_ray(&self, screen_pos: egui::Pos2, rect: egui::Rect) -> Ray {
        let aspect = rect.width() / rect.height();

        // Screen → NDC
        let ndc_x = (screen_pos.x - rect.center().x) / (rect.width() * 0.5);
        let ndc_y = -(screen_pos.y - rect.center().y) / (rect.height() * 0.5);

        self.ndc_ray(ndc_x, ndc_y, aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_hits_target() {
        let cam = ArcBallCamera::new();
        let ray = cam.ndc_ray(0.0, 0.0, 1.5);
        let to_target = (cam.target - ray.origin).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_orientation_looks_at_target() {
        let cam = ArcBallCamera::new();
        let forward = cam.orientation() * Vec3::NEG_Z;
        let expected = (cam.target - cam.eye_position()).normalize();
        assert!(forward.dot(expected) > 0.999);
    }

    #[test]
    fn test_frame_centers_on_bounds() {
        let mut cam = ArcBallCamera::new();
        let bounds = Aabb { min: Vec3::new(2.0, 0.0, 2.0), max: Vec3::new(6.0, 2.0, 4.0) };
        cam.frame(&bounds);
        assert_eq!(cam.target, Vec3::new(4.0, 1.0, 3.0));
        assert!(cam.distance > bounds.diagonal() * 0.5);
    }

    #[test]
    fn test_project_target_is_rect_center() {
        let cam = ArcBallCamera::new();
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        let p = cam.project(cam.target, rect).unwrap();
        assert!((p.x - 400.0).abs() < 0.5 && (p.y - 300.0).abs() < 0.5);
    }
}
