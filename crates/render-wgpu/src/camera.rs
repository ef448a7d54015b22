use blockfield_render::RenderView;
use glam::{Mat4, Vec3};

const MIN_POLAR: f32 = 1e-3;
const MAX_POLAR: f32 = std::f32::consts::PI - 1e-3;

/// Orbit camera with inertial damping.
///
/// The camera sits on a sphere around `target`. Rotate, pan and zoom inputs
/// accumulate into pending deltas; each `update` applies a fraction of them
/// and keeps the rest, so motion eases out after the input stops.
/// Camera motion lives outside the session and never affects it.
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    pub azimuth: f32,
    /// Angle from +Y.
    pub polar: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_view(&RenderView::default())
    }
}

impl OrbitCamera {
    /// Start from an eye/target pair.
    pub fn from_view(view: &RenderView) -> Self {
        let offset = view.eye - view.target;
        let radius = offset.length().max(1e-3);
        Self {
            target: view.target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            fov: view.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            damping: 0.05,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            min_radius: 0.5,
            max_radius: 200.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_zoom: 0.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    /// Queue a rotation from a mouse drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_azimuth -= dx * self.rotate_speed;
        self.pending_polar -= dy * self.rotate_speed;
    }

    /// Queue a pan from a mouse drag in pixels, in the camera's screen plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        // Scale so the point under the cursor roughly follows it.
        let scale = self.radius * (self.fov * 0.5).tan() * 0.002;
        self.pending_pan += (-right * dx + up * dy) * scale;
    }

    /// Queue a zoom from scroll lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.pending_zoom += lines * self.zoom_speed;
    }

    /// Apply a damped share of the pending input.
    pub fn update(&mut self) {
        let d = self.damping;
        self.azimuth += self.pending_azimuth * d;
        self.polar = (self.polar + self.pending_polar * d).clamp(MIN_POLAR, MAX_POLAR);
        self.target += self.pending_pan * d;
        self.radius = (self.radius * (1.0 - self.pending_zoom * d))
            .clamp(self.min_radius, self.max_radius);

        let keep = 1.0 - d;
        self.pending_azimuth *= keep;
        self.pending_polar *= keep;
        self.pending_pan *= keep;
        self.pending_zoom *= keep;
    }

    /// Whether any queued motion is still being applied.
    pub fn is_moving(&self) -> bool {
        self.pending_azimuth.abs() > 1e-5
            || self.pending_polar.abs() > 1e-5
            || self.pending_pan.length_squared() > 1e-10
            || self.pending_zoom.abs() > 1e-5
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

    /// Snapshot as a renderer-agnostic view.
    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.eye(),
            target: self.target,
            fov_degrees: self.fov.to_degrees(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_matches_view() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert!((eye - Vec3::new(0.0, 5.0, 10.0)).length() < 1e-4);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn rotation_eases_out() {
        let mut cam = OrbitCamera::default();
        let start = cam.azimuth;
        cam.rotate(100.0, 0.0);
        cam.update();
        let first_step = (cam.azimuth - start).abs();
        let after_first = cam.azimuth;
        cam.update();
        let second_step = (cam.azimuth - after_first).abs();
        assert!(first_step > 0.0);
        assert!(second_step < first_step);
        assert!(cam.is_moving());
    }

    #[test]
    fn damping_settles() {
        let mut cam = OrbitCamera::default();
        cam.rotate(50.0, 20.0);
        cam.zoom(1.0);
        for _ in 0..1000 {
            cam.update();
        }
        assert!(!cam.is_moving());
    }

    #[test]
    fn rotation_keeps_radius() {
        let mut cam = OrbitCamera::default();
        let r = cam.radius;
        cam.rotate(300.0, -40.0);
        for _ in 0..50 {
            cam.update();
        }
        assert!(((cam.eye() - cam.target).length() - r).abs() < 1e-3);
    }

    #[test]
    fn polar_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 1e6);
        for _ in 0..10 {
            cam.update();
        }
        assert!(cam.polar >= MIN_POLAR && cam.polar <= MAX_POLAR);
    }

    #[test]
    fn zoom_in_moves_closer() {
        let mut cam = OrbitCamera::default();
        let r = cam.radius;
        cam.zoom(2.0);
        cam.update();
        assert!(cam.radius < r);
    }

    #[test]
    fn pan_moves_target() {
        let mut cam = OrbitCamera::default();
        cam.pan(100.0, 0.0);
        cam.update();
        assert_ne!(cam.target, Vec3::ZERO);
    }
}
