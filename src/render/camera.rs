use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::config::ViewerConfig;

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, config.eye_height, 0.0),
            target: Vec3::new(0.0, config.eye_height, config.look_radius),
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..Self::default()
        };
        camera.update_projection();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Rebuilds the cached projection after `fov`, `aspect`, `near` or `far` change.
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }
}

/// First-person look control: dragging turns the view around a fixed eye.
///
/// `theta` is the horizontal angle and wraps through the trig functions;
/// `phi` is the vertical angle and is kept within [-π/2, π/2].
pub struct LookController {
    pub theta: f32,
    pub phi: f32,
    pub sensitivity: f32,
    pub radius: f32,
    pub eye_height: f32,
    /// Last pointer position while a drag is in progress.
    drag: Option<Vec2>,
}

impl Default for LookController {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl LookController {
    pub const MIN_PHI: f32 = -FRAC_PI_2;
    pub const MAX_PHI: f32 = FRAC_PI_2;

    pub fn new(sensitivity: f32, radius: f32, eye_height: f32) -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            sensitivity,
            radius,
            eye_height,
            drag: None,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.sensitivity, config.look_radius, config.eye_height)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.drag
    }

    pub fn on_pointer_down(&mut self, position: Vec2) {
        self.drag = Some(position);
    }

    pub fn on_pointer_move(&mut self, position: Vec2) {
        let Some(last) = self.drag else {
            return;
        };

        let delta = position - last;
        self.theta -= delta.x * self.sensitivity;
        self.phi = (self.phi - delta.y * self.sensitivity).clamp(Self::MIN_PHI, Self::MAX_PHI);
        self.drag = Some(position);
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(0.0, self.eye_height, 0.0)
    }

    pub fn look_target(&self) -> Vec3 {
        look_target(self.theta, self.phi, self.radius, self.eye_height)
    }

    pub fn update_camera(&self, camera: &mut Camera) {
        camera.position = self.eye_position();
        camera.look_at(self.look_target());
    }

    pub fn reset(&mut self) {
        self.theta = 0.0;
        self.phi = 0.0;
        self.drag = None;
    }
}

/// Point on the sphere of `radius` around the eye, lifted by `base_height`.
pub fn look_target(theta: f32, phi: f32, radius: f32, base_height: f32) -> Vec3 {
    let x = radius * theta.sin() * phi.cos();
    let y = radius * phi.sin() + base_height;
    let z = radius * theta.cos() * phi.cos();
    Vec3::new(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn level_gaze_looks_down_positive_z() {
        let target = look_target(0.0, 0.0, 5.0, 30.0);
        assert!((target - Vec3::new(0.0, 30.0, 5.0)).length() < EPS);
    }

    #[test]
    fn quarter_turn_looks_down_positive_x() {
        let target = look_target(FRAC_PI_2, 0.0, 5.0, 30.0);
        assert!((target - Vec3::new(5.0, 30.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut controller = LookController::default();
        controller.on_pointer_move(Vec2::new(120.0, -40.0));
        assert_eq!(controller.theta, 0.0);
        assert_eq!(controller.phi, 0.0);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn drag_accumulates_scaled_deltas() {
        let mut controller = LookController::default();
        controller.on_pointer_down(Vec2::new(100.0, 100.0));
        controller.on_pointer_move(Vec2::new(110.0, 95.0));
        controller.on_pointer_move(Vec2::new(130.0, 95.0));

        assert!((controller.theta - -0.3).abs() < EPS);
        assert!((controller.phi - 0.05).abs() < EPS);
        assert_eq!(controller.last_position(), Some(Vec2::new(130.0, 95.0)));
    }

    #[test]
    fn vertical_angle_is_clamped() {
        let mut controller = LookController::default();
        controller.on_pointer_down(Vec2::ZERO);
        controller.on_pointer_move(Vec2::new(0.0, -10_000.0));
        assert_eq!(controller.phi, LookController::MAX_PHI);

        controller.on_pointer_move(Vec2::new(0.0, 10_000.0));
        assert_eq!(controller.phi, LookController::MIN_PHI);
    }

    #[test]
    fn release_stops_rotation() {
        let mut controller = LookController::default();
        controller.on_pointer_down(Vec2::ZERO);
        controller.on_pointer_up();
        controller.on_pointer_move(Vec2::new(50.0, 50.0));
        assert_eq!(controller.theta, 0.0);
        assert_eq!(controller.last_position(), None);
    }

    #[test]
    fn second_down_refreshes_anchor() {
        let mut controller = LookController::default();
        controller.on_pointer_down(Vec2::ZERO);
        controller.on_pointer_down(Vec2::new(10.0, 0.0));
        controller.on_pointer_move(Vec2::new(10.0, 0.0));
        assert_eq!(controller.theta, 0.0);
    }

    #[test]
    fn controller_orients_camera() {
        let controller = LookController::new(0.01, 5.0, 30.0);
        let mut camera = Camera::new();
        controller.update_camera(&mut camera);
        assert_eq!(camera.position, Vec3::new(0.0, 30.0, 0.0));
        assert!((camera.forward() - Vec3::Z).length() < EPS);
    }

    #[test]
    fn projection_follows_aspect_only_after_update() {
        let mut camera = Camera::new();
        let before = camera.projection_matrix();
        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), before);
        camera.update_projection();
        assert_ne!(camera.projection_matrix(), before);
    }
}
