//! Platform-independent viewer state.
//!
//! Both the browser entry point and the native binary own one [`Viewer`] and
//! forward window events to it; GPU work stays with the caller.

use winit::event::WindowEvent;

use crate::config::ViewerConfig;
use crate::input::{PointerInput, PointerTracker};
use crate::math::Transform;
use crate::render::{Camera, Lighting, LookController, MeshData, Scene};

pub struct Viewer {
    config: ViewerConfig,
    camera: Camera,
    controller: LookController,
    pointer: PointerTracker,
    scene: Scene,
    viewport: (u32, u32),
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let camera = Camera::from_config(&config);
        let controller = LookController::from_config(&config);
        Self {
            config,
            camera,
            controller,
            pointer: PointerTracker::new(),
            scene: Scene::new(Lighting::default()),
            viewport: (0, 0),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller(&self) -> &LookController {
        &self.controller
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Feeds pointer and touch events to the look controller. Returns whether
    /// the event was pointer input.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match self.pointer.translate(event) {
            Some(input) => {
                self.apply(input);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, input: PointerInput) {
        match input {
            PointerInput::Down(pos) => {
                log::trace!("pointer down at {:?}", pos);
                self.controller.on_pointer_down(pos);
            }
            PointerInput::Move(pos) => {
                if self.controller.is_dragging() {
                    log::trace!("pointer drag to {:?}", pos);
                }
                self.controller.on_pointer_move(pos);
            }
            PointerInput::Up => self.controller.on_pointer_up(),
        }
    }

    pub fn reset_view(&mut self) {
        self.controller.reset();
    }

    /// Matches the camera projection to a new viewport size. Zero sizes and
    /// repeats of the current size are ignored; returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || self.viewport == (width, height) {
            return false;
        }
        self.viewport = (width, height);
        self.camera.set_aspect(width as f32 / height as f32);
        self.camera.update_projection();
        true
    }

    /// Places a freshly loaded model with the configured offset and scale.
    pub fn insert_model(&mut self, meshes: Vec<MeshData>) {
        let transform = Transform::from_position_scale(self.config.model_offset, self.config.model_scale);
        let count = meshes.len();
        self.scene.add_model(meshes, transform);
        log::info!("model added to scene ({} meshes)", count);
    }

    /// Orients the camera for the next frame and returns it with the scene.
    pub fn prepare_frame(&mut self) -> (&Scene, &Camera) {
        self.controller.update_camera(&mut self.camera);
        (&self.scene, &self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn first_frame_looks_straight_ahead() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        let (_, camera) = viewer.prepare_frame();
        assert_eq!(camera.position, Vec3::new(0.0, 30.0, 0.0));
        assert!((camera.target - Vec3::new(0.0, 30.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn drag_turns_the_next_frame() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.apply(PointerInput::Down(Vec2::new(0.0, 0.0)));
        viewer.apply(PointerInput::Move(Vec2::new(-157.079_63, 0.0)));
        viewer.apply(PointerInput::Up);

        let (_, camera) = viewer.prepare_frame();
        assert!((camera.target - Vec3::new(5.0, 30.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn repeated_resize_is_a_no_op() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        assert!(viewer.resize(1600, 900));
        let aspect = viewer.camera().aspect;
        let projection = viewer.camera().projection_matrix();

        assert!(!viewer.resize(1600, 900));
        assert_eq!(viewer.camera().aspect, aspect);
        assert_eq!(viewer.camera().projection_matrix(), projection);
        assert!((aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn viewport_follows_each_window_resize() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        for (width, height) in [(1280, 720), (800, 800), (600, 1200), (1280, 720)] {
            assert!(viewer.resize(width, height));
            assert_eq!(viewer.viewport(), (width, height));
            let expected = width as f32 / height as f32;
            assert!((viewer.camera().aspect - expected).abs() < 1e-6);
            assert_eq!(
                viewer.camera().projection_matrix(),
                glam::Mat4::perspective_rh(
                    viewer.config().fov_degrees.to_radians(),
                    expected,
                    viewer.config().near,
                    viewer.config().far
                )
            );
        }
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        assert!(!viewer.resize(0, 720));
        assert_eq!(viewer.viewport(), (0, 0));
        assert_eq!(viewer.camera().aspect, 1.0);
    }

    #[test]
    fn loaded_model_is_offset_and_scaled() {
        let mut viewer = Viewer::new(ViewerConfig::default());
        viewer.insert_model(Vec::new());
        let model = &viewer.scene().models()[0];
        assert_eq!(model.transform.position, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(model.transform.scale, Vec3::splat(0.25));
    }
}
