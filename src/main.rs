#[cfg(not(target_arch = "wasm32"))]
mod native {
    use room_viewer::assets;
    use room_viewer::config::ViewerConfig;
    use room_viewer::render::{GpuContext, SceneRenderer};
    use room_viewer::{Viewer, ViewerError};
    use std::path::PathBuf;
    use std::sync::Arc;
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
    use winit::keyboard::{KeyCode, PhysicalKey};
    use winit::window::{Window, WindowId};

    struct App {
        window: Option<Arc<Window>>,
        context: Option<GpuContext>,
        renderer: Option<SceneRenderer>,
        viewer: Viewer,
    }

    impl App {
        fn new(config: ViewerConfig) -> Self {
            Self {
                window: None,
                context: None,
                renderer: None,
                viewer: Viewer::new(config),
            }
        }

        fn load_model(&mut self) {
            let path = PathBuf::from(&self.viewer.config().model_url);
            match assets::load_from_path(&path) {
                Ok(meshes) => self.viewer.insert_model(meshes),
                Err(e) => log::error!("could not load {}: {}", path.display(), e),
            }
        }

        fn render(&mut self) {
            let (Some(context), Some(renderer)) = (self.context.as_mut(), self.renderer.as_mut()) else {
                return;
            };
            let (scene, camera) = self.viewer.prepare_frame();
            renderer.draw_frame(context, scene, camera);
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }

            let window_attrs = Window::default_attributes()
                .with_title("Home")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("could not create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            self.window = Some(window.clone());

            let context = match pollster::block_on(GpuContext::new(window.clone())) {
                Ok(context) => context,
                Err(e) => {
                    log::error!("GPU setup failed: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            let size = context.size();
            self.viewer.resize(size.width, size.height);
            self.renderer = Some(SceneRenderer::new(&context));
            self.context = Some(context);

            self.load_model();
            window.request_redraw();
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
            if self.viewer.handle_window_event(&event) {
                return;
            }

            match event {
                WindowEvent::CloseRequested => event_loop.exit(),

                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        match event.physical_key {
                            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                            PhysicalKey::Code(KeyCode::KeyR) => self.viewer.reset_view(),
                            _ => {}
                        }
                    }
                }

                WindowEvent::Resized(size) => {
                    if let Some(context) = &mut self.context {
                        context.resize(size);
                    }
                    self.viewer.resize(size.width, size.height);
                }

                WindowEvent::RedrawRequested => {
                    self.render();
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }

                _ => {}
            }
        }
    }

    pub fn run() -> Result<(), ViewerError> {
        env_logger::init();

        let mut config = ViewerConfig::default();
        config.apply_overrides(|key| std::env::var(ViewerConfig::env_var_name(key)).ok());
        if let Some(path) = std::env::args().nth(1) {
            config.model_url = path;
        }
        log::info!("loading model from {}", config.model_url);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(config);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        eprintln!("room-viewer: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
