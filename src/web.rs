//! WASM entry point - hash router plus the drag-to-look room viewer

use crate::assets::{resolve_relative, ModelDocument};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::render::{GpuContext, MeshData, SceneRenderer};
use crate::router::{fragment_from_hash, history_fragment, HostEnvironment, PanelHost, PanelTemplates, Router};
use crate::viewer::Viewer;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DocumentReadyState, HtmlCanvasElement, PopStateEvent, Response};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::web::EventLoopExtWebSys;
use winit::platform::web::WindowAttributesExtWebSys;
use winit::window::{Window, WindowId};

const CONTENT_SECTION_ID: &str = "contentSection";

struct DomPanelHost {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl DomPanelHost {
    fn new(window: web_sys::Window) -> Result<Self> {
        let document = window.document().ok_or(ViewerError::MissingApi("document"))?;
        Ok(Self { window, document })
    }
}

impl PanelHost for DomPanelHost {
    fn replace_content(&self, markup: &str) -> bool {
        match self.document.get_element_by_id(CONTENT_SECTION_ID) {
            Some(section) => {
                section.set_inner_html(markup);
                true
            }
            None => false,
        }
    }

    fn set_title(&self, title: &str) {
        self.document.set_title(title);
    }

    fn redirect(&self, target: &str) {
        let location = self.window.location();
        let href = format!("{}{}", location.origin().unwrap_or_default(), target);
        if let Err(e) = location.set_href(&href) {
            log::warn!("redirect to {} failed: {:?}", href, e);
        }
    }
}

/// Starts the viewer the first time a panel asks for it.
#[derive(Default)]
struct ViewerLauncher {
    started: Cell<bool>,
}

impl ViewerLauncher {
    fn launch(&self, window: &web_sys::Window) {
        if self.started.replace(true) {
            return;
        }
        if let Err(e) = start_viewer(window) {
            log::error!("viewer setup failed: {}", e);
        }
    }
}

struct GpuState {
    context: GpuContext,
    renderer: SceneRenderer,
}

struct App {
    window: Option<Arc<Window>>,
    canvas: Option<HtmlCanvasElement>,
    gpu: Rc<RefCell<Option<GpuState>>>,
    pending_model: Rc<RefCell<Option<Vec<MeshData>>>>,
    viewer: Viewer,
    init_pending: bool,
}

impl App {
    fn new(config: ViewerConfig, canvas: HtmlCanvasElement) -> Self {
        Self {
            window: None,
            canvas: Some(canvas),
            gpu: Rc::new(RefCell::new(None)),
            pending_model: Rc::new(RefCell::new(None)),
            viewer: Viewer::new(config),
            init_pending: false,
        }
    }

    fn spawn_model_load(&self) {
        let url = self.viewer.config().model_url.clone();
        let slot = self.pending_model.clone();

        wasm_bindgen_futures::spawn_local(async move {
            match load_model(&url).await {
                Ok(meshes) => *slot.borrow_mut() = Some(meshes),
                Err(e) => log::error!("could not load {}: {}", url, e),
            }
        });
    }

    fn render(&mut self) {
        if let Some(meshes) = self.pending_model.borrow_mut().take() {
            self.viewer.insert_model(meshes);
        }

        let mut gpu = self.gpu.borrow_mut();
        let Some(state) = gpu.as_mut() else {
            return;
        };

        let size = state.context.size();
        self.viewer.resize(size.width, size.height);

        let (scene, camera) = self.viewer.prepare_frame();
        state.renderer.draw_frame(&mut state.context, scene, camera);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_pending {
            return;
        }
        let Some(canvas) = self.canvas.take() else {
            return;
        };
        self.init_pending = true;

        // No inner size here: the stylesheet sizes the canvas to the viewport,
        // and winit's resize observer turns its changes into `Resized`.
        let window_attrs = Window::default_attributes().with_canvas(Some(canvas));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not attach to canvas: {}", e);
                return;
            }
        };
        self.window = Some(window.clone());

        let gpu = self.gpu.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let context = match GpuContext::new(window.clone()).await {
                Ok(context) => context,
                Err(e) => {
                    log::error!("GPU setup failed: {}", e);
                    return;
                }
            };
            let renderer = SceneRenderer::new(&context);
            *gpu.borrow_mut() = Some(GpuState { context, renderer });
            log::info!("renderer ready");

            window.request_redraw();
        });

        self.spawn_model_load();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.viewer.handle_window_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(state) = self.gpu.borrow_mut().as_mut() {
                    state.context.resize(size);
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

fn start_viewer(window: &web_sys::Window) -> Result<()> {
    let document = window.document().ok_or(ViewerError::MissingApi("document"))?;
    let mut config = ViewerConfig::default();

    let canvas = document
        .get_element_by_id(&config.canvas_id)
        .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| ViewerError::MissingElement(config.canvas_id.clone()))?;

    config.apply_overrides(|key| canvas.get_attribute(&format!("data-{}", key)));

    let event_loop = EventLoop::new()?;
    event_loop.spawn_app(App::new(config, canvas));

    log::info!("viewer started");
    Ok(())
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let fetch_error = |reason: String| ViewerError::AssetFetch {
        url: url.to_string(),
        reason,
    };

    let window = web_sys::window().ok_or(ViewerError::MissingApi("window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_error(format!("{:?}", e)))?
        .dyn_into()
        .map_err(|_| fetch_error("not a Response".to_string()))?;

    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

async fn load_model(url: &str) -> Result<Vec<MeshData>> {
    let document = ModelDocument::parse(&fetch_bytes(url).await?)?;

    let mut external = HashMap::new();
    for uri in document.external_buffers() {
        let bytes = fetch_bytes(&resolve_relative(url, &uri)).await?;
        external.insert(uri, bytes);
    }

    document.into_meshes(&external)
}

fn boot(window: web_sys::Window) -> Result<()> {
    let location = window.location();
    let env = HostEnvironment::from_location(&location.hostname()?, &location.pathname()?);
    let router = Rc::new(Router::new(PanelTemplates::default(), env));
    let host = Rc::new(DomPanelHost::new(window.clone())?);
    let launcher = Rc::new(ViewerLauncher::default());

    let panel = router.navigate(host.as_ref(), fragment_from_hash(&location.hash()?));
    if panel.shows_viewer() {
        launcher.launch(&window);
    }

    let on_popstate = {
        let window = window.clone();
        Closure::<dyn FnMut(PopStateEvent)>::new(move |event: PopStateEvent| {
            let state_hash = js_sys::Reflect::get(&event.state(), &JsValue::from_str("hash"))
                .ok()
                .and_then(|v| v.as_string());
            let location_hash = window.location().hash().unwrap_or_default();

            let panel = router.navigate(host.as_ref(), history_fragment(state_hash.as_deref(), &location_hash));
            if panel.shows_viewer() {
                launcher.launch(&window);
            }
        })
    };
    window.add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())?;
    on_popstate.forget();

    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let window = web_sys::window().ok_or(ViewerError::MissingApi("window"))?;
    let document = window.document().ok_or(ViewerError::MissingApi("document"))?;

    if document.ready_state() == DocumentReadyState::Complete {
        boot(window)?;
        return Ok(());
    }

    let on_load = {
        let window = window.clone();
        Closure::once(move || {
            if let Err(e) = boot(window) {
                log::error!("page setup failed: {}", e);
            }
        })
    };
    window.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
    on_load.forget();

    Ok(())
}
