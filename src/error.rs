//! Error types shared by the viewer, the asset loader and the web glue.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("element not found: #{0}")]
    MissingElement(String),

    #[error("browser API unavailable: {0}")]
    MissingApi(&'static str),

    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("failed to fetch {url}: {reason}")]
    AssetFetch { url: String, reason: String },

    #[error("failed to parse model: {0}")]
    AssetParse(#[from] gltf::Error),

    #[error("model buffer {0} was not provided")]
    MissingBuffer(String),

    #[error("malformed data URI: {0}")]
    DataUri(String),

    #[error("model node {0} is its own ancestor")]
    NodeCycle(usize),

    #[error("model contains no triangle geometry")]
    NoGeometry,

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("GPU device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for ViewerError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ViewerError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<ViewerError> for wasm_bindgen::JsValue {
    fn from(err: ViewerError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_resource() {
        let err = ViewerError::AssetFetch {
            url: "room.gltf".into(),
            reason: "404".into(),
        };
        assert_eq!(err.to_string(), "failed to fetch room.gltf: 404");
        assert_eq!(
            ViewerError::MissingElement("threeCanvas".into()).to_string(),
            "element not found: #threeCanvas"
        );
    }
}
