//! Model assets.

mod model;

pub use model::{resolve_relative, ModelDocument};

#[cfg(not(target_arch = "wasm32"))]
pub fn load_from_path(path: &std::path::Path) -> crate::error::Result<Vec<crate::render::MeshData>> {
    use std::collections::HashMap;

    let document = ModelDocument::parse(&std::fs::read(path)?)?;
    let base = path.to_string_lossy();

    let mut external = HashMap::new();
    for uri in document.external_buffers() {
        let resolved = resolve_relative(&base, &uri);
        let bytes = std::fs::read(&resolved).map_err(|e| crate::error::ViewerError::AssetFetch {
            url: resolved.clone(),
            reason: e.to_string(),
        })?;
        external.insert(uri, bytes);
    }

    document.into_meshes(&external)
}
