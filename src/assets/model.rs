//! glTF model import.
//!
//! Loading is split in two so the browser can fetch external buffers
//! asynchronously: [`ModelDocument::parse`] reads the container and reports
//! which buffer URIs it still needs, [`ModelDocument::into_meshes`] resolves
//! them and flattens the default scene into world-space [`MeshData`].

use std::collections::HashMap;

use base64::Engine;
use glam::{Mat4, Vec3};

use crate::error::{Result, ViewerError};
use crate::render::{MeshData, Vertex};

pub struct ModelDocument {
    gltf: gltf::Gltf,
}

impl ModelDocument {
    /// Parses `.gltf` JSON or a binary `.glb` container.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        Ok(Self { gltf })
    }

    /// URIs of buffers that live outside the document and must be fetched.
    pub fn external_buffers(&self) -> Vec<String> {
        self.gltf
            .document
            .buffers()
            .filter_map(|buffer| match buffer.source() {
                gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => Some(uri.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn into_meshes(self, external: &HashMap<String, Vec<u8>>) -> Result<Vec<MeshData>> {
        let buffers = self.resolve_buffers(external)?;
        let document = &self.gltf.document;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(ViewerError::NoGeometry)?;

        let mut meshes = Vec::new();
        let mut ancestors = Vec::new();
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, &mut ancestors, &mut meshes)?;
        }

        if meshes.is_empty() {
            return Err(ViewerError::NoGeometry);
        }
        Ok(meshes)
    }

    fn resolve_buffers(&self, external: &HashMap<String, Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        self.gltf
            .document
            .buffers()
            .map(|buffer| match buffer.source() {
                gltf::buffer::Source::Bin => self
                    .gltf
                    .blob
                    .clone()
                    .ok_or_else(|| ViewerError::MissingBuffer("GLB binary chunk".to_string())),
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri),
                gltf::buffer::Source::Uri(uri) => external
                    .get(uri)
                    .cloned()
                    .ok_or_else(|| ViewerError::MissingBuffer(uri.to_string())),
            })
            .collect()
    }
}

/// Walks `node` and its descendants. `ancestors` holds the indices on the
/// current path; meeting one of them again means the hierarchy loops.
fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    ancestors: &mut Vec<usize>,
    out: &mut Vec<MeshData>,
) -> Result<()> {
    if ancestors.contains(&node.index()) {
        return Err(ViewerError::NodeCycle(node.index()));
    }
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let normal_matrix = world.inverse().transpose();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive in {:?}", mesh.name());
                continue;
            }
            if let Some(data) = read_primitive(&primitive, world, normal_matrix, buffers) {
                out.push(data);
            }
        }
    }

    ancestors.push(node.index());
    for child in node.children() {
        collect_node(&child, world, buffers, ancestors, out)?;
    }
    ancestors.pop();
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    normal_matrix: Mat4,
    buffers: &[Vec<u8>],
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let normals: Option<Vec<[f32; 3]>> = reader
        .read_normals()
        .map(|n| n.collect())
        .filter(|n: &Vec<[f32; 3]>| n.len() == positions.len());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let position = world.transform_point3(Vec3::from(*p));
            let normal = normals
                .as_ref()
                .map(|n| normal_matrix.transform_vector3(Vec3::from(n[i])).normalize_or_zero())
                .unwrap_or(Vec3::ZERO);
            Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
            }
        })
        .collect();

    let mut data = MeshData {
        vertices,
        indices,
        color: primitive.material().pbr_metallic_roughness().base_color_factor(),
    };
    if normals.is_none() {
        data.compute_normals();
    }
    Some(data)
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| ViewerError::DataUri(truncate(uri)))?;
    if !header.ends_with(";base64") {
        return Err(ViewerError::DataUri(truncate(uri)));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ViewerError::DataUri(e.to_string()))
}

fn truncate(uri: &str) -> String {
    uri.chars().take(48).collect()
}

/// Resolves a buffer URI against the URL the model was loaded from.
pub fn resolve_relative(base_url: &str, uri: &str) -> String {
    if uri.contains("://") || uri.starts_with('/') {
        return uri.to_string();
    }
    match base_url.rfind('/') {
        Some(idx) => format!("{}{}", &base_url[..=idx], uri),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn triangle_bytes() -> Vec<u8> {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        bytemuck::cast_slice(&positions[..]).to_vec()
    }

    fn triangle_gltf(buffer_uri: &str) -> String {
        format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "scene": 0,
                "scenes": [{{ "nodes": [0] }}],
                "nodes": [{{ "mesh": 0, "translation": [0.0, 2.0, 0.0] }}],
                "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
                "accessors": [{{
                    "bufferView": 0,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0],
                    "max": [1.0, 1.0, 0.0]
                }}],
                "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
                "buffers": [{{ "byteLength": 36, "uri": "{}" }}]
            }}"#,
            buffer_uri
        )
    }

    #[test]
    fn embedded_triangle_is_placed_by_node_transform() {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(triangle_bytes())
        );
        let doc = ModelDocument::parse(triangle_gltf(&uri).as_bytes()).unwrap();
        assert!(doc.external_buffers().is_empty());

        let meshes = doc.into_meshes(&HashMap::new()).unwrap();
        assert_eq!(meshes.len(), 1);
        let mesh = &meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].position, [1.0, 2.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 3.0, 0.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn external_buffers_are_reported_and_resolved() {
        let doc = ModelDocument::parse(triangle_gltf("room.bin").as_bytes()).unwrap();
        assert_eq!(doc.external_buffers(), vec!["room.bin".to_string()]);

        let mut fetched = HashMap::new();
        fetched.insert("room.bin".to_string(), triangle_bytes());
        let meshes = doc.into_meshes(&fetched).unwrap();
        assert_eq!(meshes[0].vertices.len(), 3);
    }

    #[test]
    fn missing_external_buffer_is_an_error() {
        let doc = ModelDocument::parse(triangle_gltf("room.bin").as_bytes()).unwrap();
        match doc.into_meshes(&HashMap::new()) {
            Err(ViewerError::MissingBuffer(uri)) => assert_eq!(uri, "room.bin"),
            other => panic!("expected missing buffer, got {:?}", other.map(|m| m.len())),
        }
    }

    #[test]
    fn looping_node_hierarchy_is_rejected() {
        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "children": [1] }, { "children": [0] }]
        }"#;
        let doc = ModelDocument::parse(json.as_bytes()).unwrap();
        assert!(matches!(
            doc.into_meshes(&HashMap::new()),
            Err(ViewerError::NodeCycle(0))
        ));
    }

    #[test]
    fn nested_nodes_compose_their_transforms() {
        let uri = format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(triangle_bytes())
        );
        let json = triangle_gltf(&uri).replace(
            r#""nodes": [{ "mesh": 0, "translation": [0.0, 2.0, 0.0] }]"#,
            r#""nodes": [
                { "children": [1], "translation": [0.0, 2.0, 0.0] },
                { "mesh": 0, "translation": [1.0, 0.0, 0.0] }
            ]"#,
        );
        let doc = ModelDocument::parse(json.as_bytes()).unwrap();
        let meshes = doc.into_meshes(&HashMap::new()).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertices[0].position, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            ModelDocument::parse(b"not a model"),
            Err(ViewerError::AssetParse(_))
        ));
    }

    #[test]
    fn data_uri_must_be_base64() {
        assert!(decode_data_uri("data:application/octet-stream,raw").is_err());
        assert_eq!(
            decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn buffer_uris_resolve_next_to_the_model() {
        assert_eq!(
            resolve_relative("./src/Models/lowPolyLivingRoom.gltf", "lowPolyLivingRoom.bin"),
            "./src/Models/lowPolyLivingRoom.bin"
        );
        assert_eq!(resolve_relative("room.gltf", "room.bin"), "room.bin");
        assert_eq!(
            resolve_relative("./a/room.gltf", "https://cdn.example/room.bin"),
            "https://cdn.example/room.bin"
        );
    }
}
