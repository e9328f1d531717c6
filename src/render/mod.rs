//! WebGPU Rendering module
//!
//! GPU context, camera and look control, scene description and the renderer
//! that draws it.

pub mod camera;
pub mod context;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod scene;

pub use camera::{look_target, Camera, LookController};
pub use context::GpuContext;
pub use mesh::{Mesh, MeshData, Vertex};
pub use pipeline::RenderPipelines;
pub use renderer::SceneRenderer;
pub use scene::{AmbientLight, DirectionalLight, Lighting, Model, PointLight, Scene};
