use glam::Mat4;

use super::camera::Camera;
use super::context::GpuContext;
use super::mesh::Mesh;
use super::pipeline::{ModelUniforms, RenderPipelines, SceneUniforms};
use super::scene::Scene;

const INITIAL_CAPACITY: usize = 64;

struct DrawItem {
    mesh: Mesh,
    model: Mat4,
    color: [f32; 4],
}

/// Mirrors a [`Scene`] on the GPU and draws it.
///
/// Models are uploaded once, the first frame after they appear in the scene.
/// Per-mesh uniforms live in one buffer addressed with dynamic offsets.
pub struct SceneRenderer {
    pipelines: RenderPipelines,
    draws: Vec<DrawItem>,
    uploaded_models: usize,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    capacity: usize,
    uniform_alignment: u32,
}

impl SceneRenderer {
    pub fn new(context: &GpuContext) -> Self {
        let pipelines = RenderPipelines::new(context);
        let uniform_alignment = context.device.limits().min_uniform_buffer_offset_alignment;

        let scene_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group = pipelines.create_scene_bind_group(&context.device, &scene_buffer);

        let model_buffer = Self::create_model_buffer(context, INITIAL_CAPACITY, uniform_alignment);
        let model_bind_group = pipelines.create_model_bind_group(&context.device, &model_buffer);

        Self {
            pipelines,
            draws: Vec::new(),
            uploaded_models: 0,
            scene_buffer,
            scene_bind_group,
            model_buffer,
            model_bind_group,
            capacity: INITIAL_CAPACITY,
            uniform_alignment,
        }
    }

    fn create_model_buffer(context: &GpuContext, capacity: usize, alignment: u32) -> wgpu::Buffer {
        let stride = align_to(std::mem::size_of::<ModelUniforms>() as u32, alignment) as u64;
        context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dynamic Model Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn aligned_uniform_size(&self) -> u32 {
        align_to(std::mem::size_of::<ModelUniforms>() as u32, self.uniform_alignment)
    }

    /// Uploads models added to `scene` since the previous call.
    pub fn sync(&mut self, context: &GpuContext, scene: &Scene) {
        let models = scene.models();
        if self.uploaded_models >= models.len() {
            return;
        }

        for model in &models[self.uploaded_models..] {
            let matrix = model.matrix();
            for data in model.meshes.iter().filter(|m| !m.is_empty()) {
                self.draws.push(DrawItem {
                    mesh: Mesh::upload(&context.device, data),
                    model: matrix,
                    color: data.color,
                });
            }
        }
        self.uploaded_models = models.len();

        if self.draws.len() > self.capacity {
            self.capacity = self.draws.len().next_power_of_two();
            self.model_buffer = Self::create_model_buffer(context, self.capacity, self.uniform_alignment);
            self.model_bind_group = self
                .pipelines
                .create_model_bind_group(&context.device, &self.model_buffer);
        }

        let stride = self.aligned_uniform_size() as usize;
        let mut uniform_data = vec![0u8; stride * self.draws.len()];
        for (i, draw) in self.draws.iter().enumerate() {
            let uniforms = ModelUniforms::new(draw.model, draw.color);
            let bytes = bytemuck::bytes_of(&uniforms);
            let offset = i * stride;
            uniform_data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        if !uniform_data.is_empty() {
            context.queue.write_buffer(&self.model_buffer, 0, &uniform_data);
        }

        log::debug!("uploaded {} meshes", self.draws.len());
    }

    pub fn render(&self, context: &GpuContext, view: &wgpu::TextureView, scene: &Scene, camera: &Camera) {
        let uniforms = SceneUniforms::new(camera, &scene.lighting);
        context
            .queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        // Multisampled frames draw into the MSAA target and resolve into `view`.
        let (target, resolve_target, color_store) = match &context.msaa_view {
            Some(msaa) => (msaa, Some(view), wgpu::StoreOp::Discard),
            None => (view, None, wgpu::StoreOp::Store),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: color_store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &context.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipelines.pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

            let stride = self.aligned_uniform_size();
            for (i, draw) in self.draws.iter().enumerate() {
                render_pass.set_bind_group(1, &self.model_bind_group, &[i as u32 * stride]);
                render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Acquires the next surface texture and draws one frame into it.
    /// Lost or outdated surfaces are reconfigured and the frame is skipped.
    pub fn draw_frame(&mut self, context: &mut GpuContext, scene: &Scene, camera: &Camera) {
        self.sync(context, scene);

        let output = match context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                context.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface timeout, skipping frame");
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.render(context, &view, scene, camera);

        output.present();
    }
}

fn align_to(size: u32, alignment: u32) -> u32 {
    (size + alignment - 1) & !(alignment - 1)
}
