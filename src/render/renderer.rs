use super::camera::Camera;
use super::context::GpuContext;
use super::mesh::Mesh;
use super::pipeline::{BackgroundUniforms, ModelUniforms, RenderPipelines};
use super::video::VideoTexture;
use crate::media::FrameSource;
use crate::scene::{Model, Scene, TextureImage};
use crate::viewer::Viewer;
use glam::Mat4;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;

struct GpuPrimitive {
    mesh: Mesh,
    color: [f32; 4],
    /// Index into `GpuModel::materials`, or `None` for plain white.
    material: Option<usize>,
}

/// GPU-side copy of the loaded model: one mesh per primitive, one material
/// per distinct texture, and a dynamic uniform buffer with one aligned slot
/// per primitive.
struct GpuModel {
    primitives: Vec<GpuPrimitive>,
    materials: Vec<wgpu::BindGroup>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct SceneRenderer {
    pipelines: RenderPipelines,
    background_mesh: Mesh,
    background_uniforms: wgpu::Buffer,
    video: VideoTexture,
    material_sampler: wgpu::Sampler,
    /// Bound for primitives without a base-colour texture.
    white_material: wgpu::BindGroup,
    model: Option<GpuModel>,
    uniform_alignment: u32,
}

impl SceneRenderer {
    pub fn new(context: &GpuContext, scene: &Scene) -> Self {
        let pipelines = RenderPipelines::new(context);
        let background_mesh = Mesh::plane(
            &context.device,
            scene.background.width,
            scene.background.height,
        );

        let background_uniforms = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Background Uniform Buffer"),
            size: std::mem::size_of::<BackgroundUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let video = VideoTexture::new(context, &pipelines, &background_uniforms);
        let uniform_alignment = context.device.limits().min_uniform_buffer_offset_alignment;

        let material_sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = TextureImage {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        let white_material = Self::create_material(context, &pipelines, &material_sampler, &white);

        Self {
            pipelines,
            background_mesh,
            background_uniforms,
            video,
            material_sampler,
            white_material,
            model: None,
            uniform_alignment,
        }
    }

    fn create_material(
        context: &GpuContext,
        pipelines: &RenderPipelines,
        sampler: &wgpu::Sampler,
        image: &TextureImage,
    ) -> wgpu::BindGroup {
        let texture = context.device.create_texture_with_data(
            &context.queue,
            &wgpu::TextureDescriptor {
                label: Some("Base Color Texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.pixels,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        pipelines.create_material_bind_group(&context.device, &view, sampler)
    }

    fn material_for(
        &self,
        context: &GpuContext,
        image: Option<&Arc<TextureImage>>,
        materials: &mut Vec<wgpu::BindGroup>,
        by_image: &mut HashMap<*const TextureImage, usize>,
    ) -> Option<usize> {
        let image = image?;
        let max = context.device.limits().max_texture_dimension_2d;
        if image.width == 0 || image.height == 0 || image.width > max || image.height > max {
            log::warn!(
                "Skipping {}x{} texture (device limit {})",
                image.width,
                image.height,
                max
            );
            return None;
        }
        let index = *by_image.entry(Arc::as_ptr(image)).or_insert_with(|| {
            materials.push(Self::create_material(
                context,
                &self.pipelines,
                &self.material_sampler,
                image,
            ));
            materials.len() - 1
        });
        Some(index)
    }

    fn align_to(size: u32, alignment: u32) -> u32 {
        (size + alignment - 1) & !(alignment - 1)
    }

    fn aligned_uniform_size(&self) -> u32 {
        Self::align_to(std::mem::size_of::<ModelUniforms>() as u32, self.uniform_alignment)
    }

    fn upload_model(&self, context: &GpuContext, model: &Model) -> GpuModel {
        let mut materials = Vec::new();
        let mut by_image = HashMap::new();
        let primitives: Vec<_> = model
            .primitives()
            .iter()
            .map(|p| GpuPrimitive {
                mesh: Mesh::from_data(&context.device, "Model", &p.vertices, &p.indices),
                color: p.color,
                material: self.material_for(context, p.texture.as_ref(), &mut materials, &mut by_image),
            })
            .collect();

        let slots = primitives.len().max(1) as u64;
        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: self.aligned_uniform_size() as u64 * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self
            .pipelines
            .create_model_bind_group(&context.device, &uniform_buffer);

        log::debug!(
            "Uploaded {} model primitives and {} textures to the GPU",
            primitives.len(),
            materials.len()
        );
        GpuModel {
            primitives,
            materials,
            uniform_buffer,
            bind_group,
        }
    }

    /// Acquires the next surface texture, draws the viewer's scene into it and
    /// presents it.
    pub fn render_frame(&mut self, context: &GpuContext, viewer: &Viewer) -> Result<(), wgpu::SurfaceError> {
        let output = context.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(context.view_format),
            ..Default::default()
        });

        self.render(context, &view, viewer.scene(), viewer.camera(), viewer.frame_source());

        output.present();
        Ok(())
    }

    pub fn render(
        &mut self,
        context: &GpuContext,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &Camera,
        frame_source: Option<&dyn FrameSource>,
    ) {
        if self.model.is_none() {
            if let Some(model) = scene.model() {
                self.model = Some(self.upload_model(context, model));
            }
        }

        if let Some(source) = frame_source {
            self.video
                .refresh(context, &self.pipelines, &self.background_uniforms, source);
        }

        let view_proj = camera.view_projection();

        let background = BackgroundUniforms {
            mvp: (view_proj * scene.background.transform.to_matrix()).to_cols_array_2d(),
        };
        context
            .queue
            .write_buffer(&self.background_uniforms, 0, bytemuck::bytes_of(&background));

        if let (Some(gpu_model), Some(model)) = (&self.model, scene.model()) {
            let transform = model.transform();
            let model_matrix = transform.to_matrix();
            let normal_matrix = Mat4::from_mat3(transform.normal_matrix());
            let ambient = scene.ambient.radiance();
            let light_dir = scene.directional.direction();
            let light_color = scene.directional.radiance();

            let aligned_size = self.aligned_uniform_size() as usize;
            let mut uniform_data = vec![0u8; aligned_size * gpu_model.primitives.len()];
            for (i, primitive) in gpu_model.primitives.iter().enumerate() {
                let uniforms = ModelUniforms {
                    view_proj: view_proj.to_cols_array_2d(),
                    model: model_matrix.to_cols_array_2d(),
                    normal: normal_matrix.to_cols_array_2d(),
                    color: primitive.color,
                    ambient: ambient.extend(1.0).to_array(),
                    light_dir: light_dir.extend(0.0).to_array(),
                    light_color: light_color.extend(1.0).to_array(),
                };
                let offset = i * aligned_size;
                let bytes = bytemuck::bytes_of(&uniforms);
                uniform_data[offset..offset + bytes.len()].copy_from_slice(bytes);
            }
            if !uniform_data.is_empty() {
                context
                    .queue
                    .write_buffer(&gpu_model.uniform_buffer, 0, &uniform_data);
            }
        }

        let mut encoder = context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
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

            render_pass.set_pipeline(&self.pipelines.background_pipeline);
            render_pass.set_bind_group(0, self.video.bind_group(), &[]);
            self.background_mesh.draw(&mut render_pass);

            if let Some(gpu_model) = &self.model {
                let aligned_size = self.aligned_uniform_size();
                render_pass.set_pipeline(&self.pipelines.model_pipeline);
                for (i, primitive) in gpu_model.primitives.iter().enumerate() {
                    render_pass.set_bind_group(0, &gpu_model.bind_group, &[i as u32 * aligned_size]);
                    let material = primitive
                        .material
                        .and_then(|m| gpu_model.materials.get(m))
                        .unwrap_or(&self.white_material);
                    render_pass.set_bind_group(1, material, &[]);
                    primitive.mesh.draw(&mut render_pass);
                }
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        assert_eq!(SceneRenderer::align_to(192, 256), 256);
        assert_eq!(SceneRenderer::align_to(256, 256), 256);
        assert_eq!(SceneRenderer::align_to(257, 256), 512);
    }
}
