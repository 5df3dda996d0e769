use super::context::GpuContext;
use super::pipeline::RenderPipelines;
use crate::media::FrameSource;
use wgpu::util::DeviceExt;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Background texture fed from a [`FrameSource`]. Starts as a 1x1 black
/// placeholder and is reallocated whenever the frame size changes.
pub struct VideoTexture {
    texture: wgpu::Texture,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
    live: bool,
}

impl VideoTexture {
    pub fn new(context: &GpuContext, pipelines: &RenderPipelines, uniforms: &wgpu::Buffer) -> Self {
        let sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Video Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture = context.device.create_texture_with_data(
            &context.queue,
            &Self::descriptor(1, 1),
            wgpu::util::TextureDataOrder::LayerMajor,
            &[0, 0, 0, 255],
        );
        let bind_group = Self::bind(context, pipelines, uniforms, &texture, &sampler);

        Self {
            texture,
            sampler,
            bind_group,
            size: (1, 1),
            live: false,
        }
    }

    fn descriptor(width: u32, height: u32) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("Video Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            // External image copies need RENDER_ATTACHMENT on the destination.
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        }
    }

    fn bind(
        context: &GpuContext,
        pipelines: &RenderPipelines,
        uniforms: &wgpu::Buffer,
        texture: &wgpu::Texture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        pipelines.create_background_bind_group(&context.device, uniforms, &view, sampler)
    }

    /// Pulls the latest frame from `source`. Does nothing until the source
    /// has a decodable frame.
    pub fn refresh(
        &mut self,
        context: &GpuContext,
        pipelines: &RenderPipelines,
        uniforms: &wgpu::Buffer,
        source: &dyn FrameSource,
    ) {
        let Some((width, height)) = source.frame_size() else {
            return;
        };

        if (width, height) != self.size || !self.live {
            log::debug!("Allocating {}x{} video texture", width, height);
            self.texture = context.device.create_texture(&Self::descriptor(width, height));
            self.bind_group = Self::bind(context, pipelines, uniforms, &self.texture, &self.sampler);
            self.size = (width, height);
            self.live = true;
        }

        source.copy_to_texture(&context.queue, &self.texture);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
