use anyhow::Context as _;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Surface, device and queue for one window, plus the depth buffer that
/// tracks the surface size.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// sRGB view of the surface format that frames are rendered through.
    pub view_format: wgpu::TextureFormat,
    pub depth_view: wgpu::TextureView,
}

/// Picks the surface format and an sRGB view of it. Browsers usually only
/// offer linear surface formats, and writing through the sRGB view keeps the
/// output gamma-encoded either way.
pub(crate) fn select_formats(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    let format = formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())?;
    Some((format, format.add_srgb_suffix()))
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter compatible with the surface")?;

        let required_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            wgpu::Limits::default()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let caps = surface.get_capabilities(&adapter);
        let (format, view_format) =
            select_formats(&caps.formats).context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: if view_format == format { vec![] } else { vec![view_format] },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, &config);

        log::info!(
            "GPU ready: {} ({:?}), surface {}x{} {:?} viewed as {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.width,
            config.height,
            format,
            view_format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            depth_view,
        })
    }

    fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Reconfigures the surface for `size`. Zero-sized and unchanged sizes are
    /// ignored; returns whether anything changed.
    pub fn resize(&mut self, size: PhysicalSize<u32>) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return false;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
        true
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config);
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_linear_surface_gets_srgb_view() {
        assert_eq!(
            select_formats(&[TextureFormat::Bgra8Unorm, TextureFormat::Rgba8Unorm]),
            Some((TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb))
        );
    }

    #[test]
    fn test_srgb_surface_is_preferred() {
        assert_eq!(
            select_formats(&[TextureFormat::Rgba16Float, TextureFormat::Rgba8UnormSrgb]),
            Some((TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba8UnormSrgb))
        );
    }

    #[test]
    fn test_no_formats() {
        assert_eq!(select_formats(&[]), None);
    }
}
