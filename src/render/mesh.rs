use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2, 3 => Float32x4];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };

    /// Untextured white vertex.
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: [0.0; 2],
            color: [1.0; 4],
        }
    }

    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv = uv;
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };
}

/// Vertices and indices for a `width` x `height` quad in the XY plane facing
/// +Z, centred on the origin. UV (0, 0) is the top-left corner so video frames
/// land upright.
pub fn plane_geometry(width: f32, height: f32) -> ([TexturedVertex; 4], [u32; 6]) {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let vertices = [
        TexturedVertex {
            position: [-hw, -hh, 0.0],
            uv: [0.0, 1.0],
        },
        TexturedVertex {
            position: [hw, -hh, 0.0],
            uv: [1.0, 1.0],
        },
        TexturedVertex {
            position: [hw, hh, 0.0],
            uv: [1.0, 0.0],
        },
        TexturedVertex {
            position: [-hw, hh, 0.0],
            uv: [0.0, 0.0],
        },
    ];
    (vertices, [0, 1, 2, 0, 2, 3])
}

pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn from_data<V: Pod>(device: &wgpu::Device, label: &str, vertices: &[V], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn plane(device: &wgpu::Device, width: f32, height: f32) -> Self {
        let (vertices, indices) = plane_geometry(width, height);
        Self::from_data(device, "Background", &vertices, &indices)
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_geometry_extent() {
        let (vertices, indices) = plane_geometry(16.0, 9.0);
        assert_eq!(vertices[0].position, [-8.0, -4.5, 0.0]);
        assert_eq!(vertices[2].position, [8.0, 4.5, 0.0]);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_plane_winding_faces_positive_z() {
        let (vertices, indices) = plane_geometry(2.0, 2.0);
        let p = |i: u32| Vec3::from(vertices[i as usize].position);
        let normal = (p(indices[1]) - p(indices[0])).cross(p(indices[2]) - p(indices[0]));
        assert!(normal.z > 0.0);
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(Vertex::LAYOUT.array_stride, 24);
        assert_eq!(TexturedVertex::LAYOUT.array_stride, 20);
    }
}
