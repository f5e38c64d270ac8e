//! Mesh data structures and primitive generation. The render adapter draws every
//! simulation body (ships, bullets, planetoids, ring particles) as an instanced
//! sphere and every explosion as a camera-facing billboard quad; these are the only
//! primitives the adapter needs.

use crate::vertex::Vertex;
use glam::Vec3;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    /// Create a billboard quad (XY plane, facing +Z). Use with a camera-facing
    /// rotation so explosions always face the viewer.
    pub fn billboard_quad(device: &wgpu::Device, size: f32) -> Self {
        let half = size / 2.0;
        let vertices = [
            Vertex::new([-half, -half, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new([half, -half, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([half, half, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([-half, half, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        ];
        let indices: [u32; 6] = [0, 1, 2, 2, 3, 0];
        Self::new(device, &vertices, &indices)
    }

    /// Create a UV sphere: the single shared mesh used to draw ships, bullets,
    /// planetoids, and ring particles at whatever radius their instance scales it to.
    pub fn sphere(device: &wgpu::Device, radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let position = [x, y, z];
                let normal = Vec3::new(x, y, z).normalize();
                let uv = [segment as f32 / segments as f32, ring as f32 / rings as f32];

                vertices.push(Vertex::new(position, normal.into(), uv));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.push(current);
                indices.push(next);
                indices.push(current + 1);

                indices.push(current + 1);
                indices.push(next);
                indices.push(next + 1);
            }
        }

        Self::new(device, &vertices, &indices)
    }
}
