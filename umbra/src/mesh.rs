use bytemuck::{Pod, Zeroable};
use fxhash::FxHashMap;
use log::debug;
use wgpu::util::DeviceExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(u32);

/// Interleaved vertex: position, texture coordinates, normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as _,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Host-side mesh data, uploaded once at registration.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// A unit cube centered at the origin, one quad per face with outward
    /// normals.
    pub fn unit_cube() -> Self {
        let face = |normal: [f32; 3], tangent: [f32; 3], bitangent: [f32; 3]| {
            let n = glam::Vec3::from(normal);
            let t = glam::Vec3::from(tangent);
            let b = glam::Vec3::from(bitangent);

            [
                (n * 0.5 - t * 0.5 - b * 0.5, [0.0, 0.0]),
                (n * 0.5 + t * 0.5 - b * 0.5, [1.0, 0.0]),
                (n * 0.5 + t * 0.5 + b * 0.5, [1.0, 1.0]),
                (n * 0.5 - t * 0.5 + b * 0.5, [0.0, 1.0]),
            ]
            .map(|(p, uv)| Vertex {
                position: p.to_array(),
                uv,
                normal,
            })
        };

        let faces = [
            face([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            face([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            face([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            face([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            face([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            face([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for quad in faces {
            let base = vertices.len() as u32;

            vertices.extend(quad);
            indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self { vertices, indices }
    }

    /// An axis-aligned quad in the XZ plane at `y = 0`, facing up.
    pub fn floor_plane(half_extent: f32) -> Self {
        let e = half_extent;

        let vertices = vec![
            Vertex { position: [-e, 0.0, -e], uv: [0.0, 0.0], normal: [0.0, 1.0, 0.0] },
            Vertex { position: [e, 0.0, -e], uv: [1.0, 0.0], normal: [0.0, 1.0, 0.0] },
            Vertex { position: [e, 0.0, e], uv: [1.0, 1.0], normal: [0.0, 1.0, 0.0] },
            Vertex { position: [-e, 0.0, e], uv: [0.0, 1.0], normal: [0.0, 1.0, 0.0] },
        ];

        Self {
            vertices,
            indices: vec![0, 2, 1, 2, 0, 3],
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

#[derive(Debug, Default)]
pub struct Meshes {
    items: FxHashMap<MeshHandle, Mesh>,
    next_id: u32,
}

impl Meshes {
    pub fn add(&mut self, device: &wgpu::Device, data: &MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_id);

        self.next_id += 1;

        debug!(
            "Uploading mesh {:?}: {} vertices, {} indices",
            handle,
            data.vertices.len(),
            data.indices.len(),
        );

        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("umbra_mesh_vertices"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("umbra_mesh_indices"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        self.items.insert(
            handle,
            Mesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
            },
        );

        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.items.get(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cube_is_closed() {
        let cube = MeshData::unit_cube();

        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);

        for v in &cube.vertices {
            // Every vertex sits on the surface of the [-0.5, 0.5] box.
            assert!(v
                .position
                .iter()
                .any(|c| (c.abs() - 0.5).abs() < 1.0e-6));

            // Normals point outward.
            let p = glam::Vec3::from(v.position);
            let n = glam::Vec3::from(v.normal);

            assert!(p.dot(n) > 0.0);
        }
    }
}
