//! CPU-side mesh buffers handed to the renderer and the physics layer.

use bytemuck::{Pod, Zeroable};

/// One mesh vertex. `#[repr(C)]` and `Pod` so the buffer can be uploaded
/// without a copy.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Chunk-local position.
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Planar `(x / size_x, z / size_z)` projection.
    pub uv: [f32; 2],
}

/// An indexed triangle mesh for one chunk.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}
