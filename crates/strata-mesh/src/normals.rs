//! Smooth vertex normals from face geometry.

use glam::Vec3;

use crate::vertex::ChunkMesh;

/// Recomputes every vertex normal as the normalized sum of adjacent face
/// normals. Unnormalized cross products weight large faces more, which keeps
/// terrain shading stable across cell sizes. Vertices with no facing area
/// (degenerate triangles only) fall back to world up.
pub fn recompute_normals(mesh: &mut ChunkMesh) {
    for vertex in &mut mesh.vertices {
        vertex.normal = [0.0; 3];
    }
    for triangle in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let p0 = Vec3::from_array(mesh.vertices[i0].position);
        let p1 = Vec3::from_array(mesh.vertices[i1].position);
        let p2 = Vec3::from_array(mesh.vertices[i2].position);
        let face = (p1 - p0).cross(p2 - p0);
        for &i in &[i0, i1, i2] {
            let n = Vec3::from_array(mesh.vertices[i].normal) + face;
            mesh.vertices[i].normal = n.to_array();
        }
    }
    for vertex in &mut mesh.vertices {
        let n = Vec3::from_array(vertex.normal);
        vertex.normal = if n.length_squared() > 0.0 {
            n.normalize().to_array()
        } else {
            Vec3::Y.to_array()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::MeshVertex;

    fn vertex(position: [f32; 3]) -> MeshVertex {
        MeshVertex {
            position,
            normal: [0.0; 3],
            uv: [0.0; 2],
        }
    }

    #[test]
    fn test_flat_triangle_gets_up_normal() {
        let mut mesh = ChunkMesh {
            vertices: vec![
                vertex([0.0, 1.0, 0.0]),
                vertex([0.0, 1.0, 1.0]),
                vertex([1.0, 1.0, 0.0]),
            ],
            indices: vec![0, 1, 2],
        };
        recompute_normals(&mut mesh);
        for v in &mesh.vertices {
            assert!(
                (v.normal[1] - 1.0).abs() < 1e-6,
                "Horizontal face should have an up normal, got {:?}",
                v.normal
            );
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let mut mesh = ChunkMesh {
            vertices: vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 0.5, 0.0]),
                vertex([0.0, 0.5, 1.0]),
                vertex([1.0, 1.5, 1.0]),
            ],
            indices: vec![0, 1, 2, 1, 3, 2],
        };
        recompute_normals(&mut mesh);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.normal).length();
            assert!((len - 1.0).abs() < 1e-5, "Normal length {len}");
        }
    }
}
