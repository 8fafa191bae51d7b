//! Instance combining for static scatter types.

use glam::Vec3;
use rayon::prelude::*;
use strata_mesh::{ChunkMesh, MeshVertex};

use crate::placement::ScatterTransform;

/// Merges every instance of one combined object type into a single static
/// mesh: template vertices scaled, rotated, and translated per instance,
/// indices rebased per block. Runs one parallel kernel over instances.
pub fn combine_instances(template: &ChunkMesh, transforms: &[ScatterTransform]) -> ChunkMesh {
    if transforms.is_empty() || template.vertices.is_empty() {
        return ChunkMesh::default();
    }

    let block = template.vertices.len() as u32;
    let blocks: Vec<(Vec<MeshVertex>, Vec<u32>)> = transforms
        .par_iter()
        .enumerate()
        .map(|(instance, t)| {
            let inv_scale = safe_recip(t.scale);
            let vertices = template
                .vertices
                .iter()
                .map(|v| {
                    let position = t.rotation * (Vec3::from(v.position) * t.scale) + t.position;
                    // Normals transform by the inverse-transpose; with
                    // axis-aligned scale that is a componentwise reciprocal.
                    let normal = (t.rotation * (Vec3::from(v.normal) * inv_scale))
                        .try_normalize()
                        .unwrap_or(Vec3::Y);
                    MeshVertex {
                        position: position.to_array(),
                        normal: normal.to_array(),
                        uv: v.uv,
                    }
                })
                .collect();
            let offset = instance as u32 * block;
            let indices = template.indices.iter().map(|&i| i + offset).collect();
            (vertices, indices)
        })
        .collect();

    let mut combined = ChunkMesh {
        vertices: Vec::with_capacity(template.vertices.len() * transforms.len()),
        indices: Vec::with_capacity(template.indices.len() * transforms.len()),
    };
    for (vertices, indices) in blocks {
        combined.vertices.extend(vertices);
        combined.indices.extend(indices);
    }
    combined
}

fn safe_recip(scale: Vec3) -> Vec3 {
    let r = |s: f32| if s.abs() < 1e-6 { 1.0 } else { 1.0 / s };
    Vec3::new(r(scale.x), r(scale.y), r(scale.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn quad() -> ChunkMesh {
        let v = |x: f32, z: f32| MeshVertex {
            position: [x, 0.0, z],
            normal: [0.0, 1.0, 0.0],
            uv: [x, z],
        };
        ChunkMesh {
            vertices: vec![v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0), v(0.0, 1.0)],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    fn at(position: Vec3) -> ScatterTransform {
        ScatterTransform {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[test]
    fn test_combined_buffer_sizes_and_index_validity() {
        let template = quad();
        let combined = combine_instances(
            &template,
            &[at(Vec3::ZERO), at(Vec3::new(4.0, 0.0, 0.0)), at(Vec3::new(0.0, 0.0, 4.0))],
        );
        assert_eq!(combined.vertex_count(), 12);
        assert_eq!(combined.triangle_count(), 6);
        let max = combined.vertices.len() as u32;
        assert!(
            combined.indices.iter().all(|&i| i < max),
            "Every index must address a combined vertex"
        );
    }

    #[test]
    fn test_instances_are_translated() {
        let combined = combine_instances(&quad(), &[at(Vec3::new(10.0, 2.0, 0.0))]);
        assert!(
            (combined.vertices[0].position[0] - 10.0).abs() < 1e-6
                && (combined.vertices[0].position[1] - 2.0).abs() < 1e-6,
            "Instance translation must move the template, got {:?}",
            combined.vertices[0].position
        );
    }

    #[test]
    fn test_rotation_turns_normals() {
        let tilt = ScatterTransform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };
        let combined = combine_instances(&quad(), &[tilt]);
        let n = combined.vertices[0].normal;
        assert!(
            (n[0] + 1.0).abs() < 1e-5,
            "Up normal rotated 90 degrees about z must point along -x, got {n:?}"
        );
    }

    #[test]
    fn test_empty_inputs_yield_empty_mesh() {
        assert!(combine_instances(&quad(), &[]).is_empty());
        assert!(combine_instances(&ChunkMesh::default(), &[at(Vec3::ZERO)]).is_empty());
    }
}
