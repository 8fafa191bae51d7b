//! Marching-cubes surface extraction.

use rustc_hash::FxHashMap;
use strata_coords::ChunkExtents;

use crate::normals::recompute_normals;
use crate::tables::{CORNER_OFFSETS, EDGE_CORNERS, EDGE_TABLE, TRIANGLE_TABLE};
use crate::vertex::{ChunkMesh, MeshVertex};

/// Extracts the iso-surface of a chunk's density field.
///
/// Corners with density at or above `iso` classify as solid; fully solid
/// cells (configuration 255) are skipped, fully empty ones fall out of the
/// edge table. Crossing points interpolate linearly between the two corner
/// densities; equal corners take the first corner's position. Vertices are
/// deduplicated by exact position so shared cell edges emit one index.
pub fn extract(density: &[f32], extents: ChunkExtents, iso: f32) -> ChunkMesh {
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut dedup: FxHashMap<[u32; 3], u32> = FxHashMap::default();

    let inv_size = [
        1.0 / extents.size_x as f32,
        1.0 / extents.size_z as f32,
    ];

    for cz in 0..extents.size_z as usize {
        for cy in 0..extents.size_y as usize {
            for cx in 0..extents.size_x as usize {
                let mut corner_density = [0.0f32; 8];
                let mut cube_index = 0usize;
                for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
                    let d = density
                        [extents.voxel_index(cx + offset[0], cy + offset[1], cz + offset[2])];
                    corner_density[i] = d;
                    if d >= iso {
                        cube_index |= 1 << i;
                    }
                }
                // Fully buried cells carry no surface.
                if cube_index == 255 {
                    continue;
                }
                let edges = EDGE_TABLE[cube_index];
                if edges == 0 {
                    continue;
                }

                let mut edge_position = [[0.0f32; 3]; 12];
                for (e, corners) in EDGE_CORNERS.iter().enumerate() {
                    if edges & (1 << e) == 0 {
                        continue;
                    }
                    let [a, b] = *corners;
                    let da = corner_density[a];
                    let db = corner_density[b];
                    let mu = if (db - da).abs() <= f32::EPSILON {
                        0.0
                    } else {
                        ((iso - da) / (db - da)).clamp(0.0, 1.0)
                    };
                    let pa = CORNER_OFFSETS[a];
                    let pb = CORNER_OFFSETS[b];
                    edge_position[e] = [
                        (cx + pa[0]) as f32 + mu * (pb[0] as f32 - pa[0] as f32),
                        (cy + pa[1]) as f32 + mu * (pb[1] as f32 - pa[1] as f32),
                        (cz + pa[2]) as f32 + mu * (pb[2] as f32 - pa[2] as f32),
                    ];
                }

                let base = cube_index * 16;
                let mut t = 0;
                while TRIANGLE_TABLE[base + t] >= 0 {
                    for k in 0..3 {
                        let edge = TRIANGLE_TABLE[base + t + k] as usize;
                        let index = dedup_vertex(
                            &mut dedup,
                            &mut vertices,
                            edge_position[edge],
                            inv_size,
                        );
                        indices.push(index);
                    }
                    t += 3;
                }
            }
        }
    }

    let mut mesh = ChunkMesh { vertices, indices };
    recompute_normals(&mut mesh);
    mesh
}

/// Looks up (or appends) the vertex at an exact position.
fn dedup_vertex(
    dedup: &mut FxHashMap<[u32; 3], u32>,
    vertices: &mut Vec<MeshVertex>,
    position: [f32; 3],
    inv_size: [f32; 2],
) -> u32 {
    let key = [
        position[0].to_bits(),
        position[1].to_bits(),
        position[2].to_bits(),
    ];
    *dedup.entry(key).or_insert_with(|| {
        vertices.push(MeshVertex {
            position,
            normal: [0.0; 3],
            uv: [position[0] * inv_size[0], position[2] * inv_size[1]],
        });
        (vertices.len() - 1) as u32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn extents() -> ChunkExtents {
        ChunkExtents {
            size_x: 4,
            size_y: 8,
            size_z: 4,
        }
    }

    /// Density decreasing with height: solid below the surface, air above.
    fn half_space(extents: ChunkExtents, surface_y: f32) -> Vec<f32> {
        let mut density = vec![0.0; extents.sample_count()];
        for z in 0..extents.samples_z() {
            for x in 0..extents.samples_x() {
                for y in 0..extents.samples_y() {
                    density[extents.voxel_index(x, y, z)] = surface_y - y as f32;
                }
            }
        }
        density
    }

    #[test]
    fn test_half_space_surface_height() {
        let extents = extents();
        let mesh = extract(&half_space(extents, 3.5), extents, 0.0);
        assert!(!mesh.is_empty(), "A half space must produce a surface");
        for v in &mesh.vertices {
            assert!(
                (v.position[1] - 3.5).abs() < 1e-5,
                "Surface vertex off the iso height: {:?}",
                v.position
            );
        }
    }

    #[test]
    fn test_vertices_are_deduplicated_and_indices_valid() {
        let extents = extents();
        let mesh = extract(&half_space(extents, 3.25), extents, 0.0);
        let mut positions: FxHashSet<[u32; 3]> = FxHashSet::default();
        for v in &mesh.vertices {
            let key = [
                v.position[0].to_bits(),
                v.position[1].to_bits(),
                v.position[2].to_bits(),
            ];
            assert!(positions.insert(key), "Duplicate vertex at {:?}", v.position);
        }
        assert_eq!(mesh.indices.len() % 3, 0);
        for &i in &mesh.indices {
            assert!(
                (i as usize) < mesh.vertices.len(),
                "Index {i} out of range ({} vertices)",
                mesh.vertices.len()
            );
        }
    }

    #[test]
    fn test_uniform_field_produces_no_mesh() {
        let extents = extents();
        let solid = vec![1.0; extents.sample_count()];
        assert!(extract(&solid, extents, 0.5).is_empty(), "All solid");
        let air = vec![-1.0; extents.sample_count()];
        assert!(extract(&air, extents, 0.5).is_empty(), "All air");
    }

    #[test]
    fn test_pure_floor_lowest_vertex_is_zero() {
        // Bottom row exactly 1.0, everything above strictly below it; with
        // iso at 1.0 the crossing interpolates to exactly y = 0.
        let extents = extents();
        let mut density = vec![0.3; extents.sample_count()];
        for z in 0..extents.samples_z() {
            for x in 0..extents.samples_x() {
                density[extents.voxel_index(x, 0, z)] = 1.0;
            }
        }
        let mesh = extract(&density, extents, 1.0);
        assert!(!mesh.is_empty());
        let lowest = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::INFINITY, f32::min);
        assert_eq!(lowest, 0.0, "Floor crossing must land exactly on y = 0");
    }

    #[test]
    fn test_planar_uv_projection() {
        let extents = extents();
        let mesh = extract(&half_space(extents, 3.5), extents, 0.0);
        for v in &mesh.vertices {
            assert!(
                (v.uv[0] - v.position[0] / extents.size_x as f32).abs() < 1e-6
                    && (v.uv[1] - v.position[2] / extents.size_z as f32).abs() < 1e-6,
                "UV {:?} does not match planar projection of {:?}",
                v.uv,
                v.position
            );
        }
    }
}
