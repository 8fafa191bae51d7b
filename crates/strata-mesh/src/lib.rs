//! Marching-cubes mesh extraction for chunk density fields.

mod marching;
mod normals;
mod tables;
mod vertex;

pub use marching::extract;
pub use normals::recompute_normals;
pub use vertex::{ChunkMesh, MeshVertex};
