//! Live chunk record and its lifecycle states.

use rustc_hash::{FxHashMap, FxHashSet};
use strata_biome::ObjectTypeId;
use strata_coords::ChunkCoord;
use strata_field::ChunkFields;
use strata_mesh::ChunkMesh;
use strata_scatter::ScatterBatches;

/// Lifecycle of one chunk coordinate. Queueing has no variant: a missing
/// coordinate inside the retention radius is the queue, and the chunk
/// record only exists once its build starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Generating,
    Live,
    Despawning,
    Disposed,
}

/// One generated chunk: its field buffers, extracted mesh, scatter
/// transform batches, and per-type combined meshes.
#[derive(Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub state: ChunkState,
    pub fields: ChunkFields,
    pub mesh: ChunkMesh,
    /// Transform batches keyed by object type.
    pub batches: ScatterBatches,
    /// Merged static mesh per combinable object type.
    pub combined: FxHashMap<ObjectTypeId, ChunkMesh>,
    /// Object types whose instances are currently spawned (inside their
    /// cull distance).
    pub visible_types: FxHashSet<ObjectTypeId>,
    pub collider_baked: bool,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, fields: ChunkFields, mesh: ChunkMesh) -> Self {
        Self {
            coord,
            state: ChunkState::Generating,
            fields,
            mesh,
            batches: ScatterBatches::default(),
            combined: FxHashMap::default(),
            visible_types: FxHashSet::default(),
            collider_baked: false,
        }
    }

    pub fn instance_count(&self, id: ObjectTypeId) -> usize {
        self.batches.get(&id).map_or(0, Vec::len)
    }
}
