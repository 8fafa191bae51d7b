//! Structure placement and road carving against the deformation ledger.
//!
//! Placement runs per check coordinate: a deterministic RNG stream decides
//! whether a structure spawns, which prefabs it uses, and where its instances
//! land; the resulting density deltas, road overrides, and influence bounds
//! are recorded in the shared [`strata_ledger::DeformationLedger`] so density
//! generation can merge them on the next build of each affected chunk.

mod connect;
mod planner;
mod settings;

pub use connect::connect_nearest;
pub use planner::{column_owners, PlacedStructure, StructurePlanner, TerrainProbe};
pub use settings::{ConnectionMode, PathSettings, StructurePrefabDef, StructureSettings};
