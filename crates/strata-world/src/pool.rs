//! Instance pool bookkeeping per object type.

use rustc_hash::FxHashMap;
use strata_biome::ObjectTypeId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances currently spawned into the scene.
    pub live: usize,
    /// Instances parked for reuse.
    pub pooled: usize,
}

/// Tracks pooled scatter instances per object type id. Owned by the world
/// and passed wherever spawning happens; despawned instances return to the
/// pool instead of being dropped.
#[derive(Debug, Default)]
pub struct PoolManager {
    pools: FxHashMap<ObjectTypeId, PoolStats>,
}

impl PoolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes `count` instances live, reusing pooled ones first.
    pub fn spawn(&mut self, id: ObjectTypeId, count: usize) {
        let stats = self.pools.entry(id).or_default();
        let reused = stats.pooled.min(count);
        stats.pooled -= reused;
        stats.live += count;
    }

    /// Returns `count` live instances to the pool.
    pub fn release(&mut self, id: ObjectTypeId, count: usize) {
        let stats = self.pools.entry(id).or_default();
        let released = stats.live.min(count);
        stats.live -= released;
        stats.pooled += released;
    }

    pub fn stats(&self, id: ObjectTypeId) -> PoolStats {
        self.pools.get(&id).copied().unwrap_or_default()
    }

    pub fn live_total(&self) -> usize {
        self.pools.values().map(|s| s.live).sum()
    }

    /// Drops every pool, live and parked.
    pub fn clear(&mut self) {
        self.pools.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_parks_instances_for_reuse() {
        let mut pools = PoolManager::new();
        let id = ObjectTypeId(3);
        pools.spawn(id, 10);
        pools.release(id, 4);
        assert_eq!(pools.stats(id), PoolStats { live: 6, pooled: 4 });

        pools.spawn(id, 6);
        let stats = pools.stats(id);
        assert_eq!(stats.live, 12);
        assert_eq!(stats.pooled, 0, "Spawning must drain the pool first");
    }

    #[test]
    fn test_release_caps_at_live_count() {
        let mut pools = PoolManager::new();
        let id = ObjectTypeId(3);
        pools.spawn(id, 2);
        pools.release(id, 100);
        assert_eq!(pools.stats(id), PoolStats { live: 0, pooled: 2 });
    }

    #[test]
    fn test_pools_are_independent_per_type() {
        let mut pools = PoolManager::new();
        pools.spawn(ObjectTypeId(1), 5);
        pools.spawn(ObjectTypeId(2), 3);
        pools.release(ObjectTypeId(1), 5);
        assert_eq!(pools.stats(ObjectTypeId(2)).live, 3);
        assert_eq!(pools.live_total(), 3);
    }
}
