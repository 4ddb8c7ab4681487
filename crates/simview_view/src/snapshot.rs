//! Snapshot cache state.

/// The cached flat copy of a container's current views.
///
/// The two states are explicit so "must rebuild" can never be forgotten:
/// membership changes set the cache to [`SnapshotCache::Stale`]; the next read
/// rebuilds it. In-place updates to existing views leave a valid cache alone.
#[derive(Debug)]
pub enum SnapshotCache<V> {
    /// Must be rebuilt on the next read.
    Stale,
    /// Holds exactly the mapping's value set, in some stable order.
    Valid(Vec<V>),
}

impl<V> SnapshotCache<V> {
    /// Mark the cache stale. Called whenever the key set of the backing
    /// mapping changes.
    pub fn invalidate(&mut self) {
        *self = SnapshotCache::Stale;
    }

    /// Returns `true` if a read would not rebuild.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, SnapshotCache::Valid(_))
    }

    /// Return the cached sequence, rebuilding it first if stale.
    ///
    /// Repeated calls without an intervening [`SnapshotCache::invalidate`]
    /// return the same backing allocation.
    pub fn get_or_rebuild(&mut self, rebuild: impl FnOnce() -> Vec<V>) -> &[V] {
        if matches!(self, SnapshotCache::Stale) {
            *self = SnapshotCache::Valid(rebuild());
        }
        match self {
            SnapshotCache::Valid(views) => views,
            SnapshotCache::Stale => &[],
        }
    }
}

impl<V> Default for SnapshotCache<V> {
    fn default() -> Self {
        SnapshotCache::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_happens_once() {
        let mut cache: SnapshotCache<u32> = SnapshotCache::Stale;
        let mut rebuilds = 0;

        let first = cache.get_or_rebuild(|| {
            rebuilds += 1;
            vec![1, 2, 3]
        }).as_ptr();
        assert!(cache.is_valid());

        let second = cache.get_or_rebuild(|| {
            rebuilds += 1;
            vec![9]
        }).as_ptr();

        assert_eq!(rebuilds, 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut cache: SnapshotCache<u32> = SnapshotCache::Stale;
        cache.get_or_rebuild(|| vec![1]);
        cache.invalidate();
        assert!(!cache.is_valid());
        assert_eq!(cache.get_or_rebuild(|| vec![2]), &[2]);
    }
}
