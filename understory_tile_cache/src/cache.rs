// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cache object and its stale/fresh lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, trace};
use understory_hierarchy::{Hierarchy, HierarchyId, KindSet, ListenerId, ObjectId, ObjectTree};

use crate::config::TileCacheConfig;
use crate::derived::GeometryCache;
use crate::envelope::{Envelope, EnvelopeCache};
use crate::registry::Registry;

/// Registry plus the flag saying whether it reflects the hierarchy.
#[derive(Debug)]
pub(crate) struct CacheState {
    pub(crate) active: bool,
    pub(crate) registry: Registry,
}

/// Spatial cache over one [`Hierarchy`].
///
/// The cache starts stale. The first query rebuilds it from the whole tree;
/// after that, hierarchy events either update it in place or mark it stale
/// again, and the next query rebuilds. See [`EventAction`](crate::EventAction)
/// for the event policy.
///
/// Registry state sits behind one reader/writer lock. Queries share it;
/// rebuilds and event updates hold it exclusively. Derived geometry and
/// envelopes live in separate, internally synchronized caches that may be
/// shared between cache instances.
///
/// Queries take the hierarchy as an [`ObjectTree`] argument. Callers that
/// share a hierarchy between threads must lock the hierarchy before the cache,
/// which is the order events already follow.
pub struct TileCache {
    hierarchy: HierarchyId,
    config: TileCacheConfig,
    pub(crate) state: RwLock<CacheState>,
    pub(crate) envelopes: Arc<EnvelopeCache>,
    pub(crate) geometry: Arc<GeometryCache>,
    listener: OnceCell<ListenerId>,
    rebuilds: AtomicU64,
}

impl core::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileCache")
            .field("hierarchy", &self.hierarchy)
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .field("envelopes", &self.envelopes)
            .field("geometry", &self.geometry)
            .field("rebuilds", &self.rebuild_count())
            .finish_non_exhaustive()
    }
}

impl TileCache {
    /// Create a cache for `hierarchy` and subscribe it to the hierarchy's events.
    pub fn attach(hierarchy: &mut Hierarchy, config: TileCacheConfig) -> Arc<Self> {
        let geometry = Arc::new(GeometryCache::new(config.stable_kinds));
        Self::attach_with_caches(hierarchy, config, Arc::new(EnvelopeCache::new()), geometry)
    }

    /// Like [`attach`](Self::attach), but sharing existing envelope and
    /// derived-geometry caches. The geometry cache's own stable kinds apply.
    pub fn attach_with_caches(
        hierarchy: &mut Hierarchy,
        config: TileCacheConfig,
        envelopes: Arc<EnvelopeCache>,
        geometry: Arc<GeometryCache>,
    ) -> Arc<Self> {
        let cache = Arc::new(Self {
            hierarchy: hierarchy.hierarchy_id(),
            config,
            state: RwLock::new(CacheState {
                active: false,
                registry: Registry::new(config.index_backend),
            }),
            envelopes,
            geometry,
            listener: OnceCell::new(),
            rebuilds: AtomicU64::new(0),
        });
        let id = hierarchy.subscribe(cache.clone());
        let _ = cache.listener.set(id);
        cache
    }

    /// Stop receiving events from `hierarchy` and mark the cache stale.
    ///
    /// Returns false if the cache was not subscribed to it.
    pub fn detach(&self, hierarchy: &mut Hierarchy) -> bool {
        if hierarchy.hierarchy_id() != self.hierarchy {
            return false;
        }
        let detached = self
            .listener
            .get()
            .is_some_and(|id| hierarchy.unsubscribe(*id));
        self.reset_cache();
        detached
    }

    /// Configuration in use.
    pub fn config(&self) -> &TileCacheConfig {
        &self.config
    }

    /// Shared envelope memo.
    pub fn envelope_cache(&self) -> &Arc<EnvelopeCache> {
        &self.envelopes
    }

    /// Shared derived-geometry cache.
    pub fn geometry_cache(&self) -> &Arc<GeometryCache> {
        &self.geometry
    }

    /// Whether the registry currently reflects the hierarchy.
    pub fn is_active(&self) -> bool {
        self.state.read().active
    }

    /// Mark the cache stale; the next query rebuilds it.
    pub fn reset_cache(&self) {
        trace!("tile cache reset");
        self.state.write().active = false;
    }

    /// Rebuild now if stale.
    pub fn refresh(&self, tree: &dyn ObjectTree) {
        drop(self.fresh(tree));
    }

    /// Number of indexed objects, as of the last rebuild or event.
    pub fn len(&self) -> usize {
        self.state.read().registry.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kinds with at least one indexed object.
    pub fn indexed_kinds(&self) -> KindSet {
        self.state.read().registry.indexed_kinds()
    }

    /// How many full rebuilds this cache has run.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Envelope an object was last indexed under.
    pub fn last_envelope(&self, id: ObjectId) -> Option<Envelope> {
        self.state.read().registry.last_envelope(id)
    }

    /// Shared access to a fresh registry, rebuilding first if stale.
    ///
    /// The read guard is released before the write lock is taken and the
    /// staleness check is repeated under the write lock, so concurrent
    /// callers rebuild once and nobody waits on a lock it already holds.
    pub(crate) fn fresh(&self, tree: &dyn ObjectTree) -> RwLockReadGuard<'_, CacheState> {
        debug_assert_eq!(
            tree.hierarchy_id(),
            self.hierarchy,
            "tile cache queried with a hierarchy it is not attached to"
        );
        {
            let state = self.state.read();
            if state.active {
                return state;
            }
        }
        let mut state = self.state.write();
        if !state.active {
            self.rebuild(&mut state, tree);
        }
        RwLockWriteGuard::downgrade(state)
    }

    fn rebuild(&self, state: &mut CacheState, tree: &dyn ObjectTree) {
        let start = Instant::now();
        state.registry.clear();
        state.registry.insert(tree, tree.root(), true, &self.envelopes);
        // Only a complete registry is marked fresh.
        state.active = true;
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        if self.config.purge_on_rebuild {
            let purged = self.envelopes.purge() + self.geometry.purge();
            trace!(purged, "purged entries for dropped shapes");
        }
        info!(
            objects = state.registry.len(),
            seconds = start.elapsed().as_secs_f64(),
            "tile cache rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_hierarchy::PathObject;
    use understory_roi::Roi;

    #[test]
    fn starts_stale_and_rebuilds_on_demand() {
        let mut h = Hierarchy::new();
        let _ = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let cache = TileCache::attach(&mut h, TileCacheConfig::default());
        assert!(!cache.is_active());
        assert!(cache.is_empty(), "nothing indexed before the first rebuild");
        assert_eq!(cache.rebuild_count(), 0);
        cache.refresh(&h);
        assert!(cache.is_active());
        assert_eq!(cache.rebuild_count(), 1);
        cache.refresh(&h);
        assert_eq!(cache.rebuild_count(), 1, "fresh cache is not rebuilt");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.indexed_kinds(), KindSet::ANNOTATION);
    }

    #[test]
    fn rebuild_purges_dropped_shapes() {
        let mut h = Hierarchy::new();
        let a = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let cache = TileCache::attach(&mut h, TileCacheConfig::default());
        cache.refresh(&h);
        assert_eq!(cache.envelope_cache().len(), 1);
        h.remove_object(a).unwrap();
        cache.reset_cache();
        cache.refresh(&h);
        assert!(cache.envelope_cache().is_empty(), "dropped shape purged on rebuild");
    }

    #[test]
    fn detach_stops_events() {
        let mut h = Hierarchy::new();
        let cache = TileCache::attach(&mut h, TileCacheConfig::default());
        cache.refresh(&h);
        assert!(cache.detach(&mut h));
        assert!(!cache.is_active());
        assert!(!cache.detach(&mut h), "already detached");
        let _ = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(cache.is_empty(), "no event reached the detached cache");
        assert_eq!(Arc::strong_count(&cache), 1, "hierarchy released its reference");
    }
}
