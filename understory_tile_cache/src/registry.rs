// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One range structure per object kind, plus the placement of every indexed object.

use hashbrown::HashMap;
use tracing::{debug, warn};
use understory_hierarchy::{KindSet, ObjectId, ObjectKind, ObjectTree};
use understory_index::{Index, Key, RTreeIndex};

use crate::config::IndexBackend;
use crate::envelope::{Envelope, EnvelopeCache};
use crate::filter::KindFilter;

enum KindIndex {
    RTree(RTreeIndex<ObjectId>),
    Flat(Index<f64, ObjectId>),
}

impl KindIndex {
    fn new(backend: IndexBackend) -> Self {
        match backend {
            IndexBackend::RTree => Self::RTree(Index::<f64, ObjectId>::with_rtree()),
            IndexBackend::FlatVec => Self::Flat(Index::new()),
        }
    }

    fn insert(&mut self, envelope: Envelope, id: ObjectId) -> Key {
        match self {
            Self::RTree(i) => i.insert(envelope, id),
            Self::Flat(i) => i.insert(envelope, id),
        }
    }

    fn remove(&mut self, key: Key) -> Option<ObjectId> {
        match self {
            Self::RTree(i) => i.remove(key),
            Self::Flat(i) => i.remove(key),
        }
    }

    fn query_into(&self, envelope: Envelope, out: &mut impl Extend<ObjectId>) {
        match self {
            Self::RTree(i) => out.extend(i.query_rect(envelope).map(|(_, id)| id)),
            Self::Flat(i) => out.extend(i.query_rect(envelope).map(|(_, id)| id)),
        }
    }

    fn any(&self, envelope: Envelope) -> bool {
        match self {
            Self::RTree(i) => i.any_in_rect(envelope),
            Self::Flat(i) => i.any_in_rect(envelope),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::RTree(i) => i.is_empty(),
            Self::Flat(i) => i.is_empty(),
        }
    }
}

/// Where an object was last inserted.
#[derive(Clone, Copy, Debug)]
struct Placement {
    kind: ObjectKind,
    key: Key,
    envelope: Envelope,
}

/// Per-kind indices and object placements.
///
/// Not synchronized; the owning cache guards it with its lock.
pub(crate) struct Registry {
    backend: IndexBackend,
    indices: [Option<KindIndex>; ObjectKind::COUNT],
    placements: HashMap<ObjectId, Placement>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("backend", &self.backend)
            .field("kinds", &self.indexed_kinds())
            .field("objects", &self.placements.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub(crate) fn new(backend: IndexBackend) -> Self {
        Self {
            backend,
            indices: [const { None }; ObjectKind::COUNT],
            placements: HashMap::new(),
        }
    }

    /// Number of indexed objects.
    pub(crate) fn len(&self) -> usize {
        self.placements.len()
    }

    /// Kinds with at least one indexed object.
    pub(crate) fn indexed_kinds(&self) -> KindSet {
        ObjectKind::ALL
            .into_iter()
            .filter(|k| self.indices[k.index()].as_ref().is_some_and(|i| !i.is_empty()))
            .collect()
    }

    /// Envelope `id` was last inserted under.
    pub(crate) fn last_envelope(&self, id: ObjectId) -> Option<Envelope> {
        self.placements.get(&id).map(|p| p.envelope)
    }

    /// Drop every index and placement.
    pub(crate) fn clear(&mut self) {
        self.indices = [const { None }; ObjectKind::COUNT];
        self.placements.clear();
    }

    /// Index `id` (if it has a region) and, with `include_children`, its
    /// descendants. The subtree below a temporary object is skipped.
    pub(crate) fn insert(
        &mut self,
        tree: &dyn ObjectTree,
        id: ObjectId,
        include_children: bool,
        envelopes: &EnvelopeCache,
    ) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(object) = tree.object(cur) else {
                continue;
            };
            if let Some(roi) = object.roi() {
                self.insert_one(cur, object.kind(), envelopes.envelope_of(roi));
            }
            if include_children && !object.kind().is_temporary() {
                stack.extend(tree.children(cur).iter().rev());
            }
        }
    }

    /// Remove `id` and, with `include_children`, all of its descendants.
    /// Objects that were never indexed are skipped.
    ///
    /// Unlike [`insert`](Self::insert), this walks below temporary objects:
    /// a child announced on its own is indexed even under a temporary parent.
    pub(crate) fn remove(&mut self, tree: &dyn ObjectTree, id: ObjectId, include_children: bool) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            self.remove_one(cur);
            if include_children {
                stack.extend(tree.children(cur).iter().rev());
            }
        }
    }

    /// Objects of matching kinds whose envelope intersects `envelope`.
    pub(crate) fn query_into(
        &self,
        filter: KindFilter,
        envelope: Envelope,
        out: &mut impl Extend<ObjectId>,
    ) {
        for kind in filter.kinds().kinds() {
            if let Some(index) = &self.indices[kind.index()] {
                index.query_into(envelope, out);
            }
        }
    }

    /// Whether any object of a matching kind intersects `envelope`.
    pub(crate) fn has_any(&self, filter: KindFilter, envelope: Envelope) -> bool {
        filter
            .kinds()
            .kinds()
            .filter_map(|kind| self.indices[kind.index()].as_ref())
            .any(|index| index.any(envelope))
    }

    fn insert_one(&mut self, id: ObjectId, kind: ObjectKind, envelope: Envelope) {
        // An object is filed at most once, even if it is inserted again under a new envelope.
        self.remove_one(id);
        if !is_finite(envelope) {
            warn!(?id, ?kind, ?envelope, "non-finite envelope, object not indexed");
            return;
        }
        let backend = self.backend;
        let key = self.indices[kind.index()]
            .get_or_insert_with(|| KindIndex::new(backend))
            .insert(envelope, id);
        self.placements.insert(id, Placement { kind, key, envelope });
    }

    fn remove_one(&mut self, id: ObjectId) -> bool {
        let Some(placement) = self.placements.remove(&id) else {
            return false;
        };
        let removed = self.indices[placement.kind.index()]
            .as_mut()
            .and_then(|index| index.remove(placement.key));
        if removed.is_some() {
            debug!(?id, kind = ?placement.kind, "removed from spatial index");
            true
        } else {
            debug!(?id, kind = ?placement.kind, "object missing from its spatial index");
            false
        }
    }
}

fn is_finite(e: Envelope) -> bool {
    [e.min_x, e.min_y, e.max_x, e.max_y]
        .into_iter()
        .all(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use understory_hierarchy::{Hierarchy, PathObject};
    use understory_roi::Roi;

    fn everything(reg: &Registry, filter: KindFilter) -> Vec<ObjectId> {
        let mut out = Vec::new();
        reg.query_into(filter, crate::envelope::MAX_ENVELOPE, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn temporary_subtree_is_not_indexed() {
        let mut h = Hierarchy::new();
        let tile = h
            .add_object(h.root(), PathObject::temporary(Roi::rectangle(0.0, 0.0, 100.0, 100.0)))
            .unwrap();
        let inner = h
            .add_object(tile, PathObject::detection(Roi::rectangle(1.0, 1.0, 1.0, 1.0)))
            .unwrap();
        let envs = EnvelopeCache::new();
        for backend in [IndexBackend::RTree, IndexBackend::FlatVec] {
            let mut reg = Registry::new(backend);
            reg.insert(&h, h.root(), true, &envs);
            assert_eq!(everything(&reg, KindFilter::Any), [tile]);
            assert!(reg.last_envelope(inner).is_none());
            assert_eq!(reg.indexed_kinds(), KindSet::TEMPORARY);
        }
    }

    #[test]
    fn region_less_objects_are_traversed_not_indexed() {
        let mut h = Hierarchy::new();
        let group = h.add_object(h.root(), PathObject::group()).unwrap();
        let det = h
            .add_object(group, PathObject::detection(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let mut reg = Registry::new(IndexBackend::RTree);
        reg.insert(&h, h.root(), true, &EnvelopeCache::new());
        assert_eq!(everything(&reg, KindFilter::Any), [det]);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn reinsert_keeps_one_entry() {
        let mut h = Hierarchy::new();
        let a = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let envs = EnvelopeCache::new();
        let mut reg = Registry::new(IndexBackend::RTree);
        reg.insert(&h, a, false, &envs);
        h.set_roi_without_event(a, Some(Arc::new(Roi::rectangle(50.0, 50.0, 1.0, 1.0))))
            .unwrap();
        reg.insert(&h, a, false, &envs);
        assert_eq!(everything(&reg, KindFilter::Any), [a]);
        assert_eq!(reg.last_envelope(a), Some(Envelope::new(50.0, 50.0, 51.0, 51.0)));
    }

    #[test]
    fn removal_ignores_current_bounds() {
        let mut h = Hierarchy::new();
        let a = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let mut reg = Registry::new(IndexBackend::RTree);
        reg.insert(&h, a, false, &EnvelopeCache::new());
        // Shape swapped after insertion; removal still finds the stored entry.
        h.set_roi_without_event(a, Some(Arc::new(Roi::rectangle(90.0, 90.0, 1.0, 1.0))))
            .unwrap();
        reg.remove(&h, a, false);
        assert!(everything(&reg, KindFilter::Any).is_empty());
        assert!(!reg.has_any(KindFilter::Any, crate::envelope::MAX_ENVELOPE));
    }

    #[test]
    fn filters_select_kind_indices() {
        let mut h = Hierarchy::new();
        let a = h
            .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 10.0, 10.0)))
            .unwrap();
        let c = h
            .add_object(a, PathObject::cell(Roi::rectangle(1.0, 1.0, 1.0, 1.0), None))
            .unwrap();
        let mut reg = Registry::new(IndexBackend::FlatVec);
        reg.insert(&h, h.root(), true, &EnvelopeCache::new());
        assert!(everything(&reg, KindFilter::Exact(ObjectKind::Detection)).is_empty());
        assert_eq!(everything(&reg, KindFilter::WithSubkinds(ObjectKind::Detection)), [c]);
        assert_eq!(everything(&reg, KindFilter::Exact(ObjectKind::Annotation)), [a]);
        assert!(!reg.has_any(KindFilter::Exact(ObjectKind::TmaCore), crate::envelope::MAX_ENVELOPE));
    }

    #[test]
    fn removal_reaches_below_temporary_objects() {
        let mut h = Hierarchy::new();
        let tile = h
            .add_object(h.root(), PathObject::temporary(Roi::rectangle(0.0, 0.0, 100.0, 100.0)))
            .unwrap();
        let inner = h
            .add_object(tile, PathObject::detection(Roi::rectangle(1.0, 1.0, 1.0, 1.0)))
            .unwrap();
        let envs = EnvelopeCache::new();
        for backend in [IndexBackend::RTree, IndexBackend::FlatVec] {
            let mut reg = Registry::new(backend);
            reg.insert(&h, tile, true, &envs);
            // Indexed on its own, as a single ADDED event would.
            reg.insert(&h, inner, true, &envs);
            assert_eq!(reg.len(), 2);
            reg.remove(&h, tile, true);
            assert!(everything(&reg, KindFilter::Any).is_empty());
            assert_eq!(reg.len(), 0);
        }
    }

    #[test]
    fn non_finite_envelopes_are_skipped() {
        let mut h = Hierarchy::new();
        let good = h
            .add_object(h.root(), PathObject::detection(Roi::rectangle(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        let bad = h
            .add_object(h.root(), PathObject::detection(Roi::rectangle(f64::NAN, 0.0, 1.0, 1.0)))
            .unwrap();
        let far = h
            .add_object(
                h.root(),
                PathObject::detection(Roi::rectangle(0.0, f64::INFINITY, 1.0, 1.0)),
            )
            .unwrap();
        let envs = EnvelopeCache::new();
        for backend in [IndexBackend::RTree, IndexBackend::FlatVec] {
            let mut reg = Registry::new(backend);
            reg.insert(&h, h.root(), true, &envs);
            assert_eq!(everything(&reg, KindFilter::Any), [good]);
            assert!(reg.last_envelope(bad).is_none());
            assert!(reg.last_envelope(far).is_none());
        }
    }
}
