// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region queries and pairwise containment predicates.

use std::collections::HashSet;

use understory_hierarchy::{ObjectId, ObjectKind, ObjectTree, PathObject};
use understory_roi::{ImageRegion, RoiError};

use crate::cache::TileCache;
use crate::envelope::region_envelope;
use crate::filter::KindFilter;

impl TileCache {
    /// Objects of `kind` whose bounding box intersects `region`.
    ///
    /// `None` for `kind` matches every kind; `include_subkinds` widens a kind
    /// to its subkinds. `None` for `region` matches every object with a
    /// region. Rebuilds first if the cache is stale.
    ///
    /// Results are over-approximate: a match means the bounding boxes
    /// intersect, not the shapes.
    pub fn objects_for_region(
        &self,
        tree: &dyn ObjectTree,
        kind: Option<ObjectKind>,
        region: Option<&ImageRegion>,
        include_subkinds: bool,
    ) -> HashSet<ObjectId> {
        self.objects_for_filter_into(
            tree,
            KindFilter::from_parts(kind, include_subkinds),
            region,
            HashSet::new(),
        )
    }

    /// [`objects_for_region`](Self::objects_for_region) with an explicit filter.
    pub fn objects_for_filter(
        &self,
        tree: &dyn ObjectTree,
        filter: KindFilter,
        region: Option<&ImageRegion>,
    ) -> HashSet<ObjectId> {
        self.objects_for_filter_into(tree, filter, region, HashSet::new())
    }

    /// Add matches to `out` and return it.
    ///
    /// With an order-preserving collection such as `Vec`, an object already
    /// in `out` is added again.
    pub fn objects_for_filter_into<C: Extend<ObjectId>>(
        &self,
        tree: &dyn ObjectTree,
        filter: KindFilter,
        region: Option<&ImageRegion>,
        mut out: C,
    ) -> C {
        let envelope = region_envelope(region);
        self.fresh(tree).registry.query_into(filter, envelope, &mut out);
        out
    }

    /// Whether any object would match
    /// [`objects_for_region`](Self::objects_for_region). Stops at the first hit.
    pub fn has_objects_for_region(
        &self,
        tree: &dyn ObjectTree,
        kind: Option<ObjectKind>,
        region: Option<&ImageRegion>,
        include_subkinds: bool,
    ) -> bool {
        self.has_objects_for_filter(tree, KindFilter::from_parts(kind, include_subkinds), region)
    }

    /// [`has_objects_for_region`](Self::has_objects_for_region) with an explicit filter.
    pub fn has_objects_for_filter(
        &self,
        tree: &dyn ObjectTree,
        filter: KindFilter,
        region: Option<&ImageRegion>,
    ) -> bool {
        let envelope = region_envelope(region);
        self.fresh(tree).registry.has_any(filter, envelope)
    }

    /// True if `child`'s whole shape lies on or inside `parent`'s.
    ///
    /// Uses the derived-geometry cache only; the registry lock is not taken.
    pub fn covers(&self, parent: &PathObject, child: &PathObject) -> Result<bool, RoiError> {
        self.geometry.covers(parent, child)
    }

    /// True if `child`'s centroid lies on or inside `parent`'s shape.
    ///
    /// Uses the derived-geometry cache only; the registry lock is not taken.
    pub fn contains_centroid(
        &self,
        parent: &PathObject,
        child: &PathObject,
    ) -> Result<bool, RoiError> {
        self.geometry.contains_centroid(parent, child)
    }
}
