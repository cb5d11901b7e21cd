// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precise geometry, centroids and locators derived from region shapes.

use std::sync::{Arc, Weak};

use geo::coordinate_position::CoordPos;
use geo::{Centroid, Coord, CoordinatePosition, Geometry, Relate, Validation};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::warn;
use understory_hierarchy::{KindSet, ObjectKind, PathObject};
use understory_roi::{Roi, RoiError};

use crate::locator::PointLocator;
use crate::memo::{ShapeEntry, ShapeMap};

struct DerivedEntry {
    roi: Weak<Roi>,
    geometry: OnceCell<Arc<Geometry<f64>>>,
    centroid: OnceCell<Option<Coord<f64>>>,
    locator: OnceCell<Arc<PointLocator>>,
}

impl DerivedEntry {
    fn new(roi: &Arc<Roi>) -> Self {
        Self {
            roi: Arc::downgrade(roi),
            geometry: OnceCell::new(),
            centroid: OnceCell::new(),
            locator: OnceCell::new(),
        }
    }
}

impl ShapeEntry for Arc<DerivedEntry> {
    fn is_live(&self) -> bool {
        self.roi.strong_count() > 0
    }
}

/// Memoized derived geometry keyed by shape identity.
///
/// Only shapes of objects whose kind is in the cache's stable set get an
/// entry; everything else is recomputed on each call and never retained.
/// Each of the three values in an entry is computed at most once, even under
/// concurrent callers, and independently of the others.
///
/// Entries hold weak references to their shapes. Entries of dropped shapes
/// are swept as the cache grows, so replacing a shape over and over does not
/// accumulate geometry. [`purge`](Self::purge) reclaims them eagerly;
/// [`clear`](Self::clear) drops everything.
pub struct GeometryCache {
    stable_kinds: KindSet,
    entries: RwLock<ShapeMap<Arc<DerivedEntry>>>,
}

impl core::fmt::Debug for GeometryCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GeometryCache")
            .field("stable_kinds", &self.stable_kinds)
            .field("entries", &self.len())
            .finish()
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(KindSet::ANNOTATION | KindSet::TMA_CORE)
    }
}

impl GeometryCache {
    /// Create an empty cache retaining entries for `stable_kinds`.
    pub fn new(stable_kinds: KindSet) -> Self {
        Self {
            stable_kinds,
            entries: RwLock::new(ShapeMap::default()),
        }
    }

    /// Kinds whose derived values are retained.
    pub fn stable_kinds(&self) -> KindSet {
        self.stable_kinds
    }

    /// Number of shapes with an entry.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no entry is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose shape no longer exists. Returns how many were dropped.
    pub fn purge(&self) -> usize {
        self.entries.write().purge()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Precise geometry of `roi` as owned by an object of `kind`.
    ///
    /// Invalid geometry (for example a self-intersecting polygon) is logged
    /// and returned anyway. Malformed shape data is returned as an error.
    pub fn geometry(
        &self,
        kind: ObjectKind,
        roi: &Arc<Roi>,
    ) -> Result<Arc<Geometry<f64>>, RoiError> {
        match self.entry(kind, roi) {
            Some(e) => e.geometry.get_or_try_init(|| compute_geometry(roi)).cloned(),
            None => compute_geometry(roi),
        }
    }

    /// Centroid of `roi` as owned by an object of `kind`; `None` if the
    /// geometry has no centroid (for example an empty point set).
    pub fn centroid(
        &self,
        kind: ObjectKind,
        roi: &Arc<Roi>,
    ) -> Result<Option<Coord<f64>>, RoiError> {
        match self.entry(kind, roi) {
            Some(e) => e
                .centroid
                .get_or_try_init(|| -> Result<_, RoiError> {
                    let g = e.geometry.get_or_try_init(|| compute_geometry(roi))?;
                    Ok(centroid(g))
                })
                .copied(),
            None => compute_geometry(roi).map(|g| centroid(&g)),
        }
    }

    /// Point locator for `roi` as owned by an object of `kind`.
    pub fn locator(
        &self,
        kind: ObjectKind,
        roi: &Arc<Roi>,
    ) -> Result<Arc<PointLocator>, RoiError> {
        match self.entry(kind, roi) {
            Some(e) => e
                .locator
                .get_or_try_init(|| -> Result<_, RoiError> {
                    let g = e.geometry.get_or_try_init(|| compute_geometry(roi))?;
                    Ok(Arc::new(PointLocator::new(g)))
                })
                .cloned(),
            None => compute_geometry(roi).map(|g| Arc::new(PointLocator::new(&g))),
        }
    }

    /// Precise geometry of an object's region, if it has one.
    pub fn geometry_of(
        &self,
        object: &PathObject,
    ) -> Result<Option<Arc<Geometry<f64>>>, RoiError> {
        object
            .roi()
            .map(|roi| self.geometry(object.kind(), roi))
            .transpose()
    }

    /// Centroid of an object, located on its nucleus when it has one.
    pub fn centroid_of(&self, object: &PathObject) -> Result<Option<Coord<f64>>, RoiError> {
        match object.centroid_roi() {
            Some(roi) => self.centroid(object.kind(), roi),
            None => Ok(None),
        }
    }

    /// Point locator for an object's region, if it has one.
    pub fn locator_of(
        &self,
        object: &PathObject,
    ) -> Result<Option<Arc<PointLocator>>, RoiError> {
        object
            .roi()
            .map(|roi| self.locator(object.kind(), roi))
            .transpose()
    }

    /// True if the whole of `child`'s shape lies on or inside `parent`'s.
    ///
    /// Objects without a region cover nothing and are covered by nothing.
    pub fn covers(&self, parent: &PathObject, child: &PathObject) -> Result<bool, RoiError> {
        let (Some(p), Some(c)) = (self.geometry_of(parent)?, self.geometry_of(child)?) else {
            return Ok(false);
        };
        Ok(p.relate(&*c).is_covers())
    }

    /// True if `child`'s centroid lies on or inside `parent`'s shape.
    ///
    /// Detections are tested once against the precise geometry; other kinds
    /// go through the parent's (possibly cached) locator, which pays off when
    /// many children are tested against the same parent.
    pub fn contains_centroid(
        &self,
        parent: &PathObject,
        child: &PathObject,
    ) -> Result<bool, RoiError> {
        let Some(roi) = parent.roi() else {
            return Ok(false);
        };
        let Some(c) = self.centroid_of(child)? else {
            return Ok(false);
        };
        if child.kind().is_detection() {
            let g = self.geometry(parent.kind(), roi)?;
            Ok(g.coordinate_position(&c) != CoordPos::Outside)
        } else {
            Ok(self.locator(parent.kind(), roi)?.contains(c))
        }
    }

    fn entry(&self, kind: ObjectKind, roi: &Arc<Roi>) -> Option<Arc<DerivedEntry>> {
        if !self.stable_kinds.contains_kind(kind) {
            return None;
        }
        if let Some(e) = self.entries.read().get(roi.id()) {
            return Some(e.clone());
        }
        let mut entries = self.entries.write();
        Some(
            entries
                .get_or_insert_with(roi.id(), || Arc::new(DerivedEntry::new(roi)))
                .clone(),
        )
    }
}

fn compute_geometry(roi: &Roi) -> Result<Arc<Geometry<f64>>, RoiError> {
    let g = roi.to_geometry()?;
    if !g.is_valid() {
        warn!(
            roi = roi.id().get(),
            shape = roi.shape().name(),
            "invalid geometry, using it anyway"
        );
    }
    Ok(Arc::new(g))
}

fn centroid(g: &Geometry<f64>) -> Option<Coord<f64>> {
    g.centroid().map(|p| p.0)
}
