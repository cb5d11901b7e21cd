// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-object payload stored in a hierarchy.

use std::sync::Arc;

use understory_roi::Roi;

use crate::types::ObjectKind;

/// An object's kind and region.
///
/// Regions are shared through `Arc<Roi>`; a `Roi` never changes, so changing
/// an object's region means giving it a new `Roi`
/// (see [`Hierarchy::set_roi`](crate::Hierarchy::set_roi)).
#[derive(Clone, Debug)]
pub struct PathObject {
    kind: ObjectKind,
    roi: Option<Arc<Roi>>,
    nucleus_roi: Option<Arc<Roi>>,
}

impl PathObject {
    /// Object of any kind, with an optional region.
    pub fn new(kind: ObjectKind, roi: Option<Arc<Roi>>) -> Self {
        Self {
            kind,
            roi,
            nucleus_roi: None,
        }
    }

    /// Annotation.
    pub fn annotation(roi: Roi) -> Self {
        Self::new(ObjectKind::Annotation, Some(Arc::new(roi)))
    }

    /// Generic detection.
    pub fn detection(roi: Roi) -> Self {
        Self::new(ObjectKind::Detection, Some(Arc::new(roi)))
    }

    /// Cell with an optional nucleus.
    pub fn cell(roi: Roi, nucleus: Option<Roi>) -> Self {
        Self {
            kind: ObjectKind::Cell,
            roi: Some(Arc::new(roi)),
            nucleus_roi: nucleus.map(Arc::new),
        }
    }

    /// Tile.
    pub fn tile(roi: Roi) -> Self {
        Self::new(ObjectKind::Tile, Some(Arc::new(roi)))
    }

    /// Ephemeral processing tile.
    pub fn temporary(roi: Roi) -> Self {
        Self::new(ObjectKind::Temporary, Some(Arc::new(roi)))
    }

    /// TMA core.
    pub fn tma_core(roi: Roi) -> Self {
        Self::new(ObjectKind::TmaCore, Some(Arc::new(roi)))
    }

    /// Region-less grouping object.
    pub fn group() -> Self {
        Self::new(ObjectKind::Other, None)
    }

    /// Kind.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether the object has a region.
    pub fn has_roi(&self) -> bool {
        self.roi.is_some()
    }

    /// Region, if any.
    pub fn roi(&self) -> Option<&Arc<Roi>> {
        self.roi.as_ref()
    }

    /// Nucleus region; only cells carry one.
    pub fn nucleus_roi(&self) -> Option<&Arc<Roi>> {
        self.nucleus_roi.as_ref()
    }

    /// The region whose centroid locates this object: the nucleus if there
    /// is one, otherwise the main region.
    pub fn centroid_roi(&self) -> Option<&Arc<Roi>> {
        self.nucleus_roi.as_ref().or(self.roi.as_ref())
    }

    pub(crate) fn set_roi(&mut self, roi: Option<Arc<Roi>>) {
        self.roi = roi;
    }
}
