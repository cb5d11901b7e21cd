// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding envelopes and their per-shape memo.

use std::sync::{Arc, Weak};

use kurbo::Rect;
use parking_lot::RwLock;
use understory_index::Aabb2D;
use understory_roi::{ImageRegion, Roi};

use crate::memo::{ShapeEntry, ShapeMap};

/// Axis-aligned bounding rectangle used as the index key.
pub type Envelope = Aabb2D<f64>;

/// Envelope spanning the whole coordinate space.
pub const MAX_ENVELOPE: Envelope = Aabb2D::EVERYTHING;

/// Envelope of a kurbo rectangle.
pub fn rect_envelope(r: Rect) -> Envelope {
    let r = r.abs();
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

/// Query envelope for an optional region; `None` means everything.
pub fn region_envelope(region: Option<&ImageRegion>) -> Envelope {
    region.map_or(MAX_ENVELOPE, |r| rect_envelope(r.bounds()))
}

struct EnvelopeEntry {
    roi: Weak<Roi>,
    envelope: Envelope,
}

impl ShapeEntry for EnvelopeEntry {
    fn is_live(&self) -> bool {
        self.roi.strong_count() > 0
    }
}

/// Memoized envelopes keyed by shape identity.
///
/// An entry holds only a weak reference to its shape, so the memo never keeps
/// a shape alive. Entries for dropped shapes are swept as the memo grows and
/// can be reclaimed eagerly with [`purge`](Self::purge).
#[derive(Default)]
pub struct EnvelopeCache {
    entries: RwLock<ShapeMap<EnvelopeEntry>>,
}

impl core::fmt::Debug for EnvelopeCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnvelopeCache")
            .field("entries", &self.len())
            .finish()
    }
}

impl EnvelopeCache {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelope of `roi`, computed once per shape.
    pub fn envelope_of(&self, roi: &Arc<Roi>) -> Envelope {
        if let Some(e) = self.entries.read().get(roi.id()) {
            return e.envelope;
        }
        let envelope = rect_envelope(roi.bounds());
        self.entries
            .write()
            .get_or_insert_with(roi.id(), || EnvelopeEntry {
                roi: Arc::downgrade(roi),
                envelope,
            })
            .envelope
    }

    /// Number of memoized shapes.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is memoized.
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
}
