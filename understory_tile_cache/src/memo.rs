// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shape-keyed memo storage shared by the envelope and geometry caches.

use hashbrown::HashMap;
use tracing::trace;
use understory_roi::RoiId;

/// Size below which a memo is never swept.
pub(crate) const MIN_SWEEP_LEN: usize = 64;

/// A memoized value that can tell whether its shape still exists.
pub(crate) trait ShapeEntry {
    fn is_live(&self) -> bool;
}

/// Map from shape identity to a memoized value.
///
/// Adding a shape to a map at its sweep threshold first drops the entries of
/// dead shapes and resets the threshold to twice the surviving count. The map
/// stays within about twice its live shapes (or [`MIN_SWEEP_LEN`]) without a
/// separate purge, at amortized constant cost per insert.
pub(crate) struct ShapeMap<V> {
    entries: HashMap<RoiId, V>,
    sweep_at: usize,
}

impl<V> Default for ShapeMap<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_LEN,
        }
    }
}

impl<V: ShapeEntry> ShapeMap<V> {
    pub(crate) fn get(&self, id: RoiId) -> Option<&V> {
        self.entries.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Value for `id`, created with `make` if absent.
    pub(crate) fn get_or_insert_with(&mut self, id: RoiId, make: impl FnOnce() -> V) -> &V {
        if self.entries.len() >= self.sweep_at && !self.entries.contains_key(&id) {
            let swept = self.purge();
            trace!(swept, live = self.entries.len(), "swept memo of dropped shapes");
        }
        self.entries.entry(id).or_insert_with(make)
    }

    /// Drop entries whose shape is gone. Returns how many were dropped.
    pub(crate) fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, v| v.is_live());
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP_LEN);
        before - self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.sweep_at = MIN_SWEEP_LEN;
    }
}
