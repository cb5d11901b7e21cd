// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend for `f64` coordinates, backed by [`rstar`].
//!
//! Each slot remembers the exact box it was stored under, so removal is a
//! targeted lookup rather than a scan.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use rstar::{AABB, RTree, RTreeObject};

use crate::backend::Backend;
use crate::types::Aabb2D;

#[derive(Copy, Clone, Debug, PartialEq)]
struct SlotBox {
    slot: usize,
    aabb: Aabb2D<f64>,
}

impl RTreeObject for SlotBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_envelope(self.aabb)
    }
}

fn to_envelope(a: Aabb2D<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([a.min_x, a.min_y], [a.max_x, a.max_y])
}

/// R-tree backend over `f64` boxes.
#[derive(Default)]
pub struct RTreeF64 {
    tree: RTree<SlotBox>,
    boxes: Vec<Option<Aabb2D<f64>>>,
}

impl RTreeF64 {
    /// Build a backend in one pass from `(slot, aabb)` pairs.
    pub fn bulk_load(pairs: &[(usize, Aabb2D<f64>)]) -> Self {
        let mut boxes = Vec::new();
        let mut items = Vec::with_capacity(pairs.len());
        for &(slot, aabb) in pairs {
            if boxes.len() <= slot {
                boxes.resize_with(slot + 1, || None);
            }
            boxes[slot] = Some(aabb);
            items.push(SlotBox { slot, aabb });
        }
        Self {
            tree: RTree::bulk_load(items),
            boxes,
        }
    }
}

impl Debug for RTreeF64 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RTreeF64")
            .field("size", &self.tree.size())
            .field("slots", &self.boxes.len())
            .finish_non_exhaustive()
    }
}

impl Backend<f64> for RTreeF64 {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<f64>) {
        if self.boxes.len() <= slot {
            self.boxes.resize_with(slot + 1, || None);
        }
        if let Some(old) = self.boxes[slot].replace(aabb) {
            let _ = self.tree.remove(&SlotBox { slot, aabb: old });
        }
        self.tree.insert(SlotBox { slot, aabb });
    }

    fn remove(&mut self, slot: usize) -> bool {
        let Some(aabb) = self.boxes.get_mut(slot).and_then(Option::take) else {
            return false;
        };
        self.tree.remove(&SlotBox { slot, aabb }).is_some()
    }

    fn clear(&mut self) {
        self.tree = RTree::new();
        self.boxes.clear();
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D<f64>) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.tree
                .locate_in_envelope_intersecting(&to_envelope(rect))
                .map(|b| b.slot),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_query_remove() {
        let mut b = RTreeF64::default();
        b.insert(0, Aabb2D::from_xywh(0.0, 0.0, 10.0, 10.0));
        b.insert(1, Aabb2D::from_xywh(100.0, 100.0, 10.0, 10.0));
        let hits: Vec<_> = b.query_rect(Aabb2D::from_xywh(5.0, 5.0, 1.0, 1.0)).collect();
        assert_eq!(hits, [0]);
        assert!(b.remove(0), "stored slot is removable");
        assert!(!b.remove(0), "second removal reports absence");
        assert!(!b.any_in_rect(Aabb2D::from_xywh(5.0, 5.0, 1.0, 1.0)));
        assert!(b.any_in_rect(Aabb2D::EVERYTHING), "slot 1 is still present");
    }

    #[test]
    fn reinserting_a_slot_replaces_its_box() {
        let mut b = RTreeF64::default();
        b.insert(3, Aabb2D::from_xywh(0.0, 0.0, 1.0, 1.0));
        b.insert(3, Aabb2D::from_xywh(50.0, 50.0, 1.0, 1.0));
        assert_eq!(b.query_rect(Aabb2D::EVERYTHING).count(), 1);
        assert!(!b.any_in_rect(Aabb2D::from_xywh(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn bulk_load_matches_incremental() {
        let pairs: Vec<_> = (0..64)
            .map(|i| (i, Aabb2D::from_xywh(i as f64 * 10.0, 0.0, 5.0, 5.0)))
            .collect();
        let b = RTreeF64::bulk_load(&pairs);
        let mut hits: Vec<_> = b
            .query_rect(Aabb2D::new(0.0, 0.0, 32.0, 1.0))
            .collect();
        hits.sort_unstable();
        assert_eq!(hits, [0, 1, 2, 3]);
    }
}
