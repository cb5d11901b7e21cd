// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::types::Aabb2D;

/// Flat vector backend with linear scans.
///
/// Slots map directly to vector positions; a removed slot leaves a hole that
/// the owning index refills on its next insertion.
pub struct FlatVec<T: Copy + PartialOrd + Debug> {
    slots: Vec<Option<Aabb2D<T>>>,
    alive: usize,
}

impl<T: Copy + PartialOrd + Debug> Default for FlatVec<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            alive: 0,
        }
    }
}

impl<T: Copy + PartialOrd + Debug> Debug for FlatVec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatVec")
            .field("slots", &self.slots.len())
            .field("alive", &self.alive)
            .finish()
    }
}

impl<T: Copy + PartialOrd + Debug> Backend<T> for FlatVec<T> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        if self.slots[slot].replace(aabb).is_none() {
            self.alive += 1;
        }
    }

    fn remove(&mut self, slot: usize) -> bool {
        let removed = self.slots.get_mut(slot).and_then(Option::take).is_some();
        if removed {
            self.alive -= 1;
        }
        removed
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.alive = 0;
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D<T>) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(
            self.slots
                .iter()
                .enumerate()
                .filter_map(move |(i, slot)| slot.filter(|a| a.intersects(&rect)).map(|_| i)),
        )
    }

    fn any_in_rect(&self, rect: Aabb2D<T>) -> bool {
        self.alive > 0 && self.slots.iter().flatten().any(|a| a.intersects(&rect))
    }
}
