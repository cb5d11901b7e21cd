// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use alloc::boxed::Box;

use crate::types::Aabb2D;
use core::fmt::Debug;

/// Spatial backend abstraction used by `IndexGeneric`.
///
/// Backends only see slot numbers; the owning index maps slots to payloads
/// and generational keys.
pub trait Backend<T: Copy + PartialOrd + Debug> {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>);

    /// Remove a slot from the spatial structure.
    ///
    /// Returns `false` if the slot was not present.
    fn remove(&mut self, slot: usize) -> bool;

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Query slots whose AABB intersects the rectangle.
    fn query_rect<'a>(&'a self, rect: Aabb2D<T>) -> Box<dyn Iterator<Item = usize> + 'a>;

    /// Whether any stored AABB intersects the rectangle.
    fn any_in_rect(&self, rect: Aabb2D<T>) -> bool {
        self.query_rect(rect).next().is_some()
    }
}
