// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_index --heading-base-level=0

//! Understory Index: a generic 2D AABB index (range structure).
//!
//! Understory Index is the range-query building block used by the tile cache.
//!
//! - Insert and remove axis-aligned bounding boxes (AABBs) with small `Copy` payloads.
//! - Query by intersecting rectangle, or just ask whether anything intersects.
//! - Remove by generational [`Key`]: removal never depends on the box the caller
//!   *thinks* an entry was stored under.
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! Higher layers compute envelopes and feed them here.
//!
//! Backends are pluggable via a simple trait so you can swap the spatial strategy without API churn.
//! The default backend is a flat vector (linear scan); an `rstar` R-tree backend is
//! available for `f64` coordinates.
//!
//! # Example
//!
//! ```rust
//! use understory_index::{Index, Aabb2D};
//!
//! let mut idx: Index<i64, u32> = Index::new();
//! let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
//! let _k2 = idx.insert(Aabb2D::new(5, 5, 15, 15), 2);
//!
//! let hits: Vec<_> = idx.query_rect(Aabb2D::new(6, 6, 7, 7)).collect();
//! assert_eq!(hits.len(), 2);
//!
//! assert_eq!(idx.remove(k1), Some(1));
//! assert_eq!(idx.query_rect(Aabb2D::new(0, 0, 1, 1)).count(), 0);
//! ```
//!
//! R-tree backed index for `f64` coordinates:
//!
//! ```rust
//! use understory_index::{Index, Aabb2D};
//!
//! let mut idx = Index::<f64, u32>::with_rtree();
//! let _k = idx.insert(Aabb2D::from_xywh(0.0, 0.0, 100.0, 100.0), 1);
//!
//! assert!(idx.any_in_rect(Aabb2D::from_xywh(10.0, 10.0, 1.0, 1.0)));
//! assert!(idx.any_in_rect(Aabb2D::EVERYTHING));
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::RTreeF64;
pub use index::{Index, IndexGeneric, Key, RTreeIndex};
pub use types::Aabb2D;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn everything_returns_all_entries() {
        let mut idx = Index::<f64, u32>::with_rtree();
        for i in 0..5_u32 {
            let _ = idx.insert(Aabb2D::from_xywh(f64::from(i) * -1.0e6, 0.0, 1.0, 1.0), i);
        }
        let mut all: Vec<_> = idx.query_rect(Aabb2D::EVERYTHING).map(|(_, p)| p).collect();
        all.sort_unstable();
        assert_eq!(all, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut idx = Index::<f64, u32>::with_rtree();
        let k = idx.insert(Aabb2D::from_xywh(0.0, 0.0, 1.0, 1.0), 1);
        idx.clear();
        assert!(idx.is_empty());
        assert!(!idx.contains_key(k));
        assert!(!idx.any_in_rect(Aabb2D::EVERYTHING));
    }
}
