// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_hierarchy --heading-base-level=0

//! Understory Hierarchy: a mutable tree of region-carrying objects.
//!
//! - [`Hierarchy`] owns the objects. It has exactly one root, hands out
//!   generational [`ObjectId`]s and supports adding, removing, reparenting and
//!   region swaps.
//! - [`PathObject`] is the per-object payload: an [`ObjectKind`] and an
//!   optional shared [`Roi`](understory_roi::Roi).
//! - [`ObjectKind`] is a closed set with a shallow subkind relation
//!   (cells and tiles are detections); [`KindSet`] is a set of kinds.
//! - Every edit produces a [`HierarchyEvent`] (kind plus ordered changed ids)
//!   delivered to subscribed [`HierarchyListener`]s along with an
//!   [`ObjectTree`] read view.
//!
//! # Example
//!
//! ```rust
//! use understory_hierarchy::{Hierarchy, ObjectTree, PathObject};
//! use understory_roi::Roi;
//!
//! let mut h = Hierarchy::new();
//! let a = h
//!     .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 10.0, 10.0)))
//!     .unwrap();
//! let d = h
//!     .add_object(a, PathObject::detection(Roi::ellipse(4.0, 4.0, 2.0, 2.0)))
//!     .unwrap();
//! assert_eq!(h.children(a), [d]);
//! h.remove_object(a).unwrap();
//! assert!(!h.is_alive(d));
//! ```

mod error;
mod event;
mod hierarchy;
mod object;
mod types;

pub use error::HierarchyError;
pub use event::{
    HierarchyEvent, HierarchyEventKind, HierarchyId, HierarchyListener, ListenerId, ObjectTree,
};
pub use hierarchy::Hierarchy;
pub use object::PathObject;
pub use types::{KindSet, ObjectId, ObjectKind};
