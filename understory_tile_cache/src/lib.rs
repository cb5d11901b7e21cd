// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tile_cache --heading-base-level=0

//! Understory Tile Cache: a lazily rebuilt spatial cache over an object hierarchy.
//!
//! A [`TileCache`] answers "which objects of kind K overlap region R?" for a
//! [`Hierarchy`](understory_hierarchy::Hierarchy) that is edited
//! interactively. It keeps one range structure per
//! [`ObjectKind`](understory_hierarchy::ObjectKind), filed by bounding
//! envelope, and listens to the hierarchy's events:
//!
//! - Simple events (one object added, removed or changed) are applied in
//!   place.
//! - Anything more complex marks the cache stale; the next query rebuilds it
//!   from the whole tree. Many edits in a row therefore cost one rebuild.
//!
//! Region queries are over-approximate (bounding-box intersection). For exact
//! relationships, [`TileCache::covers`] and [`TileCache::contains_centroid`]
//! use precise `geo` geometry, memoized per shape in a [`GeometryCache`] for
//! the configured stable kinds.
//!
//! ## Concurrency
//!
//! Queries share a reader/writer lock; rebuilds and event updates take it
//! exclusively. A stale cache is rebuilt by exactly one of the threads that
//! race to query it. Derived geometry is computed at most once per shape, in
//! its own synchronized cache, without touching the registry lock.
//!
//! # Example
//!
//! ```rust
//! use understory_hierarchy::{Hierarchy, ObjectTree, PathObject};
//! use understory_roi::{ImageRegion, Roi};
//! use understory_tile_cache::{TileCache, TileCacheConfig};
//!
//! let mut h = Hierarchy::new();
//! let cache = TileCache::attach(&mut h, TileCacheConfig::default());
//!
//! let a = h
//!     .add_object(h.root(), PathObject::annotation(Roi::rectangle(0.0, 0.0, 10.0, 10.0)))
//!     .unwrap();
//! let d = h
//!     .add_object(a, PathObject::detection(Roi::ellipse(4.0, 4.0, 2.0, 2.0)))
//!     .unwrap();
//!
//! let near = ImageRegion::new(0.0, 0.0, 20.0, 20.0);
//! let hits = cache.objects_for_region(&h, None, Some(&near), true);
//! assert!(hits.contains(&a) && hits.contains(&d));
//!
//! let (pa, pd) = (h.object(a).unwrap(), h.object(d).unwrap());
//! assert!(cache.contains_centroid(pa, pd).unwrap());
//! ```

mod cache;
mod config;
mod derived;
mod envelope;
mod events;
mod filter;
mod locator;
mod memo;
mod query;
mod registry;

pub use cache::TileCache;
pub use config::{IndexBackend, TileCacheConfig};
pub use derived::GeometryCache;
pub use envelope::{Envelope, EnvelopeCache, MAX_ENVELOPE, rect_envelope, region_envelope};
pub use events::EventAction;
pub use filter::KindFilter;
pub use locator::PointLocator;
