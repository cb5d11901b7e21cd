// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_roi --heading-base-level=0

//! Understory ROI: immutable region shapes with stable identities.
//!
//! - [`Roi`]: a region of interest. Immutable once created, carries a
//!   process-unique [`RoiId`] so caches can key derived data by identity.
//! - [`RoiShape`]: rectangles, ellipses, polygons, polylines, lines, point sets,
//!   built from [`kurbo`] primitives.
//! - [`Roi::bounds`]: bounding extents as a [`kurbo::Rect`].
//! - [`Roi::to_geometry`]: precise [`geo::Geometry`] for exact predicates;
//!   malformed data is reported as a [`RoiError`].
//! - [`ImageRegion`]: the rectangular query region used by spatial lookups.
//!
//! # Example
//!
//! ```rust
//! use understory_roi::{ImageRegion, Roi};
//!
//! let roi = Roi::ellipse(0.0, 0.0, 20.0, 10.0);
//! let bounds = roi.bounds();
//! assert!(bounds.width() > 19.9);
//!
//! let geometry = roi.to_geometry().unwrap();
//! assert!(matches!(geometry, geo::Geometry::Polygon(_)));
//!
//! let region = ImageRegion::new(5.0, 5.0, 100.0, 100.0);
//! assert!(region.bounds().overlaps(bounds));
//! ```

mod error;
mod geometry;
mod region;
mod roi;

pub use error::RoiError;
pub use geometry::ELLIPSE_VERTICES;
pub use region::ImageRegion;
pub use roi::{Roi, RoiId, RoiShape};
