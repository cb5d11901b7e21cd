// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query regions.

use kurbo::Rect;

/// A rectangular region of an image, used to ask "what lies here?".
///
/// Only the bounding extents matter to spatial queries. Negative sizes are
/// normalized by [`ImageRegion::bounds`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageRegion {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ImageRegion {
    /// Create a region from origin and size.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a region covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }

    /// Bounding extents of the region.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }
}

impl From<Rect> for ImageRegion {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}
