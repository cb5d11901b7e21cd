// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region shapes and their identities.

use core::sync::atomic::{AtomicU64, Ordering};

use kurbo::{Ellipse, Line, Point, Rect, Shape};

static NEXT_ROI_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Roi`].
///
/// Every `Roi` gets a fresh id when it is created and keeps it for its whole
/// life. Ids are never reused within a process, so an id that outlives its
/// `Roi` can never alias a different shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoiId(u64);

impl RoiId {
    fn next() -> Self {
        Self(NEXT_ROI_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The geometric content of a region.
#[derive(Clone, Debug, PartialEq)]
pub enum RoiShape {
    /// Axis-aligned rectangle.
    Rectangle(Rect),
    /// Ellipse, possibly rotated.
    Ellipse(Ellipse),
    /// Closed polygon; the closing edge is implicit.
    Polygon(Vec<Point>),
    /// Open polyline.
    Polyline(Vec<Point>),
    /// Single straight segment.
    Line(Line),
    /// Unconnected points.
    Points(Vec<Point>),
}

impl RoiShape {
    /// Short lowercase name of the shape kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rectangle(_) => "rectangle",
            Self::Ellipse(_) => "ellipse",
            Self::Polygon(_) => "polygon",
            Self::Polyline(_) => "polyline",
            Self::Line(_) => "line",
            Self::Points(_) => "points",
        }
    }

    /// True for shapes that enclose an area.
    pub fn is_area(&self) -> bool {
        matches!(self, Self::Rectangle(_) | Self::Ellipse(_) | Self::Polygon(_))
    }
}

/// An immutable region shape with a stable identity.
///
/// A `Roi` never changes after construction; objects that need a different
/// shape are given a new `Roi`. Caches may therefore key derived data by
/// [`Roi::id`]. `Roi` is deliberately not `Clone`: share it through `Arc`.
#[derive(Debug)]
pub struct Roi {
    id: RoiId,
    shape: RoiShape,
}

impl Roi {
    /// Wrap a shape, assigning a fresh id.
    pub fn new(shape: RoiShape) -> Self {
        Self {
            id: RoiId::next(),
            shape,
        }
    }

    /// Rectangle from origin and size.
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(RoiShape::Rectangle(
            Rect::new(x, y, x + width, y + height).abs(),
        ))
    }

    /// Axis-aligned ellipse inscribed in the given box.
    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(RoiShape::Ellipse(Ellipse::from_rect(
            Rect::new(x, y, x + width, y + height).abs(),
        )))
    }

    /// Closed polygon through `points`.
    pub fn polygon<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Self {
        Self::new(RoiShape::Polygon(points.into_iter().map(Into::into).collect()))
    }

    /// Open polyline through `points`.
    pub fn polyline<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Self {
        Self::new(RoiShape::Polyline(points.into_iter().map(Into::into).collect()))
    }

    /// Straight segment from `p0` to `p1`.
    pub fn line(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self::new(RoiShape::Line(Line::new(p0, p1)))
    }

    /// Point set.
    pub fn points<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Self {
        Self::new(RoiShape::Points(points.into_iter().map(Into::into).collect()))
    }

    /// Stable identity of this shape.
    pub fn id(&self) -> RoiId {
        self.id
    }

    /// The shape itself.
    pub fn shape(&self) -> &RoiShape {
        &self.shape
    }

    /// True for shapes that enclose an area.
    pub fn is_area(&self) -> bool {
        self.shape.is_area()
    }

    /// Bounding extents.
    ///
    /// Computed on every call (linear in the vertex count for point lists);
    /// callers that ask repeatedly should memoize by [`Roi::id`]. An empty
    /// point list reports [`Rect::ZERO`].
    pub fn bounds(&self) -> Rect {
        match &self.shape {
            RoiShape::Rectangle(r) => r.abs(),
            RoiShape::Ellipse(e) => e.bounding_box(),
            RoiShape::Line(l) => l.bounding_box(),
            RoiShape::Polygon(pts) | RoiShape::Polyline(pts) | RoiShape::Points(pts) => {
                points_bounds(pts)
            }
        }
    }
}

fn points_bounds(pts: &[Point]) -> Rect {
    let mut it = pts.iter().copied();
    let Some(first) = it.next() else {
        return Rect::ZERO;
    };
    it.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Roi::rectangle(0.0, 0.0, 1.0, 1.0);
        let b = Roi::rectangle(0.0, 0.0, 1.0, 1.0);
        assert_ne!(a.id(), b.id(), "equal shapes still have distinct identities");
    }

    #[test]
    fn rectangle_bounds_normalize() {
        let r = Roi::rectangle(10.0, 10.0, -4.0, 2.0);
        assert_eq!(r.bounds(), Rect::new(6.0, 10.0, 10.0, 12.0));
    }

    #[test]
    fn polygon_bounds_cover_all_vertices() {
        let p = Roi::polygon([(0.0, 5.0), (3.0, -2.0), (-1.0, 1.0)]);
        assert_eq!(p.bounds(), Rect::new(-1.0, -2.0, 3.0, 5.0));
        assert!(p.is_area());
    }

    #[test]
    fn ellipse_bounds_match_box() {
        let e = Roi::ellipse(2.0, 4.0, 10.0, 6.0);
        let b = e.bounds();
        assert!((b.x0 - 2.0).abs() < 1e-9 && (b.y0 - 4.0).abs() < 1e-9);
        assert!((b.x1 - 12.0).abs() < 1e-9 && (b.y1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_points_have_zero_bounds() {
        let p = Roi::points(Vec::<(f64, f64)>::new());
        assert_eq!(p.bounds(), Rect::ZERO);
        assert!(!p.is_area());
    }
}
