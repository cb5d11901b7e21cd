// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion from region shapes to precise `geo` geometry.

use core::f64::consts::TAU;

use geo::{Coord, Geometry, LineString, MultiPoint, Polygon};
use kurbo::{Ellipse, Point, Rect};

use crate::error::{Result, RoiError};
use crate::roi::{Roi, RoiShape};

/// Vertex count used when an ellipse is polygonised.
pub const ELLIPSE_VERTICES: usize = 72;

impl Roi {
    /// Produce the precise geometry of this shape.
    ///
    /// Rectangles, ellipses and polygons become polygons; polylines and lines
    /// become line strings; point sets become multi-points. Ellipses are
    /// approximated with [`ELLIPSE_VERTICES`] vertices.
    ///
    /// The result is not checked for validity (a self-intersecting polygon is
    /// returned as-is). Malformed data, such as too few vertices or non-finite
    /// coordinates, is reported as a [`RoiError`].
    pub fn to_geometry(&self) -> Result<Geometry<f64>> {
        let shape = self.shape();
        let name = shape.name();
        match shape {
            RoiShape::Rectangle(r) => rect_polygon(*r, name).map(Geometry::Polygon),
            RoiShape::Ellipse(e) => ellipse_polygon(e, name).map(Geometry::Polygon),
            RoiShape::Polygon(pts) => {
                let ring = coords(pts, 3, name)?;
                Ok(Geometry::Polygon(Polygon::new(LineString::from(ring), vec![])))
            }
            RoiShape::Polyline(pts) => {
                let line = coords(pts, 2, name)?;
                Ok(Geometry::LineString(LineString::from(line)))
            }
            RoiShape::Line(l) => {
                let line = coords(&[l.p0, l.p1], 2, name)?;
                Ok(Geometry::LineString(LineString::from(line)))
            }
            RoiShape::Points(pts) => {
                let points = coords(pts, 1, name)?;
                Ok(Geometry::MultiPoint(MultiPoint::from(points)))
            }
        }
    }
}

fn coord(p: Point, shape: &'static str) -> Result<Coord<f64>> {
    if p.x.is_finite() && p.y.is_finite() {
        Ok(Coord { x: p.x, y: p.y })
    } else {
        Err(RoiError::NonFinite { shape })
    }
}

fn coords(pts: &[Point], required: usize, shape: &'static str) -> Result<Vec<Coord<f64>>> {
    if pts.len() < required {
        return Err(RoiError::TooFewVertices {
            shape,
            required,
            found: pts.len(),
        });
    }
    pts.iter().map(|&p| coord(p, shape)).collect()
}

fn rect_polygon(r: Rect, shape: &'static str) -> Result<Polygon<f64>> {
    let r = r.abs();
    let ring = coords(
        &[
            Point::new(r.x0, r.y0),
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
        ],
        4,
        shape,
    )?;
    Ok(Polygon::new(LineString::from(ring), vec![]))
}

fn ellipse_polygon(e: &Ellipse, shape: &'static str) -> Result<Polygon<f64>> {
    let c = e.center();
    let (radii, rotation) = e.radii_and_rotation();
    let (sin_r, cos_r) = rotation.sin_cos();
    let mut ring = Vec::with_capacity(ELLIPSE_VERTICES);
    for i in 0..ELLIPSE_VERTICES {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Vertex counts are tiny compared to f64 precision."
        )]
        let t = TAU * i as f64 / ELLIPSE_VERTICES as f64;
        let (sin_t, cos_t) = t.sin_cos();
        let lx = radii.x * cos_t;
        let ly = radii.y * sin_t;
        ring.push(coord(
            Point::new(c.x + lx * cos_r - ly * sin_r, c.y + lx * sin_r + ly * cos_r),
            shape,
        )?);
    }
    Ok(Polygon::new(LineString::from(ring), vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, BoundingRect};

    #[test]
    fn rectangle_becomes_closed_polygon() {
        let g = Roi::rectangle(0.0, 0.0, 10.0, 5.0).to_geometry().unwrap();
        let Geometry::Polygon(p) = &g else {
            panic!("expected polygon, got {g:?}");
        };
        assert!(p.exterior().is_closed());
        assert!((g.unsigned_area() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ellipse_area_is_close() {
        let g = Roi::ellipse(0.0, 0.0, 20.0, 10.0).to_geometry().unwrap();
        let expected = core::f64::consts::PI * 10.0 * 5.0;
        let area = g.unsigned_area();
        assert!((area - expected).abs() / expected < 0.01, "area {area} vs {expected}");
        let b = g.bounding_rect().unwrap();
        assert!((b.max().x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_vertices_is_an_error() {
        let err = Roi::polygon([(0.0, 0.0), (1.0, 1.0)]).to_geometry().unwrap_err();
        assert_eq!(
            err,
            RoiError::TooFewVertices {
                shape: "polygon",
                required: 3,
                found: 2
            }
        );
        assert!(Roi::points(Vec::<Point>::new()).to_geometry().is_err());
    }

    #[test]
    fn non_finite_is_an_error() {
        let err = Roi::polyline([(0.0, 0.0), (f64::NAN, 1.0)]).to_geometry().unwrap_err();
        assert_eq!(err, RoiError::NonFinite { shape: "polyline" });
    }

    #[test]
    fn open_shapes_become_lines_and_points() {
        assert!(matches!(
            Roi::line((0.0, 0.0), (3.0, 4.0)).to_geometry(),
            Ok(Geometry::LineString(_))
        ));
        assert!(matches!(
            Roi::points([(1.0, 1.0), (2.0, 2.0)]).to_geometry(),
            Ok(Geometry::MultiPoint(_))
        ));
    }
}
