// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexed point-in-area test for repeated queries against one geometry.

use geo::{Coord, Geometry, Intersects, LineString, Polygon};
use rstar::primitives::{GeomWithData, Line as Segment};
use rstar::{AABB, RTree};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Role {
    /// Edge of a polygon ring; takes part in crossing parity.
    Ring,
    /// Open path segment or a single point (degenerate segment).
    Path,
}

type Edge = GeomWithData<Segment<[f64; 2]>, Role>;

/// Point-in-area locator built once from a geometry.
///
/// Edges are held in an R-tree, so each test only visits the edges near the
/// point and along a horizontal ray from it. Points on the boundary count as
/// contained. For line and point geometries only the boundary test applies.
///
/// Construction is linear in the vertex count and queries are logarithmic;
/// build one when many points are tested against the same geometry.
pub struct PointLocator {
    edges: RTree<Edge>,
}

impl core::fmt::Debug for PointLocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointLocator")
            .field("edges", &self.edges.size())
            .finish()
    }
}

impl PointLocator {
    /// Index the edges of `geometry`.
    pub fn new(geometry: &Geometry<f64>) -> Self {
        let mut edges = Vec::new();
        collect_edges(geometry, &mut edges);
        Self {
            edges: RTree::bulk_load(edges),
        }
    }

    /// Number of indexed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.size()
    }

    /// True unless `p` lies strictly outside the geometry.
    pub fn contains(&self, p: Coord<f64>) -> bool {
        let here = AABB::from_point([p.x, p.y]);
        let on_boundary = self.edges.locate_in_envelope_intersecting(&here).any(|e| {
            let [x0, y0] = e.geom().from;
            let [x1, y1] = e.geom().to;
            geo::Line::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }).intersects(&p)
        });
        if on_boundary {
            return true;
        }
        // Crossing parity along the ray towards +x.
        let ray = AABB::from_corners([p.x, p.y], [f64::MAX, p.y]);
        let crossings = self
            .edges
            .locate_in_envelope_intersecting(&ray)
            .filter(|e| e.data == Role::Ring)
            .filter(|e| {
                let [x0, y0] = e.geom().from;
                let [x1, y1] = e.geom().to;
                if (y0 > p.y) == (y1 > p.y) {
                    return false;
                }
                let x = x0 + (p.y - y0) * (x1 - x0) / (y1 - y0);
                x > p.x
            })
            .count();
        crossings % 2 == 1
    }
}

fn collect_edges(geometry: &Geometry<f64>, out: &mut Vec<Edge>) {
    match geometry {
        Geometry::Point(p) => push_point(p.0, out),
        Geometry::MultiPoint(mp) => mp.iter().for_each(|p| push_point(p.0, out)),
        Geometry::Line(l) => push_segment(l.start, l.end, Role::Path, out),
        Geometry::LineString(ls) => push_path(ls, Role::Path, out),
        Geometry::MultiLineString(mls) => mls.iter().for_each(|ls| push_path(ls, Role::Path, out)),
        Geometry::Polygon(poly) => push_polygon(poly, out),
        Geometry::MultiPolygon(mp) => mp.iter().for_each(|poly| push_polygon(poly, out)),
        Geometry::Rect(r) => push_polygon(&r.to_polygon(), out),
        Geometry::Triangle(t) => push_polygon(&t.to_polygon(), out),
        Geometry::GeometryCollection(gc) => gc.iter().for_each(|g| collect_edges(g, out)),
    }
}

fn push_polygon(poly: &Polygon<f64>, out: &mut Vec<Edge>) {
    push_ring(poly.exterior(), out);
    poly.interiors().iter().for_each(|ring| push_ring(ring, out));
}

fn push_ring(ring: &LineString<f64>, out: &mut Vec<Edge>) {
    push_path(ring, Role::Ring, out);
    // Rings are closed implicitly when the last vertex differs from the first.
    if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last()) {
        if first != last {
            push_segment(*last, *first, Role::Ring, out);
        }
    }
}

fn push_path(ls: &LineString<f64>, role: Role, out: &mut Vec<Edge>) {
    for w in ls.0.windows(2) {
        push_segment(w[0], w[1], role, out);
    }
}

fn push_point(c: Coord<f64>, out: &mut Vec<Edge>) {
    push_segment(c, c, Role::Path, out);
}

fn push_segment(a: Coord<f64>, b: Coord<f64>, role: Role, out: &mut Vec<Edge>) {
    out.push(GeomWithData::new(Segment::new([a.x, a.y], [b.x, b.y]), role));
}
