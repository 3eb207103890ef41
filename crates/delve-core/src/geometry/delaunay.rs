//! Incremental 2D Delaunay triangulation (Guibas-Stolfi)
//!
//! Room anchors are projected onto the xy plane and inserted one by one into
//! a quad-edge mesh seeded with an oversized boundary triangle.

use std::collections::BTreeSet;

use log::warn;

use super::predicates::{
    in_circle, orient2d, point_on_segment_2d, segments_cross_2d, Point2, EPSILON,
};
use super::quad_edge::{EdgeRef, QuadEdgeMesh};
use crate::layout::GridCoord;

type Mesh = QuadEdgeMesh;

/// Result of a 2D triangulation
///
/// Vertex indices follow the input order. When the boundary is kept its three
/// vertices are appended after the input points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    pub vertices: Vec<Point2>,
    /// Undirected edges, `(low, high)` and sorted
    pub edges: Vec<(usize, usize)>,
    /// Counter-clockwise triangles
    pub triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Triangulate the xy projection of `points`
///
/// Points sharing an xy position with an earlier point are skipped. A grid
/// with a non-positive x or y axis yields an empty result.
pub fn triangulate(grid_size: GridCoord, points: &[GridCoord], remove_boundary: bool) -> Triangulation {
    if grid_size.x <= 0 || grid_size.y <= 0 {
        return Triangulation::default();
    }
    let vertices: Vec<Point2> = points
        .iter()
        .map(|p| [f64::from(p.x), f64::from(p.y)])
        .collect();
    let mut triangulator = Triangulator::new(grid_size, vertices);
    for index in 0..points.len() {
        triangulator.insert(index);
    }
    triangulator.finish(remove_boundary)
}

struct Triangulator {
    mesh: Mesh,
    vertices: Vec<Point2>,
    real: usize,
    first: EdgeRef,
    last: EdgeRef,
}

impl Triangulator {
    fn new(grid_size: GridCoord, mut vertices: Vec<Point2>) -> Self {
        let real = vertices.len();
        let width = f64::from(grid_size.x.max(grid_size.y).max(1));
        let center = [width / 2.0, width / 2.0];
        let radius = 20.0 * width;
        for degrees in [-90.0_f64, 30.0, 150.0] {
            let angle = degrees.to_radians();
            vertices.push([
                center[0] + radius * angle.cos(),
                center[1] + radius * angle.sin(),
            ]);
        }
        let (a, b, c) = (real, real + 1, real + 2);

        let mut mesh = Mesh::new();
        let ea = mesh.make_edge();
        mesh.set_end_points(ea, a, b);
        let eb = mesh.make_edge();
        mesh.splice(Mesh::sym(ea), eb);
        mesh.set_end_points(eb, b, c);
        let ec = mesh.make_edge();
        mesh.splice(Mesh::sym(eb), ec);
        mesh.set_end_points(ec, c, a);
        mesh.splice(Mesh::sym(ec), ea);

        Self {
            mesh,
            vertices,
            real,
            first: ea,
            last: ea,
        }
    }

    fn point(&self, vertex: Option<usize>) -> Point2 {
        vertex
            .and_then(|v| self.vertices.get(v).copied())
            .unwrap_or([f64::NAN, f64::NAN])
    }

    fn org(&self, e: EdgeRef) -> Point2 {
        self.point(self.mesh.org(e))
    }

    fn dest(&self, e: EdgeRef) -> Point2 {
        self.point(self.mesh.dest(e))
    }

    fn right_of(&self, x: Point2, e: EdgeRef) -> bool {
        orient2d(x, self.dest(e), self.org(e)) > 0.0
    }

    fn is_boundary(&self, vertex: Option<usize>) -> bool {
        vertex.is_none_or(|v| v >= self.real)
    }

    fn coincident(a: Point2, b: Point2) -> bool {
        (a[0] - b[0]).hypot(a[1] - b[1]) < EPSILON
    }

    /// Edge whose left triangle contains `x`, or an edge with `x` as endpoint
    fn locate(&self, x: Point2) -> Option<EdgeRef> {
        let mut e = if self.mesh.is_alive(self.last) {
            self.last
        } else {
            self.first
        };
        let budget = 4 * self.mesh.len() + 16;
        for _ in 0..budget {
            if Self::coincident(x, self.org(e)) || Self::coincident(x, self.dest(e)) {
                return Some(e);
            }
            if self.right_of(x, e) {
                e = Mesh::sym(e);
            } else if !self.right_of(x, self.mesh.onext(e)) {
                e = self.mesh.onext(e);
            } else if !self.right_of(x, self.mesh.dprev(e)) {
                e = self.mesh.dprev(e);
            } else {
                return Some(e);
            }
        }
        self.locate_exhaustive(x)
    }

    fn locate_exhaustive(&self, x: Point2) -> Option<EdgeRef> {
        self.mesh
            .edges()
            .flat_map(|e| [e, Mesh::sym(e)])
            .find(|&q| {
                let next = self.mesh.lnext(q);
                let prev = self.mesh.lprev(q);
                self.mesh.lnext(next) == prev
                    && self.mesh.lnext(prev) == q
                    && orient2d(self.org(q), self.org(next), self.org(prev)) > 0.0
                    && !self.right_of(x, q)
                    && !self.right_of(x, next)
                    && !self.right_of(x, prev)
            })
    }

    fn insert(&mut self, index: usize) {
        let x = self.vertices[index];
        let Some(mut e) = self.locate(x) else {
            warn!("Could not locate point {} in the triangulation", index);
            return;
        };
        if Self::coincident(x, self.org(e)) || Self::coincident(x, self.dest(e)) {
            return;
        }
        if point_on_segment_2d(x, self.org(e), self.dest(e), EPSILON) {
            e = self.mesh.oprev(e);
            let split = self.mesh.onext(e);
            self.mesh.delete_edge(split);
        }

        let Some(org) = self.mesh.org(e) else {
            return;
        };
        let mut base = self.mesh.make_edge();
        self.mesh.set_end_points(base, org, index);
        self.mesh.splice(base, e);
        let start = base;
        loop {
            let Some(next) = self.mesh.connect(e, Mesh::sym(base)) else {
                return;
            };
            base = next;
            e = self.mesh.oprev(base);
            if self.mesh.lnext(e) == start {
                break;
            }
        }
        self.last = start;

        let budget = 64 * self.mesh.len() + 64;
        for _ in 0..budget {
            let t = self.mesh.oprev(e);
            let t_dest = self.dest(t);
            if self.right_of(t_dest, e)
                && in_circle(self.org(e), t_dest, self.dest(e), x) > 0.0
                && self.flip_allowed(e, index)
            {
                self.mesh.swap(e);
                e = self.mesh.oprev(e);
            } else if self.mesh.onext(e) == start {
                return;
            } else {
                e = self.mesh.lprev(self.mesh.onext(e));
            }
        }
        warn!("Edge flipping around point {} did not settle", index);
    }

    /// Extra conditions for flipping an edge that touches the boundary triangle
    fn flip_allowed(&self, e: EdgeRef, inserted: usize) -> bool {
        let (org, dest) = (self.mesh.org(e), self.mesh.dest(e));
        if !self.is_boundary(org) && !self.is_boundary(dest) {
            return true;
        }
        let t = self.mesh.oprev(e);
        let opposite = self.mesh.dest(t);
        // The quadrilateral must stay convex so no triangle inverts
        if !segments_cross_2d(
            self.org(e),
            self.dest(e),
            self.vertices[inserted],
            self.point(opposite),
        ) {
            return false;
        }
        // The left face of `e` is the triangle closed by the inserted point
        let spoke = self.mesh.lprev(e);
        let already_linked = self.mesh.org(spoke) == Some(inserted)
            && self
                .mesh
                .origin_ring(spoke)
                .iter()
                .any(|&r| self.mesh.dest(r) == opposite);
        if already_linked {
            return false;
        }
        self.mesh.origin_ring(e).len() > 2 && self.mesh.origin_ring(Mesh::sym(e)).len() > 2
    }

    fn finish(self, remove_boundary: bool) -> Triangulation {
        let keep = |v: usize| !remove_boundary || v < self.real;

        let mut edges = BTreeSet::new();
        for e in self.mesh.edges() {
            if let (Some(a), Some(b)) = (self.mesh.org(e), self.mesh.dest(e))
                && keep(a)
                && keep(b)
            {
                edges.insert((a.min(b), a.max(b)));
            }
        }

        let mut triangles = BTreeSet::new();
        for q in self.mesh.edges().flat_map(|e| [e, Mesh::sym(e)]) {
            let next = self.mesh.lnext(q);
            let prev = self.mesh.lprev(q);
            if self.mesh.lnext(next) != prev || self.mesh.lnext(prev) != q {
                continue;
            }
            let (Some(a), Some(b), Some(c)) =
                (self.mesh.org(q), self.mesh.org(next), self.mesh.org(prev))
            else {
                continue;
            };
            if !(keep(a) && keep(b) && keep(c)) {
                continue;
            }
            if orient2d(self.vertices[a], self.vertices[b], self.vertices[c]) <= 0.0 {
                continue;
            }
            // Rotate so the smallest index leads, keeping the winding
            let tri = if a < b && a < c {
                [a, b, c]
            } else if b < c {
                [b, c, a]
            } else {
                [c, a, b]
            };
            triangles.insert(tri);
        }

        let mut vertices = self.vertices;
        if remove_boundary {
            vertices.truncate(self.real);
        }
        Triangulation {
            vertices,
            edges: edges.into_iter().collect(),
            triangles: triangles.into_iter().collect(),
        }
    }
}
