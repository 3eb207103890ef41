//! Bowyer-Watson 3D Delaunay tetrahedralization

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use super::predicates::{in_sphere, orient3d, triangles_intersect, Point3, EPSILON};
use crate::graph::Edge;
use crate::layout::GridCoord;

/// Result of a tetrahedralization
///
/// Indices below `points.len()` refer to input points; the four boundary
/// vertices follow them in `vertices`.
#[derive(Debug, Clone, Default)]
pub struct Tetrahedralization {
    pub points: Vec<GridCoord>,
    pub vertices: Vec<Point3>,
    pub tetrahedra: Vec<[usize; 4]>,
}

/// Counts reported by [`Tetrahedralization::diagnostics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub intersecting: usize,
    pub coplanar: usize,
}

/// Tetrahedralize `points`
///
/// With `remove_boundary`, tetrahedra touching the seed tetrahedron are
/// dropped. A grid with a non-positive axis yields an empty result.
pub fn tetrahedralize(grid_size: GridCoord, points: &[GridCoord], remove_boundary: bool) -> Tetrahedralization {
    if !grid_size.is_positive() {
        return Tetrahedralization::default();
    }
    let real = points.len();
    let mut vertices: Vec<Point3> = points.iter().map(GridCoord::as_f64).collect();

    let extent = f64::from(grid_size.x.max(grid_size.y).max(grid_size.z).max(1));
    let radius = 20.0 * extent;
    let center = [
        f64::from(grid_size.x) / 2.0,
        f64::from(grid_size.y) / 2.0,
        f64::from(grid_size.z) / 2.0,
    ];
    for corner in [
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ] {
        vertices.push([
            center[0] + radius * corner[0],
            center[1] + radius * corner[1],
            center[2] + radius * corner[2],
        ]);
    }
    let mut tetrahedra = vec![[real, real + 1, real + 2, real + 3]];

    for index in 0..real {
        let p = vertices[index];
        if points[..index].contains(&points[index]) {
            continue;
        }
        let (cavity, kept): (Vec<[usize; 4]>, Vec<[usize; 4]>) =
            tetrahedra.into_iter().partition(|t| {
                in_sphere(vertices[t[0]], vertices[t[1]], vertices[t[2]], vertices[t[3]], p) > 0.0
            });
        tetrahedra = kept;
        if cavity.is_empty() {
            warn!("Point {} is outside every circumsphere", points[index]);
            continue;
        }

        let mut faces: BTreeMap<[usize; 3], ([usize; 3], usize)> = BTreeMap::new();
        for t in &cavity {
            for face in faces_of(t) {
                let mut key = face;
                key.sort_unstable();
                faces.entry(key).or_insert((face, 0)).1 += 1;
            }
        }

        let mut existing: BTreeSet<[usize; 4]> = tetrahedra.iter().map(sorted4).collect();
        for (face, count) in faces.values() {
            if *count != 1 {
                continue;
            }
            let candidate = [face[0], face[1], face[2], index];
            if existing.insert(sorted4(&candidate)) {
                tetrahedra.push(candidate);
            }
        }
    }

    if remove_boundary {
        tetrahedra.retain(|t| t.iter().all(|&v| v < real));
    }
    Tetrahedralization {
        points: points.to_vec(),
        vertices,
        tetrahedra,
    }
}

/// The four faces of a tetrahedron `abcd`
fn faces_of(t: &[usize; 4]) -> [[usize; 3]; 4] {
    let [a, b, c, d] = *t;
    [[b, a, c], [c, a, d], [d, a, b], [d, b, c]]
}

fn sorted4(t: &[usize; 4]) -> [usize; 4] {
    let mut s = *t;
    s.sort_unstable();
    s
}

impl Tetrahedralization {
    /// Vertex pairs joined by a tetrahedron edge, input points only
    pub fn index_edges(&self) -> Vec<(usize, usize)> {
        let real = self.points.len();
        let mut edges = BTreeSet::new();
        for t in &self.tetrahedra {
            for i in 0..4 {
                for j in i + 1..4 {
                    let (a, b) = (t[i], t[j]);
                    if a < real && b < real && a != b {
                        edges.insert((a.min(b), a.max(b)));
                    }
                }
            }
        }
        edges.into_iter().collect()
    }

    /// Deduplicated connection candidates between input points
    pub fn edges(&self) -> Vec<Edge> {
        self.index_edges()
            .into_iter()
            .map(|(a, b)| Edge::new(self.points[a], self.points[b]))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tetrahedra.is_empty()
    }

    fn corners(&self, t: &[usize; 4]) -> [Point3; 4] {
        t.map(|v| self.vertices[v])
    }

    /// Count overlapping and flat tetrahedra, logging a warning for each kind found
    pub fn diagnostics(&self) -> Diagnostics {
        let mut report = Diagnostics::default();
        for t in &self.tetrahedra {
            let [a, b, c, d] = self.corners(t);
            if orient3d(a, b, c, d).abs() < EPSILON {
                report.coplanar += 1;
            }
        }
        for (i, t1) in self.tetrahedra.iter().enumerate() {
            for t2 in &self.tetrahedra[i + 1..] {
                if self.overlap(t1, t2) {
                    report.intersecting += 1;
                }
            }
        }
        if report.intersecting > 0 {
            warn!(
                "Tetrahedralization has {} intersecting tetrahedron pairs",
                report.intersecting
            );
        }
        if report.coplanar > 0 {
            warn!(
                "Tetrahedralization has {} coplanar tetrahedra",
                report.coplanar
            );
        }
        report
    }

    fn overlap(&self, t1: &[usize; 4], t2: &[usize; 4]) -> bool {
        let face_points = |t: &[usize; 4]| faces_of(t).map(|f| f.map(|v| self.vertices[v]));
        let f1 = face_points(t1);
        let f2 = face_points(t2);
        f1.iter()
            .any(|a| f2.iter().any(|b| triangles_intersect(*a, *b)))
    }
}
