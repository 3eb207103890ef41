//! Geometric predicates on floating point coordinates
//!
//! Inputs are small grid coordinates, so plain `f64` arithmetic is exact
//! enough. Points are translated before the lifted determinants are built.

/// Tolerance used by collinearity and on-segment tests
pub const EPSILON: f64 = 1e-6;

pub type Point2 = [f64; 2];
pub type Point3 = [f64; 3];

/// Twice the signed area of `abc`, positive when counter-clockwise
pub fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Six times the signed volume of `abcd`: `(b - a) . ((c - a) x (d - a))`
pub fn orient3d(a: Point3, b: Point3, c: Point3, d: Point3) -> f64 {
    let u = sub3(b, a);
    let v = sub3(c, a);
    let w = sub3(d, a);
    dot3(u, cross3(v, w))
}

/// Determinant by Gaussian elimination with partial pivoting
pub fn determinant<const N: usize>(mut m: [[f64; N]; N]) -> f64 {
    let mut det = 1.0;
    for col in 0..N {
        let mut pivot = col;
        for row in col + 1..N {
            if m[row][col].abs() > m[pivot][col].abs() {
                pivot = row;
            }
        }
        if m[pivot][col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        let p = m[col][col];
        det *= p;
        for row in col + 1..N {
            let factor = m[row][col] / p;
            if factor != 0.0 {
                for k in col..N {
                    m[row][k] -= factor * m[col][k];
                }
            }
        }
    }
    det
}

/// Positive when `d` lies strictly inside the circumcircle of `abc`
///
/// Evaluates the lifted 4x4 determinant and normalizes by the orientation of
/// `abc`, so the vertex order does not matter. Zero for co-circular points
/// or a degenerate triangle.
pub fn in_circle(a: Point2, b: Point2, c: Point2, d: Point2) -> f64 {
    let orientation = orient2d(a, b, c);
    if orientation == 0.0 {
        return 0.0;
    }
    let row = |p: Point2| {
        let x = p[0] - d[0];
        let y = p[1] - d[1];
        [x, y, x * x + y * y, 1.0]
    };
    let m = [row(a), row(b), row(c), [0.0, 0.0, 0.0, 1.0]];
    determinant(m) * orientation.signum()
}

/// Positive when `e` lies strictly inside the circumsphere of `abcd`
///
/// Lifted 5x5 determinant normalized by the sign of the 4x4 orientation
/// determinant of `abcd`. Zero for a flat tetrahedron.
pub fn in_sphere(a: Point3, b: Point3, c: Point3, d: Point3, e: Point3) -> f64 {
    let orientation = -orient3d(a, b, c, d);
    if orientation == 0.0 {
        return 0.0;
    }
    let row = |p: Point3| {
        let x = p[0] - e[0];
        let y = p[1] - e[1];
        let z = p[2] - e[2];
        [x, y, z, x * x + y * y + z * z, 1.0]
    };
    let m = [
        row(a),
        row(b),
        row(c),
        row(d),
        [0.0, 0.0, 0.0, 0.0, 1.0],
    ];
    determinant(m) * orientation.signum()
}

/// Whether `p` lies on the closed segment `ab` within `tolerance`
pub fn point_on_segment_2d(p: Point2, a: Point2, b: Point2, tolerance: f64) -> bool {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let length_sq = ab[0] * ab[0] + ab[1] * ab[1];
    if length_sq == 0.0 {
        return ap[0].hypot(ap[1]) <= tolerance;
    }
    let length = length_sq.sqrt();
    if (orient2d(a, b, p) / length).abs() > tolerance {
        return false;
    }
    let projection = (ap[0] * ab[0] + ap[1] * ab[1]) / length;
    projection >= -tolerance && projection <= length + tolerance
}

/// Proper crossing of two segments, shared endpoints excluded
pub fn segments_cross_2d(p1: Point2, p2: Point2, q1: Point2, q2: Point2) -> bool {
    let d1 = orient2d(q1, q2, p1);
    let d2 = orient2d(q1, q2, p2);
    let d3 = orient2d(p1, p2, q1);
    let d4 = orient2d(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Proper crossing of segment `pq` through the interior of triangle `abc`
///
/// Touching contacts (shared vertices, edges in the triangle plane) do not
/// count.
pub fn segment_intersects_triangle(p: Point3, q: Point3, triangle: [Point3; 3]) -> bool {
    let [a, b, c] = triangle;
    let sp = orient3d(a, b, c, p);
    let sq = orient3d(a, b, c, q);
    if sp * sq >= 0.0 {
        return false;
    }
    let s1 = orient3d(p, q, a, b);
    let s2 = orient3d(p, q, b, c);
    let s3 = orient3d(p, q, c, a);
    (s1 > 0.0 && s2 > 0.0 && s3 > 0.0) || (s1 < 0.0 && s2 < 0.0 && s3 < 0.0)
}

/// Whether either triangle has an edge properly crossing the other
pub fn triangles_intersect(t1: [Point3; 3], t2: [Point3; 3]) -> bool {
    let edges = |t: [Point3; 3]| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])];
    edges(t1)
        .into_iter()
        .any(|(p, q)| segment_intersects_triangle(p, q, t2))
        || edges(t2)
            .into_iter()
            .any(|(p, q)| segment_intersects_triangle(p, q, t1))
}

fn sub3(a: Point3, b: Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot3(a: Point3, b: Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross3(a: Point3, b: Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
