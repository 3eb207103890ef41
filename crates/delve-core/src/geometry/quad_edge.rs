//! Arena-backed quad-edge mesh
//!
//! Each undirected edge owns four consecutive quarter-edge slots: the edge,
//! its dual rotated once, its reverse, and the dual rotated three times.
//! `rot`, `sym` and `inv_rot` are index arithmetic inside the group of four;
//! only `onext` is stored. The remaining navigation is derived from those.

/// Index of a quarter-edge in the arena
pub type EdgeRef = usize;

#[derive(Debug, Clone, Default)]
pub struct QuadEdgeMesh {
    next: Vec<EdgeRef>,
    /// Origin vertex of primal quarter-edges, `None` for dual ones
    origin: Vec<Option<usize>>,
    /// One flag per group of four
    alive: Vec<bool>,
}

impl QuadEdgeMesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn rot(e: EdgeRef) -> EdgeRef {
        (e & !3) | ((e + 1) & 3)
    }

    #[inline]
    pub fn sym(e: EdgeRef) -> EdgeRef {
        (e & !3) | ((e + 2) & 3)
    }

    #[inline]
    pub fn inv_rot(e: EdgeRef) -> EdgeRef {
        (e & !3) | ((e + 3) & 3)
    }

    /// Next edge counter-clockwise around the origin
    #[inline]
    pub fn onext(&self, e: EdgeRef) -> EdgeRef {
        self.next[e]
    }

    /// Next edge clockwise around the origin
    pub fn oprev(&self, e: EdgeRef) -> EdgeRef {
        Self::rot(self.onext(Self::rot(e)))
    }

    pub fn dnext(&self, e: EdgeRef) -> EdgeRef {
        Self::sym(self.onext(Self::sym(e)))
    }

    pub fn dprev(&self, e: EdgeRef) -> EdgeRef {
        Self::inv_rot(self.onext(Self::inv_rot(e)))
    }

    /// Next edge counter-clockwise around the left face
    pub fn lnext(&self, e: EdgeRef) -> EdgeRef {
        Self::rot(self.onext(Self::inv_rot(e)))
    }

    pub fn lprev(&self, e: EdgeRef) -> EdgeRef {
        Self::sym(self.onext(e))
    }

    pub fn rnext(&self, e: EdgeRef) -> EdgeRef {
        Self::inv_rot(self.onext(Self::rot(e)))
    }

    pub fn rprev(&self, e: EdgeRef) -> EdgeRef {
        self.onext(Self::sym(e))
    }

    pub fn org(&self, e: EdgeRef) -> Option<usize> {
        self.origin[e]
    }

    pub fn dest(&self, e: EdgeRef) -> Option<usize> {
        self.origin[Self::sym(e)]
    }

    pub fn set_end_points(&mut self, e: EdgeRef, org: usize, dest: usize) {
        self.origin[e] = Some(org);
        self.origin[Self::sym(e)] = Some(dest);
    }

    pub fn is_alive(&self, e: EdgeRef) -> bool {
        self.alive.get(e >> 2).copied().unwrap_or(false)
    }

    /// Create an isolated edge and return its primal quarter-edge
    pub fn make_edge(&mut self) -> EdgeRef {
        let base = self.next.len();
        self.next
            .extend_from_slice(&[base, base + 3, base + 2, base + 1]);
        self.origin.extend_from_slice(&[None; 4]);
        self.alive.push(true);
        base
    }

    /// Join or separate the origin rings of `a` and `b`
    pub fn splice(&mut self, a: EdgeRef, b: EdgeRef) {
        let alpha = Self::rot(self.onext(a));
        let beta = Self::rot(self.onext(b));

        let t1 = self.onext(b);
        let t2 = self.onext(a);
        let t3 = self.onext(beta);
        let t4 = self.onext(alpha);

        self.next[a] = t1;
        self.next[b] = t2;
        self.next[alpha] = t3;
        self.next[beta] = t4;
    }

    /// New edge from the destination of `a` to the origin of `b`
    ///
    /// The left faces of `a`, `b` and the new edge coincide afterwards.
    pub fn connect(&mut self, a: EdgeRef, b: EdgeRef) -> Option<EdgeRef> {
        let org = self.dest(a)?;
        let dest = self.org(b)?;
        let e = self.make_edge();
        self.set_end_points(e, org, dest);
        let a_lnext = self.lnext(a);
        self.splice(e, a_lnext);
        self.splice(Self::sym(e), b);
        Some(e)
    }

    /// Detach an edge from the mesh
    pub fn delete_edge(&mut self, e: EdgeRef) {
        let e_oprev = self.oprev(e);
        self.splice(e, e_oprev);
        let s = Self::sym(e);
        let s_oprev = self.oprev(s);
        self.splice(s, s_oprev);
        self.alive[e >> 2] = false;
    }

    /// Turn `e` counter-clockwise inside the quadrilateral formed by its two faces
    pub fn swap(&mut self, e: EdgeRef) {
        let a = self.oprev(e);
        let s = Self::sym(e);
        let b = self.oprev(s);
        self.splice(e, a);
        self.splice(s, b);
        let a_lnext = self.lnext(a);
        self.splice(e, a_lnext);
        let b_lnext = self.lnext(b);
        self.splice(s, b_lnext);
        if let (Some(org), Some(dest)) = (self.dest(a), self.dest(b)) {
            self.set_end_points(e, org, dest);
        }
    }

    /// Primal quarter-edge of every live edge, one orientation each
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(group, _)| group << 2)
    }

    /// Edges leaving the origin of `e`, counter-clockwise starting at `e`
    pub fn origin_ring(&self, e: EdgeRef) -> Vec<EdgeRef> {
        let mut ring = vec![e];
        let mut current = self.onext(e);
        while current != e && ring.len() <= self.next.len() {
            ring.push(current);
            current = self.onext(current);
        }
        ring
    }

    /// Number of live edges
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Mesh = QuadEdgeMesh;

    /// Triangle a -> b -> c with its interior on the left
    fn triangle(mesh: &mut Mesh) -> (EdgeRef, EdgeRef, EdgeRef) {
        let ea = mesh.make_edge();
        mesh.set_end_points(ea, 0, 1);
        let eb = mesh.make_edge();
        mesh.splice(Mesh::sym(ea), eb);
        mesh.set_end_points(eb, 1, 2);
        let ec = mesh.make_edge();
        mesh.splice(Mesh::sym(eb), ec);
        mesh.set_end_points(ec, 2, 0);
        mesh.splice(Mesh::sym(ec), ea);
        (ea, eb, ec)
    }

    #[test]
    fn test_index_arithmetic() {
        for e in 8..12 {
            assert_eq!(Mesh::rot(Mesh::rot(e)), Mesh::sym(e));
            assert_eq!(Mesh::rot(Mesh::inv_rot(e)), e);
            assert_eq!(Mesh::sym(Mesh::sym(e)), e);
            assert_eq!(Mesh::rot(e) >> 2, 2);
        }
        assert_eq!(Mesh::rot(3), 0);
    }

    #[test]
    fn test_make_edge_rings() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge();
        assert_eq!(mesh.onext(e), e);
        assert_eq!(mesh.onext(Mesh::sym(e)), Mesh::sym(e));
        assert_eq!(mesh.onext(Mesh::rot(e)), Mesh::inv_rot(e));
        assert_eq!(mesh.lnext(e), Mesh::sym(e));
    }

    #[test]
    fn test_triangle_face_walk() {
        let mut mesh = Mesh::new();
        let (ea, eb, ec) = triangle(&mut mesh);
        assert_eq!(mesh.lnext(ea), eb);
        assert_eq!(mesh.lnext(eb), ec);
        assert_eq!(mesh.lnext(ec), ea);
        assert_eq!(mesh.lprev(ea), ec);
        assert_eq!(mesh.dest(ea), Some(1));
        assert_eq!(mesh.org(eb), Some(1));
        assert_eq!(mesh.origin_ring(ea).len(), 2);
    }

    #[test]
    fn test_connect_and_delete() {
        let mut mesh = Mesh::new();
        let ea = mesh.make_edge();
        mesh.set_end_points(ea, 0, 1);
        let eb = mesh.make_edge();
        mesh.splice(Mesh::sym(ea), eb);
        mesh.set_end_points(eb, 1, 2);

        let ec = mesh.connect(eb, ea).unwrap();
        assert_eq!(mesh.org(ec), Some(2));
        assert_eq!(mesh.dest(ec), Some(0));
        assert_eq!(mesh.lnext(ec), ea);
        assert_eq!(mesh.len(), 3);

        mesh.delete_edge(ec);
        assert_eq!(mesh.len(), 2);
        assert!(!mesh.is_alive(ec));
        assert_eq!(mesh.lnext(eb), Mesh::sym(eb));
    }

    #[test]
    fn test_swap_in_quadrilateral() {
        // Closed loop 0 -> 1 -> 2 -> 3 -> 0
        let mut mesh = Mesh::new();
        let mut loop_edges: Vec<EdgeRef> = Vec::new();
        for v in 0..4 {
            let e = mesh.make_edge();
            if let Some(prev) = loop_edges.last() {
                mesh.splice(Mesh::sym(*prev), e);
            }
            mesh.set_end_points(e, v, (v + 1) % 4);
            loop_edges.push(e);
        }
        mesh.splice(Mesh::sym(loop_edges[3]), loop_edges[0]);

        let diagonal = mesh.connect(loop_edges[0], loop_edges[3]).unwrap();
        assert_eq!(mesh.org(diagonal), Some(1));
        assert_eq!(mesh.dest(diagonal), Some(3));

        mesh.swap(diagonal);
        assert_eq!(mesh.org(diagonal), Some(2));
        assert_eq!(mesh.dest(diagonal), Some(0));
        assert_eq!(mesh.lnext(mesh.lnext(mesh.lnext(diagonal))), diagonal);
        assert_eq!(mesh.len(), 5);
    }
}
