//! Connection graph: candidate edges, Kruskal spanning tree and extra loops

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use log::debug;
use serde::{Deserialize, Serialize};

use super::disjoint_set::DisjointSet;
use crate::geometry::{tetrahedralize, triangulate, Triangulation};
use crate::layout::GridCoord;
use crate::rng::LevelRng;

/// Undirected connection between two room anchors
///
/// The weight is the Euclidean distance between the anchors. `(a, b)` and
/// `(b, a)` compare and hash equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Edge {
    pub a: GridCoord,
    pub b: GridCoord,
    pub weight: f64,
}

impl Edge {
    pub fn new(a: GridCoord, b: GridCoord) -> Self {
        Self {
            a,
            b,
            weight: a.distance(&b),
        }
    }

    /// Endpoints in coordinate order
    pub fn key(&self) -> (GridCoord, GridCoord) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }

    pub fn touches(&self, coord: &GridCoord) -> bool {
        self.a == *coord || self.b == *coord
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} ({:.2})", self.a, self.b, self.weight)
    }
}

/// Output of Kruskal's algorithm
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanningTree {
    pub tree: Vec<Edge>,
    /// Candidate edges not taken into the tree
    pub discarded: Vec<Edge>,
}

/// Kruskal's minimum spanning tree over `points` using candidate `edges`
///
/// Stops once the tree holds `points.len() - 1` edges or the candidates run
/// out; everything not taken is returned as discarded. Edges whose endpoints
/// are not among `points` are discarded.
pub fn minimum_spanning_tree(points: &[GridCoord], edges: &[Edge]) -> SpanningTree {
    let mut result = SpanningTree::default();
    if edges.is_empty() {
        return result;
    }
    let index: BTreeMap<GridCoord, usize> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (*p, i))
        .collect();

    let mut sorted = edges.to_vec();
    sorted.sort_by(|x, y| x.weight.total_cmp(&y.weight));

    let target = index.len().saturating_sub(1);
    let mut sets = DisjointSet::new(points.len());
    let mut remaining = sorted.into_iter();
    while result.tree.len() < target {
        let Some(edge) = remaining.next() else {
            break;
        };
        let joined = match (index.get(&edge.a), index.get(&edge.b)) {
            (Some(&a), Some(&b)) => sets.union(a, b),
            _ => false,
        };
        if joined {
            result.tree.push(edge);
        } else {
            result.discarded.push(edge);
        }
    }
    result.discarded.extend(remaining);
    result
}

/// Spanning tree over the edges of a 2D triangulation of `points`
pub fn minimum_spanning_tree_from_triangulation(
    points: &[GridCoord],
    triangulation: &Triangulation,
) -> SpanningTree {
    let edges: Vec<Edge> = triangulation
        .edges
        .iter()
        .filter(|(a, b)| *a < points.len() && *b < points.len())
        .map(|&(a, b)| Edge::new(points[a], points[b]))
        .collect();
    minimum_spanning_tree(points, &edges)
}

/// Re-admit each discarded edge with probability `chance`
///
/// Returns the number of edges added to `tree`.
pub fn add_random_edges(tree: &mut Vec<Edge>, discarded: &[Edge], rng: &mut LevelRng, chance: f64) -> usize {
    let mut added = 0;
    for edge in discarded {
        if rng.chance(chance) && !tree.contains(edge) {
            tree.push(*edge);
            added += 1;
        }
    }
    added
}

/// Every pair of anchors
pub fn complete_graph(anchors: &[GridCoord]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, a) in anchors.iter().enumerate() {
        for b in &anchors[i + 1..] {
            edges.push(Edge::new(*a, *b));
        }
    }
    edges
}

/// Candidate connections between room anchors
///
/// Anchors on a single floor use the 2D triangulation, otherwise the 3D
/// tetrahedralization. Small or degenerate inputs fall back to the complete
/// graph so the spanning tree can always reach every anchor.
pub fn connection_candidates(grid_size: GridCoord, anchors: &[GridCoord]) -> Vec<Edge> {
    if anchors.len() < 2 {
        return Vec::new();
    }
    if anchors.len() <= 3 {
        return complete_graph(anchors);
    }
    let single_floor = anchors.iter().all(|a| a.z == anchors[0].z);
    let edges = if single_floor {
        let triangulation = triangulate(grid_size, anchors, true);
        triangulation
            .edges
            .iter()
            .map(|&(a, b)| Edge::new(anchors[a], anchors[b]))
            .collect()
    } else {
        let tetrahedralization = tetrahedralize(grid_size, anchors, true);
        tetrahedralization.diagnostics();
        tetrahedralization.edges()
    };
    if spans(anchors, &edges) {
        edges
    } else {
        debug!(
            "Candidate graph over {} anchors is disconnected, using every pair",
            anchors.len()
        );
        complete_graph(anchors)
    }
}

/// Whether `edges` connect every distinct anchor
fn spans(anchors: &[GridCoord], edges: &[Edge]) -> bool {
    let index: BTreeMap<GridCoord, usize> = anchors
        .iter()
        .enumerate()
        .map(|(i, p)| (*p, i))
        .collect();
    let mut sets = DisjointSet::new(anchors.len());
    for edge in edges {
        if let (Some(&a), Some(&b)) = (index.get(&edge.a), index.get(&edge.b)) {
            sets.union(a, b);
        }
    }
    let Some(&first) = index.values().next() else {
        return true;
    };
    index.values().all(|&i| sets.connected(first, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32, z: i32) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    #[test]
    fn test_edge_symmetric_equality() {
        let e1 = Edge::new(p(0, 0, 0), p(3, 4, 0));
        let e2 = Edge::new(p(3, 4, 0), p(0, 0, 0));
        assert_eq!(e1, e2);
        assert!((e1.weight - 5.0).abs() < 1e-12);
        let mut set = hashbrown::HashSet::new();
        set.insert(e1);
        assert!(set.contains(&e2));
    }

    #[test]
    fn test_unit_square_mst() {
        let points = [p(0, 0, 0), p(1, 0, 0), p(1, 1, 0), p(0, 1, 0)];
        let edges = complete_graph(&points);
        assert_eq!(edges.len(), 6);
        let result = minimum_spanning_tree(&points, &edges);
        assert_eq!(result.tree.len(), 3);
        assert!(result.tree.iter().all(|e| (e.weight - 1.0).abs() < 1e-12));
        assert_eq!(result.discarded.len(), 3);
    }

    #[test]
    fn test_empty_edges() {
        let result = minimum_spanning_tree(&[p(0, 0, 0), p(1, 0, 0)], &[]);
        assert!(result.tree.is_empty());
        assert!(result.discarded.is_empty());
    }

    #[test]
    fn test_disconnected_candidates_stop_when_exhausted() {
        let points = [p(0, 0, 0), p(1, 0, 0), p(5, 5, 0), p(6, 5, 0)];
        let edges = [Edge::new(points[0], points[1]), Edge::new(points[2], points[3])];
        let result = minimum_spanning_tree(&points, &edges);
        assert_eq!(result.tree.len(), 2);
        assert!(result.discarded.is_empty());
    }

    #[test]
    fn test_from_triangulation() {
        let points = [p(0, 0, 0), p(4, 0, 0), p(0, 3, 0), p(4, 3, 0)];
        let triangulation = triangulate(p(10, 10, 1), &points, true);
        let result = minimum_spanning_tree_from_triangulation(&points, &triangulation);
        assert_eq!(result.tree.len(), 3);
        let total: f64 = result.tree.iter().map(|e| e.weight).sum();
        assert!((total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_random_edges_extremes() {
        let discarded = [Edge::new(p(0, 0, 0), p(2, 2, 0)), Edge::new(p(1, 0, 0), p(0, 1, 0))];
        let mut rng = LevelRng::new(5);

        let mut tree = Vec::new();
        assert_eq!(add_random_edges(&mut tree, &discarded, &mut rng, -1.0), 0);
        assert!(tree.is_empty());

        assert_eq!(add_random_edges(&mut tree, &discarded, &mut rng, 1.0), 2);
        // Already present edges are not added twice
        assert_eq!(add_random_edges(&mut tree, &discarded, &mut rng, 1.0), 0);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_candidates_small_inputs() {
        assert!(connection_candidates(p(5, 5, 1), &[p(0, 0, 0)]).is_empty());
        assert_eq!(
            connection_candidates(p(5, 5, 1), &[p(0, 0, 0), p(4, 0, 0), p(2, 3, 0)]).len(),
            3
        );
    }

    #[test]
    fn test_candidates_collinear_fall_back() {
        let anchors = [p(0, 0, 0), p(2, 0, 0), p(4, 0, 0), p(6, 0, 0)];
        let edges = connection_candidates(p(8, 2, 1), &anchors);
        assert!(spans(&anchors, &edges));
    }

    #[test]
    fn test_candidates_coplanar_3d_fall_back() {
        // Two floors but every anchor on the plane x = 0: no tetrahedra
        let anchors = [p(0, 0, 0), p(0, 4, 0), p(0, 0, 2), p(0, 4, 2), p(0, 2, 1)];
        let edges = connection_candidates(p(2, 6, 3), &anchors);
        assert!(spans(&anchors, &edges));
        assert_eq!(edges.len(), 10);
    }

    #[test]
    fn test_candidates_multi_floor_span() {
        let anchors = [
            p(0, 0, 0),
            p(6, 1, 0),
            p(2, 7, 1),
            p(3, 3, 2),
            p(8, 8, 1),
            p(1, 9, 2),
        ];
        let edges = connection_candidates(p(10, 10, 3), &anchors);
        assert!(spans(&anchors, &edges));
        assert!(edges.len() < 15);
    }
}
