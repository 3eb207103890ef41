//! Graph connector
//!
//! Reduces candidate room connections to a minimum spanning tree and adds a
//! few of the rejected edges back as loops.

pub mod disjoint_set;
pub mod mst;

pub use disjoint_set::DisjointSet;
pub use mst::{
    add_random_edges, complete_graph, connection_candidates, minimum_spanning_tree,
    minimum_spanning_tree_from_triangulation, Edge, SpanningTree,
};
