//! Geometry kernel
//!
//! Predicates, the quad-edge mesh, 2D Delaunay triangulation and 3D
//! tetrahedralization used to propose room connections.

pub mod delaunay;
pub mod predicates;
pub mod quad_edge;
pub mod tetrahedralize;

pub use delaunay::{triangulate, Triangulation};
pub use quad_edge::{EdgeRef, QuadEdgeMesh};
pub use tetrahedralize::{tetrahedralize, Diagnostics, Tetrahedralization};
