//! delve-core: Procedural 3D dungeon layout engine
//!
//! Places rooms inside a voxel grid, links them with a minimum spanning tree
//! over a Delaunay triangulation (or tetrahedralization when rooms span
//! several floors) and routes corridors with an A* search that can insert
//! stairs and elevator shafts.
//!
//! Everything is driven by one seeded [`LevelRng`], so the same settings and
//! seed always produce the same layout. This crate does no I/O.

pub mod error;
pub mod generation;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod placement;
pub mod rng;
pub mod router;
pub mod settings;

pub use error::SettingsError;
pub use generation::{generate_corridors, generate_level};
pub use graph::Edge;
pub use layout::{
    AccessPoint, CorridorKind, Direction, DirectionSet, GridCoord, LevelLayout, PathTile, Rotation,
    SpecialPathKind, Tile, TileKind,
};
pub use rng::LevelRng;
pub use router::RouteReport;
pub use settings::{LevelSettings, RoomTemplate, StructureTemplate};
