//! Level layout data model
//!
//! Coordinates, directions, tiles and the aggregate that collects them.

mod coord;
mod direction;
mod level;
mod tile;

pub use coord::{GridCoord, Rotation};
pub use direction::{Direction, DirectionSet};
pub use level::LevelLayout;
pub use tile::{
    AccessPoint, CorridorKind, PathTile, SpecialPathKind, StructurePlacement, Tile, TileKind,
};
