//! Tiles, access points and pre-finalization path descriptors

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::coord::{GridCoord, Rotation};
use super::direction::{Direction, DirectionSet};

/// What occupies a grid cell
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum TileKind {
    #[default]
    Empty,
    Basic,
    Key,
    Special,
    RoomSection,
    Corridor,
    CorridorSection,
    CorridorSpecial,
}

impl TileKind {
    /// Basic, key and special rooms own an anchor cell
    pub fn is_room_anchor(self) -> bool {
        matches!(self, TileKind::Basic | TileKind::Key | TileKind::Special)
    }

    /// Any cell that belongs to a room
    pub fn is_room(self) -> bool {
        self.is_room_anchor() || self == TileKind::RoomSection
    }

    pub fn is_corridor(self) -> bool {
        matches!(
            self,
            TileKind::Corridor | TileKind::CorridorSection | TileKind::CorridorSpecial
        )
    }

    /// Single character used by map dumps
    pub fn symbol(self) -> char {
        match self {
            TileKind::Empty => ' ',
            TileKind::Basic => 'B',
            TileKind::Key => 'K',
            TileKind::Special => 'S',
            TileKind::RoomSection => 'r',
            TileKind::Corridor => '#',
            TileKind::CorridorSection => '=',
            TileKind::CorridorSpecial => '%',
        }
    }
}

/// Corridor shape by its horizontal connections
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum CorridorKind {
    ZeroWay,
    OneWay,
    TwoWay,
    Corner,
    ThreeWay,
    FourWay,
}

impl CorridorKind {
    /// Shape and rotation for a set of horizontal connections
    pub fn from_connections(connections: DirectionSet) -> (CorridorKind, Rotation) {
        let h = connections.horizontal();
        let n = h.has(Direction::North);
        let e = h.has(Direction::East);
        let s = h.has(Direction::South);
        let w = h.has(Direction::West);
        match h.len() {
            4 => (CorridorKind::FourWay, Rotation::R0),
            3 => {
                let rotation = if !w {
                    Rotation::R0
                } else if !n {
                    Rotation::R90
                } else if !e {
                    Rotation::R180
                } else {
                    Rotation::R270
                };
                (CorridorKind::ThreeWay, rotation)
            }
            2 => {
                if n && s {
                    (CorridorKind::TwoWay, Rotation::R0)
                } else if e && w {
                    (CorridorKind::TwoWay, Rotation::R90)
                } else if n && e {
                    (CorridorKind::Corner, Rotation::R0)
                } else if e && s {
                    (CorridorKind::Corner, Rotation::R90)
                } else if s && w {
                    (CorridorKind::Corner, Rotation::R180)
                } else {
                    (CorridorKind::Corner, Rotation::R270)
                }
            }
            1 => {
                let rotation = if n {
                    Rotation::R0
                } else if e {
                    Rotation::R90
                } else if s {
                    Rotation::R180
                } else {
                    Rotation::R270
                };
                (CorridorKind::OneWay, rotation)
            }
            _ => (CorridorKind::ZeroWay, Rotation::R0),
        }
    }
}

/// Multi-cell corridor structures the router can insert
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum SpecialPathKind {
    Stairs1x1x2,
    Stairs1x2x2,
    ElevatorBottom,
    ElevatorMiddle,
    ElevatorTop,
    ElevatorS2,
    ElevatorS3,
    ElevatorS4,
    ElevatorS5,
    ElevatorS6,
    ElevatorS7,
    ElevatorS8,
    ElevatorS9,
    ElevatorS10,
}

impl SpecialPathKind {
    /// Storeys spanned by an elevator shaft kind
    pub fn elevator_levels(self) -> Option<i32> {
        match self {
            SpecialPathKind::ElevatorS2 => Some(2),
            SpecialPathKind::ElevatorS3 => Some(3),
            SpecialPathKind::ElevatorS4 => Some(4),
            SpecialPathKind::ElevatorS5 => Some(5),
            SpecialPathKind::ElevatorS6 => Some(6),
            SpecialPathKind::ElevatorS7 => Some(7),
            SpecialPathKind::ElevatorS8 => Some(8),
            SpecialPathKind::ElevatorS9 => Some(9),
            SpecialPathKind::ElevatorS10 => Some(10),
            _ => None,
        }
    }

    /// Elevator shaft kind spanning `levels` storeys
    pub fn elevator(levels: i32) -> Option<SpecialPathKind> {
        match levels {
            2 => Some(SpecialPathKind::ElevatorS2),
            3 => Some(SpecialPathKind::ElevatorS3),
            4 => Some(SpecialPathKind::ElevatorS4),
            5 => Some(SpecialPathKind::ElevatorS5),
            6 => Some(SpecialPathKind::ElevatorS6),
            7 => Some(SpecialPathKind::ElevatorS7),
            8 => Some(SpecialPathKind::ElevatorS8),
            9 => Some(SpecialPathKind::ElevatorS9),
            10 => Some(SpecialPathKind::ElevatorS10),
            _ => None,
        }
    }

    pub fn is_elevator_shaft(self) -> bool {
        self.elevator_levels().is_some()
    }
}

/// A cell of a tile where corridors may attach
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Offset from the tile anchor, in the tile's local frame
    pub offset: GridCoord,
    /// Exits corridors may use, local frame
    pub directions: DirectionSet,
    /// Exits actually connected, always a subset of `directions`
    pub in_use: DirectionSet,
}

impl AccessPoint {
    pub fn new(offset: GridCoord, directions: DirectionSet) -> Self {
        Self {
            offset,
            directions,
            in_use: DirectionSet::empty(),
        }
    }

    /// Mark a local exit as connected
    ///
    /// Returns false and changes nothing if the exit is not accessible.
    pub fn use_direction(&mut self, direction: Direction) -> bool {
        if !self.directions.has(direction) {
            return false;
        }
        self.in_use.add(direction);
        true
    }

    /// Accessible exits not yet connected
    pub fn free_directions(&self) -> DirectionSet {
        self.directions - self.in_use
    }
}

/// A placed room, corridor or structure cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub rotation: Rotation,
    /// Opaque content reference resolved by the caller
    pub content: String,
    /// Local offsets covered by the tile, origin first
    pub footprint: Vec<GridCoord>,
    pub access_points: Vec<AccessPoint>,
    /// Anchor of the owning tile, for section tiles
    pub parent: Option<GridCoord>,
    pub corridor: Option<CorridorKind>,
    pub structure: Option<SpecialPathKind>,
}

impl Tile {
    pub fn new(kind: TileKind, rotation: Rotation, content: impl Into<String>) -> Self {
        Self {
            kind,
            rotation,
            content: content.into(),
            footprint: vec![GridCoord::ZERO],
            access_points: Vec::new(),
            parent: None,
            corridor: None,
            structure: None,
        }
    }

    /// Subordinate cell sharing the occupancy of the tile anchored at `parent`
    pub fn section(kind: TileKind, rotation: Rotation, parent: GridCoord) -> Self {
        Self {
            parent: Some(parent),
            ..Tile::new(kind, rotation, String::new())
        }
    }

    pub fn with_footprint(mut self, footprint: Vec<GridCoord>) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn with_access_points(mut self, access_points: Vec<AccessPoint>) -> Self {
        self.access_points = access_points;
        self
    }

    /// World cells covered when anchored at `anchor`
    pub fn cells(&self, anchor: GridCoord) -> Vec<GridCoord> {
        self.footprint
            .iter()
            .map(|offset| anchor + offset.rotated(self.rotation))
            .collect()
    }

    /// World cell of an access point when anchored at `anchor`
    pub fn access_point_location(&self, anchor: GridCoord, access_point: &AccessPoint) -> GridCoord {
        anchor + access_point.offset.rotated(self.rotation)
    }

    pub fn access_point(&self, offset: GridCoord) -> Option<&AccessPoint> {
        self.access_points.iter().find(|ap| ap.offset == offset)
    }

    pub fn access_point_mut(&mut self, offset: GridCoord) -> Option<&mut AccessPoint> {
        self.access_points.iter_mut().find(|ap| ap.offset == offset)
    }

    /// Total accessible exits over all access points
    pub fn accessible_direction_count(&self) -> usize {
        self.access_points.iter().map(|ap| ap.directions.len()).sum()
    }
}

/// Placement of a special structure committed by the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructurePlacement {
    pub kind: SpecialPathKind,
    pub rotation: Rotation,
    pub origin: GridCoord,
    /// World cells in template order, origin first
    pub cells: Vec<GridCoord>,
}

impl StructurePlacement {
    /// Same structure at the same place, cells aside
    pub fn same_site(&self, kind: SpecialPathKind, rotation: Rotation, origin: GridCoord) -> bool {
        self.kind == kind && self.rotation == rotation && self.origin == origin
    }
}

/// Corridor cell recorded by the router before tiles are chosen
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathTile {
    pub kind: TileKind,
    /// World direction to each connected neighbour and what lies there
    pub adjacency: BTreeMap<Direction, TileKind>,
    /// Structure this cell belongs to, for structure cells
    pub structure: Option<StructurePlacement>,
}

impl PathTile {
    pub fn corridor() -> Self {
        Self {
            kind: TileKind::Corridor,
            ..Default::default()
        }
    }

    pub fn structure_cell(kind: TileKind, placement: StructurePlacement) -> Self {
        Self {
            kind,
            adjacency: BTreeMap::new(),
            structure: Some(placement),
        }
    }

    /// Add connections, keeping existing entries
    pub fn merge_adjacency(&mut self, adjacency: &BTreeMap<Direction, TileKind>) {
        for (direction, kind) in adjacency {
            self.adjacency.entry(*direction).or_insert(*kind);
        }
    }

    pub fn connections(&self) -> DirectionSet {
        self.adjacency.keys().copied().collect()
    }

    pub fn is_structure(&self) -> bool {
        self.structure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(dirs: &[Direction]) -> DirectionSet {
        dirs.iter().copied().collect()
    }

    #[test]
    fn test_corridor_pattern_table() {
        use Direction::*;
        let cases = [
            (vec![North, East, South, West], CorridorKind::FourWay, Rotation::R0),
            (vec![North, East, South], CorridorKind::ThreeWay, Rotation::R0),
            (vec![East, South, West], CorridorKind::ThreeWay, Rotation::R90),
            (vec![North, South, West], CorridorKind::ThreeWay, Rotation::R180),
            (vec![North, East, West], CorridorKind::ThreeWay, Rotation::R270),
            (vec![North, East], CorridorKind::Corner, Rotation::R0),
            (vec![East, South], CorridorKind::Corner, Rotation::R90),
            (vec![South, West], CorridorKind::Corner, Rotation::R180),
            (vec![West, North], CorridorKind::Corner, Rotation::R270),
            (vec![North, South], CorridorKind::TwoWay, Rotation::R0),
            (vec![East, West], CorridorKind::TwoWay, Rotation::R90),
            (vec![North], CorridorKind::OneWay, Rotation::R0),
            (vec![East], CorridorKind::OneWay, Rotation::R90),
            (vec![South], CorridorKind::OneWay, Rotation::R180),
            (vec![West], CorridorKind::OneWay, Rotation::R270),
            (vec![], CorridorKind::ZeroWay, Rotation::R0),
        ];
        for (dirs, kind, rotation) in cases {
            assert_eq!(
                CorridorKind::from_connections(set(&dirs)),
                (kind, rotation),
                "{:?}",
                dirs
            );
        }
    }

    #[test]
    fn test_vertical_connections_ignored() {
        use Direction::*;
        assert_eq!(
            CorridorKind::from_connections(set(&[Above, Below, North])),
            (CorridorKind::OneWay, Rotation::R0)
        );
    }

    #[test]
    fn test_access_point_in_use_subset() {
        let mut ap = AccessPoint::new(GridCoord::ZERO, set(&[Direction::North, Direction::East]));
        assert!(ap.use_direction(Direction::North));
        assert!(!ap.use_direction(Direction::South));
        assert!(ap.directions.contains(ap.in_use));
        assert_eq!(ap.free_directions(), DirectionSet::EAST);
    }

    #[test]
    fn test_tile_cells_rotated() {
        let tile = Tile::new(TileKind::Basic, Rotation::R90, "hall")
            .with_footprint(vec![GridCoord::ZERO, GridCoord::new(1, 0, 0)]);
        let anchor = GridCoord::new(2, 2, 0);
        assert_eq!(
            tile.cells(anchor),
            vec![GridCoord::new(2, 2, 0), GridCoord::new(2, 3, 0)]
        );
    }

    #[test]
    fn test_elevator_kinds() {
        for levels in 2..=10 {
            let kind = SpecialPathKind::elevator(levels).unwrap();
            assert_eq!(kind.elevator_levels(), Some(levels));
        }
        assert!(SpecialPathKind::elevator(1).is_none());
        assert!(!SpecialPathKind::Stairs1x2x2.is_elevator_shaft());
    }

    #[test]
    fn test_merge_adjacency_keeps_existing() {
        let mut tile = PathTile::corridor();
        tile.adjacency.insert(Direction::North, TileKind::Basic);
        let mut other = BTreeMap::new();
        other.insert(Direction::North, TileKind::Corridor);
        other.insert(Direction::South, TileKind::Corridor);
        tile.merge_adjacency(&other);
        assert_eq!(tile.adjacency[&Direction::North], TileKind::Basic);
        assert_eq!(tile.connections(), set(&[Direction::North, Direction::South]));
    }
}
