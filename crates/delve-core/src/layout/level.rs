//! The level layout aggregate threaded through every generation phase

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::coord::GridCoord;
use super::tile::{PathTile, Tile, TileKind};
use crate::graph::Edge;
use crate::rng::LevelRng;

/// Rooms, corridors and connections of one generated level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    rng: LevelRng,
    grid_size: GridCoord,
    #[serde(with = "coord_map")]
    tiles: BTreeMap<GridCoord, Tile>,
    #[serde(with = "coord_map")]
    path_tiles: BTreeMap<GridCoord, PathTile>,
    connections: Vec<Edge>,
}

impl LevelLayout {
    pub fn new(grid_size: GridCoord, rng: LevelRng) -> Self {
        Self {
            rng,
            grid_size,
            tiles: BTreeMap::new(),
            path_tiles: BTreeMap::new(),
            connections: Vec::new(),
        }
    }

    pub fn rng(&mut self) -> &mut LevelRng {
        &mut self.rng
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn grid_size(&self) -> GridCoord {
        self.grid_size
    }

    pub fn tiles(&self) -> &BTreeMap<GridCoord, Tile> {
        &self.tiles
    }

    pub fn tile(&self, coord: &GridCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    pub fn tile_mut(&mut self, coord: &GridCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(coord)
    }

    /// Kind of the tile at `coord`, `Empty` if none
    pub fn kind_at(&self, coord: &GridCoord) -> TileKind {
        self.tiles.get(coord).map_or(TileKind::Empty, |t| t.kind)
    }

    /// Insert a tile; an existing tile at the same cell is kept
    ///
    /// Returns false when the cell was already occupied.
    pub fn insert_tile(&mut self, coord: GridCoord, tile: Tile) -> bool {
        if self.tiles.contains_key(&coord) {
            return false;
        }
        self.tiles.insert(coord, tile);
        true
    }

    pub fn is_occupied(&self, coord: &GridCoord) -> bool {
        self.tiles.contains_key(coord)
    }

    pub fn contains_coord(&self, coord: &GridCoord) -> bool {
        self.grid_size.contains(coord)
    }

    /// Grid cells without a tile
    pub fn free_volume(&self) -> i64 {
        (self.grid_size.volume() - self.tiles.len() as i64).max(0)
    }

    /// Anchors of basic, key and special rooms, in coordinate order
    pub fn room_anchors(&self) -> Vec<GridCoord> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.kind.is_room_anchor())
            .map(|(coord, _)| *coord)
            .collect()
    }

    pub fn path_tiles(&self) -> &BTreeMap<GridCoord, PathTile> {
        &self.path_tiles
    }

    pub fn path_tile(&self, coord: &GridCoord) -> Option<&PathTile> {
        self.path_tiles.get(coord)
    }

    pub fn path_tile_mut(&mut self, coord: &GridCoord) -> Option<&mut PathTile> {
        self.path_tiles.get_mut(coord)
    }

    /// Path descriptor at `coord`, created empty with the given kind if absent
    pub fn path_tile_entry(&mut self, coord: GridCoord, kind: TileKind) -> &mut PathTile {
        self.path_tiles.entry(coord).or_insert_with(|| PathTile {
            kind,
            ..Default::default()
        })
    }

    pub fn insert_path_tile(&mut self, coord: GridCoord, path_tile: PathTile) {
        self.path_tiles.insert(coord, path_tile);
    }

    /// Edges chosen to become corridors
    pub fn connections(&self) -> &[Edge] {
        &self.connections
    }

    pub fn set_connections(&mut self, connections: Vec<Edge>) {
        self.connections = connections;
    }

    /// Number of placed rooms, sections excluded
    pub fn rooms(&self) -> usize {
        self.tiles.values().filter(|t| t.kind.is_room_anchor()).count()
    }

    /// Number of corridor tiles of every kind
    pub fn corridors(&self) -> usize {
        self.tiles.values().filter(|t| t.kind.is_corridor()).count()
    }

    /// Tiles on one floor, in coordinate order
    pub fn floor(&self, z: i32) -> impl Iterator<Item = (&GridCoord, &Tile)> {
        self.tiles.iter().filter(move |(coord, _)| coord.z == z)
    }
}

/// Serialize a coordinate-keyed map as a sequence of `{coord, value}` entries
pub(crate) mod coord_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::layout::GridCoord;

    #[derive(Serialize)]
    struct EntryRef<'a, V> {
        coord: &'a GridCoord,
        value: &'a V,
    }

    #[derive(Deserialize)]
    struct Entry<V> {
        coord: GridCoord,
        value: V,
    }

    pub fn serialize<S, V>(map: &BTreeMap<GridCoord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_seq(map.iter().map(|(coord, value)| EntryRef { coord, value }))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<GridCoord, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let entries: Vec<Entry<V>> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|e| (e.coord, e.value)).collect())
    }
}
