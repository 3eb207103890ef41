//! Level generation settings
//!
//! Catalogs, room lists, structure templates and the switches that gate each
//! generation phase. Everything derives serde so settings can live in files.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::layout::{
    AccessPoint, CorridorKind, DirectionSet, GridCoord, Rotation, SpecialPathKind, TileKind,
};

/// Access point declared by a template, local frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointTemplate {
    pub offset: GridCoord,
    pub directions: DirectionSet,
}

impl AccessPointTemplate {
    pub fn new(offset: GridCoord, directions: DirectionSet) -> Self {
        Self { offset, directions }
    }

    pub fn to_access_point(&self) -> AccessPoint {
        AccessPoint::new(self.offset, self.directions)
    }
}

/// A room that can be placed on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomTemplate {
    pub name: String,
    pub selection_chance: f64,
    pub fixed_rotation: Option<Rotation>,
    pub fixed_coordinate: Option<GridCoord>,
    /// Local cells covered by the room, must contain the origin
    pub footprint: Vec<GridCoord>,
    pub access_points: Vec<AccessPointTemplate>,
}

impl Default for RoomTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            selection_chance: 1.0,
            fixed_rotation: None,
            fixed_coordinate: None,
            footprint: vec![GridCoord::ZERO],
            access_points: Vec::new(),
        }
    }
}

impl RoomTemplate {
    /// Single-cell room open on the given sides
    pub fn single(name: impl Into<String>, directions: DirectionSet) -> Self {
        Self {
            name: name.into(),
            access_points: vec![AccessPointTemplate::new(GridCoord::ZERO, directions)],
            ..Default::default()
        }
    }
}

/// Weighted list of basic rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomList {
    pub weight: f64,
    pub rooms: Vec<RoomTemplate>,
}

/// Rooms that must appear a given number of times
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyRoomSettings {
    pub quantity: u32,
    pub rooms: Vec<RoomTemplate>,
}

/// Rooms that appear at most once, with some probability
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialRoomSettings {
    pub chance: f64,
    pub rooms: Vec<RoomTemplate>,
}

/// Content for corridor and structure tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub name: String,
    pub selection_chance: f64,
    pub access_points: Vec<AccessPointTemplate>,
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            selection_chance: 1.0,
            access_points: Vec::new(),
        }
    }
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_access_point(mut self, offset: GridCoord, directions: DirectionSet) -> Self {
        self.access_points
            .push(AccessPointTemplate::new(offset, directions));
        self
    }
}

/// Footprint and exit of a special structure
///
/// Cells are ordered origin first and the cell the exit leaves from last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub footprint: Vec<GridCoord>,
    pub exit: GridCoord,
    pub node_weight: f64,
}

impl StructureTemplate {
    /// Straight flight climbing one storey over two cells
    pub fn stairs_1x2x2() -> Self {
        Self {
            footprint: vec![
                GridCoord::new(0, 0, 0),
                GridCoord::new(1, 0, 0),
                GridCoord::new(0, 0, 1),
                GridCoord::new(1, 0, 1),
            ],
            exit: GridCoord::new(2, 0, 1),
            node_weight: 1.0,
        }
    }

    /// Steep flight climbing one storey within one cell
    pub fn stairs_1x1x2() -> Self {
        Self {
            footprint: vec![GridCoord::new(0, 0, 0), GridCoord::new(0, 0, 1)],
            exit: GridCoord::new(1, 0, 1),
            node_weight: 1.0,
        }
    }

    /// Shaft spanning `levels` storeys, left from its top cell
    pub fn elevator(levels: i32) -> Self {
        let levels = levels.max(2);
        Self {
            footprint: (0..levels).map(|z| GridCoord::new(0, 0, z)).collect(),
            exit: GridCoord::new(0, 0, levels - 1),
            node_weight: 2.0,
        }
    }

    pub fn exit_in_footprint(&self) -> bool {
        self.footprint.contains(&self.exit)
    }

    /// Default template for a structure kind, if the kind is placeable
    pub fn preset(kind: SpecialPathKind) -> Option<Self> {
        match kind {
            SpecialPathKind::Stairs1x1x2 => Some(Self::stairs_1x1x2()),
            SpecialPathKind::Stairs1x2x2 => Some(Self::stairs_1x2x2()),
            _ => kind.elevator_levels().map(Self::elevator),
        }
    }
}

fn default_structure_templates() -> BTreeMap<SpecialPathKind, StructureTemplate> {
    let mut templates = BTreeMap::new();
    templates.insert(SpecialPathKind::Stairs1x1x2, StructureTemplate::stairs_1x1x2());
    templates.insert(SpecialPathKind::Stairs1x2x2, StructureTemplate::stairs_1x2x2());
    for levels in 2..=10 {
        if let Some(kind) = SpecialPathKind::elevator(levels) {
            templates.insert(kind, StructureTemplate::elevator(levels));
        }
    }
    templates
}

/// Everything a generation run needs besides the seed stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    /// Fixed seed; a random one is drawn when absent
    pub seed: Option<u64>,
    pub grid_size: GridCoord,
    /// World units per grid cell, carried for callers
    pub tile_size: u32,

    pub corridor_catalog: BTreeMap<CorridorKind, Vec<CatalogEntry>>,
    pub allowed_structures: BTreeMap<SpecialPathKind, bool>,
    pub structure_templates: BTreeMap<SpecialPathKind, StructureTemplate>,
    pub structure_catalog: BTreeMap<SpecialPathKind, Vec<CatalogEntry>>,
    /// Probability of re-admitting each discarded connection
    pub extra_corridor_chance: f64,
    /// Pathfinding cost of stepping onto each kind of cell
    pub tile_type_weight: BTreeMap<TileKind, f64>,

    pub basic_rooms: Vec<RoomList>,
    /// Chebyshev radius around a room kept free of other rooms
    pub room_buffer: u32,
    pub basic_rooms_min: u32,
    pub basic_rooms_max: u32,
    pub key_rooms: BTreeMap<String, KeyRoomSettings>,
    pub special_rooms: BTreeMap<String, SpecialRoomSettings>,

    pub generate_key_rooms: bool,
    pub generate_special_rooms: bool,
    pub generate_basic_rooms: bool,
    pub generate_corridors: bool,
    /// Log every chosen connection at debug level
    pub log_connections: bool,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            seed: None,
            grid_size: GridCoord::new(10, 10, 1),
            tile_size: 1000,
            corridor_catalog: BTreeMap::new(),
            allowed_structures: BTreeMap::new(),
            structure_templates: default_structure_templates(),
            structure_catalog: BTreeMap::new(),
            extra_corridor_chance: 0.2,
            tile_type_weight: BTreeMap::new(),
            basic_rooms: Vec::new(),
            room_buffer: 1,
            basic_rooms_min: 1,
            basic_rooms_max: 1,
            key_rooms: BTreeMap::new(),
            special_rooms: BTreeMap::new(),
            generate_key_rooms: true,
            generate_special_rooms: true,
            generate_basic_rooms: true,
            generate_corridors: true,
            log_connections: false,
        }
    }
}

impl LevelSettings {
    /// Pathfinding weight for a kind of cell, 0 when unset
    pub fn tile_weight(&self, kind: TileKind) -> f64 {
        self.tile_type_weight.get(&kind).copied().unwrap_or(0.0)
    }

    /// Allowed structures that have a template, in kind order
    pub fn enabled_structures(&self) -> Vec<(SpecialPathKind, &StructureTemplate)> {
        self.allowed_structures
            .iter()
            .filter(|(_, allowed)| **allowed)
            .filter_map(|(kind, _)| self.structure_templates.get(kind).map(|t| (*kind, t)))
            .collect()
    }

    pub fn allow_structure(&mut self, kind: SpecialPathKind) {
        self.allowed_structures.insert(kind, true);
    }

    /// Check the settings for values generation would silently degrade on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.grid_size.is_positive() {
            return Err(SettingsError::InvalidGridSize {
                size: self.grid_size,
            });
        }
        if self.basic_rooms_min > self.basic_rooms_max {
            return Err(SettingsError::InvertedRoomRange {
                min: self.basic_rooms_min,
                max: self.basic_rooms_max,
            });
        }
        check_probability("extra_corridor_chance", self.extra_corridor_chance)?;
        for (name, special) in &self.special_rooms {
            check_probability(name, special.chance)?;
            for room in &special.rooms {
                validate_room(room)?;
            }
        }
        for key in self.key_rooms.values() {
            for room in &key.rooms {
                validate_room(room)?;
            }
        }
        for (index, list) in self.basic_rooms.iter().enumerate() {
            check_weight(&format!("basic room list {}", index), list.weight)?;
            for room in &list.rooms {
                validate_room(room)?;
            }
        }
        for entries in self
            .corridor_catalog
            .values()
            .chain(self.structure_catalog.values())
        {
            for entry in entries {
                check_weight(&entry.name, entry.selection_chance)?;
            }
        }
        for (kind, template) in &self.structure_templates {
            validate_structure(*kind, template)?;
        }
        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), SettingsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::InvalidProbability {
            name: name.to_string(),
            value,
        })
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), SettingsError> {
    if value < 0.0 {
        return Err(SettingsError::NegativeWeight {
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn validate_room(room: &RoomTemplate) -> Result<(), SettingsError> {
    check_weight(&room.name, room.selection_chance)?;
    if !room.footprint.contains(&GridCoord::ZERO) {
        return Err(SettingsError::InvalidRoomFootprint {
            name: room.name.clone(),
            reason: "footprint does not contain the origin".to_string(),
        });
    }
    let unique: BTreeSet<_> = room.footprint.iter().collect();
    if unique.len() != room.footprint.len() {
        return Err(SettingsError::InvalidRoomFootprint {
            name: room.name.clone(),
            reason: "footprint has duplicate cells".to_string(),
        });
    }
    if let Some(ap) = room
        .access_points
        .iter()
        .find(|ap| !room.footprint.contains(&ap.offset))
    {
        return Err(SettingsError::AccessPointOutsideFootprint {
            name: room.name.clone(),
            offset: ap.offset,
        });
    }
    Ok(())
}

fn validate_structure(kind: SpecialPathKind, template: &StructureTemplate) -> Result<(), SettingsError> {
    if template.footprint.first() != Some(&GridCoord::ZERO) {
        return Err(SettingsError::InvalidStructure {
            kind,
            reason: "footprint must start at the origin".to_string(),
        });
    }
    let unique: BTreeSet<_> = template.footprint.iter().collect();
    if unique.len() != template.footprint.len() {
        return Err(SettingsError::InvalidStructure {
            kind,
            reason: "footprint has duplicate cells".to_string(),
        });
    }
    if template.node_weight < 0.0 {
        return Err(SettingsError::InvalidStructure {
            kind,
            reason: format!("negative node weight {}", template.node_weight),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert_eq!(LevelSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_grid_rejected() {
        let settings = LevelSettings {
            grid_size: GridCoord::new(4, 0, 1),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidGridSize { .. })
        ));
    }

    #[test]
    fn test_inverted_room_range_rejected() {
        let settings = LevelSettings {
            basic_rooms_min: 5,
            basic_rooms_max: 2,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvertedRoomRange { min: 5, max: 2 })
        );
    }

    #[test]
    fn test_bad_probability_rejected() {
        let settings = LevelSettings {
            extra_corridor_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_room_access_point_outside_footprint() {
        let mut room = RoomTemplate::single("cell", DirectionSet::NORTH);
        room.access_points[0].offset = GridCoord::new(2, 0, 0);
        let settings = LevelSettings {
            basic_rooms: vec![RoomList {
                weight: 1.0,
                rooms: vec![room],
            }],
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::AccessPointOutsideFootprint { .. })
        ));
    }

    #[test]
    fn test_structure_presets() {
        let stairs = StructureTemplate::stairs_1x2x2();
        assert_eq!(stairs.footprint.len(), 4);
        assert!(!stairs.exit_in_footprint());

        let shaft = StructureTemplate::elevator(4);
        assert_eq!(shaft.footprint.len(), 4);
        assert!(shaft.exit_in_footprint());
        assert_eq!(shaft.footprint.last(), Some(&shaft.exit));

        assert!(StructureTemplate::preset(SpecialPathKind::ElevatorTop).is_none());
        assert!(StructureTemplate::preset(SpecialPathKind::ElevatorS10).is_some());
    }

    #[test]
    fn test_enabled_structures_in_kind_order() {
        let mut settings = LevelSettings::default();
        assert!(settings.enabled_structures().is_empty());
        settings.allow_structure(SpecialPathKind::ElevatorS3);
        settings.allow_structure(SpecialPathKind::Stairs1x2x2);
        settings
            .allowed_structures
            .insert(SpecialPathKind::Stairs1x1x2, false);
        let kinds: Vec<_> = settings.enabled_structures().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![SpecialPathKind::Stairs1x2x2, SpecialPathKind::ElevatorS3]
        );
    }

    #[test]
    fn test_settings_json_roundtrip_with_defaults() {
        let json = r#"{ "grid_size": { "x": 6, "y": 6, "z": 2 }, "room_buffer": 0 }"#;
        let settings: LevelSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.grid_size, GridCoord::new(6, 6, 2));
        assert_eq!(settings.room_buffer, 0);
        assert!((settings.extra_corridor_chance - 0.2).abs() < 1e-12);
        assert!(settings.generate_corridors);
    }
}
