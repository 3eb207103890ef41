//! delve-cli: Command-line driver for the delve dungeon generator
//!
//! Builds settings from a file or the built-in demo set, runs one
//! generation and renders each floor as an ASCII map.

use std::fmt::Write;
use std::path::PathBuf;

use log::info;
use strum::IntoEnumIterator;
use thiserror::Error;

use delve_core::layout::{CorridorKind, SpecialPathKind};
use delve_core::settings::{
    AccessPointTemplate, CatalogEntry, KeyRoomSettings, RoomList, RoomTemplate, SpecialRoomSettings,
};
use delve_core::{generate_level, DirectionSet, GridCoord, LevelLayout, LevelSettings, SettingsError, TileKind};
use delve_save::{export_layout, ExportFormat, SaveError};

/// Errors surfaced to the command line
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Floor {floor} is outside the grid, which has {floors} floors")]
    InvalidFloor { floor: i32, floors: i32 },
}

/// One generation run
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub settings: Option<PathBuf>,
    pub seed: Option<u64>,
    pub grid: Option<GridCoord>,
    /// Only render this floor
    pub floor: Option<i32>,
    pub output: Option<PathBuf>,
    pub compact: bool,
}

/// Parse a grid size written as `X,Y,Z`
pub fn parse_grid(value: &str) -> Result<GridCoord, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z, got '{}'", value));
    };
    let axis = |s: &str| {
        s.parse::<i32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("'{}' is not a positive integer", s))
    };
    Ok(GridCoord::new(axis(x)?, axis(y)?, axis(z)?))
}

fn room(name: &str, footprint: Vec<GridCoord>, access_points: Vec<AccessPointTemplate>) -> RoomTemplate {
    RoomTemplate {
        name: name.to_string(),
        footprint,
        access_points,
        ..Default::default()
    }
}

/// Settings used when no settings file is given
pub fn demo_settings(grid_size: GridCoord) -> LevelSettings {
    let horizontal = DirectionSet::NORTH | DirectionSet::EAST | DirectionSet::SOUTH | DirectionSet::WEST;
    let hall = room(
        "hall",
        vec![GridCoord::ZERO, GridCoord::new(1, 0, 0)],
        vec![
            AccessPointTemplate::new(GridCoord::ZERO, DirectionSet::SOUTH | DirectionSet::EAST),
            AccessPointTemplate::new(GridCoord::new(1, 0, 0), DirectionSet::NORTH | DirectionSet::WEST),
        ],
    );
    let chamber = room(
        "chamber",
        vec![
            GridCoord::ZERO,
            GridCoord::new(1, 0, 0),
            GridCoord::new(0, 1, 0),
            GridCoord::new(1, 1, 0),
        ],
        vec![
            AccessPointTemplate::new(GridCoord::ZERO, DirectionSet::SOUTH | DirectionSet::WEST),
            AccessPointTemplate::new(GridCoord::new(1, 1, 0), DirectionSet::NORTH | DirectionSet::EAST),
        ],
    );

    let mut settings = LevelSettings {
        grid_size,
        basic_rooms: vec![
            RoomList {
                weight: 3.0,
                rooms: vec![RoomTemplate::single("cell", horizontal), hall],
            },
            RoomList {
                weight: 1.0,
                rooms: vec![chamber],
            },
        ],
        basic_rooms_min: 4,
        basic_rooms_max: 8,
        ..Default::default()
    };
    settings.key_rooms.insert(
        "entrance".to_string(),
        KeyRoomSettings {
            quantity: 1,
            rooms: vec![RoomTemplate::single("entrance", horizontal)],
        },
    );
    settings.special_rooms.insert(
        "vault".to_string(),
        SpecialRoomSettings {
            chance: 0.5,
            rooms: vec![RoomTemplate::single("vault", DirectionSet::SOUTH)],
        },
    );

    for kind in CorridorKind::iter() {
        let name = format!("corridor_{}", kind).to_lowercase();
        settings.corridor_catalog.insert(kind, vec![CatalogEntry::new(name)]);
    }
    for kind in [
        SpecialPathKind::Stairs1x2x2,
        SpecialPathKind::Stairs1x1x2,
        SpecialPathKind::ElevatorS2,
        SpecialPathKind::ElevatorS3,
    ] {
        settings.allow_structure(kind);
    }
    settings.structure_catalog.insert(
        SpecialPathKind::Stairs1x2x2,
        vec![CatalogEntry::new("stairs_long")
            .with_access_point(GridCoord::ZERO, DirectionSet::SOUTH)
            .with_access_point(GridCoord::new(1, 0, 1), DirectionSet::NORTH)],
    );
    settings.structure_catalog.insert(
        SpecialPathKind::Stairs1x1x2,
        vec![CatalogEntry::new("stairs_steep")
            .with_access_point(GridCoord::ZERO, DirectionSet::SOUTH)
            .with_access_point(GridCoord::new(0, 0, 1), DirectionSet::NORTH)],
    );
    for (part, name) in [
        (SpecialPathKind::ElevatorBottom, "elevator_bottom"),
        (SpecialPathKind::ElevatorMiddle, "elevator_middle"),
        (SpecialPathKind::ElevatorTop, "elevator_top"),
    ] {
        settings.structure_catalog.insert(
            part,
            vec![CatalogEntry::new(name).with_access_point(GridCoord::ZERO, horizontal)],
        );
    }
    settings
}

/// ASCII map of one floor, north at the top and east to the right
pub fn render_floor(layout: &LevelLayout, z: i32) -> String {
    let size = layout.grid_size();
    let mut out = String::new();
    for x in (0..size.x).rev() {
        let row: String = (0..size.y)
            .map(|y| match layout.kind_at(&GridCoord::new(x, y, z)) {
                TileKind::Empty => '.',
                kind => kind.symbol(),
            })
            .collect();
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Symbol legend for every tile kind
pub fn legend() -> String {
    TileKind::iter()
        .filter(|kind| *kind != TileKind::Empty)
        .map(|kind| format!("{} {}", kind.symbol(), kind))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn summary(layout: &LevelLayout) -> String {
    let structures = layout
        .tiles()
        .values()
        .filter(|tile| tile.kind == TileKind::CorridorSpecial)
        .count();
    format!(
        "seed {}  grid {}  rooms {}  corridor tiles {}  structures {}  connections {}",
        layout.seed(),
        layout.grid_size(),
        layout.rooms(),
        layout.corridors(),
        structures,
        layout.connections().len()
    )
}

/// Run one generation and return the text to print
pub fn run(options: &Options) -> Result<String, CliError> {
    let mut settings = match &options.settings {
        Some(path) => delve_save::load_settings(path)?,
        None => demo_settings(options.grid.unwrap_or(GridCoord::new(16, 16, 2))),
    };
    if let Some(grid) = options.grid {
        settings.grid_size = grid;
    }
    if options.seed.is_some() {
        settings.seed = options.seed;
    }
    settings.validate()?;

    let floors = settings.grid_size.z;
    if let Some(floor) = options.floor
        && !(0..floors).contains(&floor)
    {
        return Err(CliError::InvalidFloor { floor, floors });
    }

    let layout = generate_level(&settings);
    let mut out = String::new();
    let shown: Vec<i32> = match options.floor {
        Some(floor) => vec![floor],
        None => (0..floors).collect(),
    };
    for z in shown {
        // Writing to a String cannot fail
        let _ = writeln!(out, "Floor {}", z);
        out.push_str(&render_floor(&layout, z));
        out.push('\n');
    }
    out.push_str(&legend());
    out.push('\n');
    out.push_str(&summary(&layout));
    out.push('\n');

    if let Some(path) = &options.output {
        let format = if options.compact {
            ExportFormat::Compact
        } else {
            ExportFormat::for_path(path)
        };
        export_layout(&layout, path, format)?;
        info!("Layout written to {}", path.display());
    }
    Ok(out)
}
