//! Turning routed paths into path tiles, and path tiles into level tiles

use log::{debug, warn};

use super::chain::PathStep;
use super::plan::PathPlan;
use super::search::RoutedPath;
use crate::layout::{
    AccessPoint, CorridorKind, Direction, DirectionSet, GridCoord, LevelLayout, PathTile, SpecialPathKind,
    StructurePlacement, Tile, TileKind,
};
use crate::placement::select_weighted;
use crate::rng::LevelRng;
use crate::settings::{CatalogEntry, LevelSettings};

/// A cell the next path cell connects back to
#[derive(Debug, Clone, Copy)]
struct Joint {
    coord: GridCoord,
    kind: TileKind,
    /// Whether the cell carries path data that should learn the connection
    on_path: bool,
}

/// Connect `cell` back to `previous`, both ways where both are path cells
fn link(layout: &mut LevelLayout, previous: Joint, cell: GridCoord, cell_kind: TileKind) {
    let Some(direction) = Direction::from_offset(previous.coord - cell) else {
        debug!("Path cells {} and {} are not adjacent", previous.coord, cell);
        return;
    };
    if let Some(path_tile) = layout.path_tile_mut(&cell) {
        path_tile.adjacency.entry(direction).or_insert(previous.kind);
    }
    if previous.on_path
        && let Some(path_tile) = layout.path_tile_mut(&previous.coord)
    {
        path_tile.adjacency.entry(direction.opposite()).or_insert(cell_kind);
    }
}

fn structure_cell_kind(placement: &StructurePlacement, cell: GridCoord) -> TileKind {
    if cell == placement.origin {
        TileKind::CorridorSpecial
    } else {
        TileKind::CorridorSection
    }
}

/// Record a routed path as path tiles
///
/// Corridor cells join their neighbours along the path; the first cell also
/// joins the origin access point and the last the destination access point.
/// Structures are joined at their entry and departure cells. Cells shared
/// with earlier paths keep their data and gain the new connections.
pub fn commit_path(layout: &mut LevelLayout, plan: &PathPlan, path: &RoutedPath) {
    let mut previous = Joint {
        coord: plan.origin.location,
        kind: plan.origin.room,
        on_path: false,
    };
    for step in &path.steps {
        match step {
            PathStep::Corridor(coord) => {
                let kind = layout.path_tile_entry(*coord, TileKind::Corridor).kind;
                link(layout, previous, *coord, kind);
                previous = Joint {
                    coord: *coord,
                    kind,
                    on_path: true,
                };
            }
            PathStep::Structure(placement) => {
                for cell in &placement.cells {
                    if layout.path_tile(cell).is_none() {
                        let kind = structure_cell_kind(placement, *cell);
                        layout.insert_path_tile(*cell, PathTile::structure_cell(kind, placement.clone()));
                    }
                }
                let (Some(entry), Some(departure)) = (step.entry(), step.departure()) else {
                    continue;
                };
                link(layout, previous, entry, structure_cell_kind(placement, entry));
                previous = Joint {
                    coord: departure,
                    kind: structure_cell_kind(placement, departure),
                    on_path: true,
                };
            }
        }
    }

    let destination = plan.destination.location;
    if let Some(direction) = Direction::from_offset(destination - previous.coord)
        && let Some(path_tile) = layout.path_tile_mut(&previous.coord)
    {
        path_tile.adjacency.entry(direction).or_insert(plan.destination.room);
    }
}

fn pick_content<'a>(entries: Option<&'a Vec<CatalogEntry>>, rng: &mut LevelRng) -> Option<&'a CatalogEntry> {
    select_weighted(entries?, |entry| entry.selection_chance, rng)
}

/// Corridor tile for a plain path cell
///
/// Kind and rotation follow the horizontal connection pattern. The tile's
/// single access point lists every connection in the tile frame.
pub fn corridor_tile(path_tile: &PathTile, settings: &LevelSettings, rng: &mut LevelRng) -> Tile {
    let connections = path_tile.connections();
    let (kind, rotation) = CorridorKind::from_connections(connections.horizontal());
    let content = pick_content(settings.corridor_catalog.get(&kind), rng)
        .map(|entry| entry.name.clone())
        .unwrap_or_default();

    let local = connections.rotated(rotation.inverse());
    let mut access_point = AccessPoint::new(GridCoord::ZERO, local);
    access_point.in_use = local;
    Tile {
        corridor: Some(kind),
        ..Tile::new(TileKind::Corridor, rotation, content).with_access_points(vec![access_point])
    }
}

/// Connections of a path cell in a tile frame
fn local_connections(layout: &LevelLayout, cell: &GridCoord, placement: &StructurePlacement) -> DirectionSet {
    layout
        .path_tile(cell)
        .map(|path_tile| path_tile.connections().rotated(placement.rotation.inverse()))
        .unwrap_or_default()
}

/// Catalog access points with their used exits filled in
fn catalog_access_points(
    layout: &LevelLayout,
    entry: &CatalogEntry,
    anchor: GridCoord,
    placement: &StructurePlacement,
) -> Vec<AccessPoint> {
    entry
        .access_points
        .iter()
        .map(|template| {
            let mut access_point = template.to_access_point();
            let cell = anchor + access_point.offset.rotated(placement.rotation);
            access_point.in_use = local_connections(layout, &cell, placement) & access_point.directions;
            access_point
        })
        .collect()
}

/// Insert the tiles of the structure whose origin is `origin`
///
/// The origin gets a corridor-special tile carrying the catalog content and
/// access points; every other cell gets a section tile. Elevator shafts take
/// their content from the bottom, middle and top catalogs. Returns the number
/// of tiles inserted.
pub fn structure_tiles(origin: GridCoord, path_tile: &PathTile, settings: &LevelSettings, layout: &mut LevelLayout) -> usize {
    let Some(placement) = path_tile.structure.clone() else {
        return 0;
    };
    let inverse = placement.rotation.inverse();
    let mut footprint = vec![GridCoord::ZERO];
    footprint.extend(
        placement
            .cells
            .iter()
            .map(|cell| (*cell - origin).rotated(inverse))
            .filter(|offset| *offset != GridCoord::ZERO),
    );

    let shaft = placement.kind.is_elevator_shaft();
    let catalog_kind = if shaft {
        SpecialPathKind::ElevatorBottom
    } else {
        placement.kind
    };
    let entry = pick_content(settings.structure_catalog.get(&catalog_kind), layout.rng()).cloned();
    let access_points = match &entry {
        Some(entry) => catalog_access_points(layout, entry, origin, &placement),
        None => {
            warn!("No catalog content for {} at {}", catalog_kind, origin);
            footprint
                .iter()
                .filter_map(|offset| {
                    let cell = origin + offset.rotated(placement.rotation);
                    let connections = local_connections(layout, &cell, &placement);
                    (!connections.is_empty()).then(|| AccessPoint {
                        offset: *offset,
                        directions: connections,
                        in_use: connections,
                    })
                })
                .collect()
        }
    };

    let content = entry.map(|entry| entry.name).unwrap_or_default();
    let tile = Tile {
        structure: Some(placement.kind),
        ..Tile::new(TileKind::CorridorSpecial, placement.rotation, content)
            .with_footprint(footprint.clone())
            .with_access_points(access_points.clone())
    };
    let mut inserted = usize::from(layout.insert_tile(origin, tile));

    let top = footprint.iter().max_by_key(|offset| offset.z).copied();
    for offset in footprint.iter().skip(1) {
        let cell = origin + offset.rotated(placement.rotation);
        let mut section_access_points: Vec<AccessPoint> = access_points
            .iter()
            .filter(|access_point| access_point.offset == *offset)
            .map(|access_point| AccessPoint {
                offset: GridCoord::ZERO,
                ..access_point.clone()
            })
            .collect();

        let (part, content) = if shaft {
            let part = if Some(*offset) == top {
                SpecialPathKind::ElevatorTop
            } else {
                SpecialPathKind::ElevatorMiddle
            };
            let entry = pick_content(settings.structure_catalog.get(&part), layout.rng()).cloned();
            if part == SpecialPathKind::ElevatorTop
                && let Some(entry) = &entry
            {
                section_access_points.extend(
                    catalog_access_points(layout, entry, cell, &placement)
                        .into_iter()
                        .filter(|access_point| access_point.offset == GridCoord::ZERO),
                );
            }
            (part, entry.map(|entry| entry.name).unwrap_or_default())
        } else {
            (placement.kind, String::new())
        };

        let section = Tile {
            content,
            structure: Some(part),
            access_points: section_access_points,
            ..Tile::section(TileKind::CorridorSection, placement.rotation, origin)
        };
        inserted += usize::from(layout.insert_tile(cell, section));
    }
    inserted
}

/// Convert every path tile into level tiles
///
/// Returns the number of tiles inserted.
pub fn finalize_tiles(settings: &LevelSettings, layout: &mut LevelLayout) -> usize {
    let path_tiles: Vec<(GridCoord, PathTile)> = layout
        .path_tiles()
        .iter()
        .map(|(coord, path_tile)| (*coord, path_tile.clone()))
        .collect();

    let mut inserted = 0;
    for (coord, path_tile) in &path_tiles {
        match path_tile.kind {
            TileKind::Corridor => {
                let tile = corridor_tile(path_tile, settings, layout.rng());
                inserted += usize::from(layout.insert_tile(*coord, tile));
            }
            TileKind::CorridorSpecial => {
                inserted += structure_tiles(*coord, path_tile, settings, layout);
            }
            _ => {}
        }
    }
    inserted
}
