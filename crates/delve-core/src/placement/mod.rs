//! Room placement
//!
//! Key rooms first, then special rooms, then basic rooms. Each room is drawn
//! by weight, given a rotation and an anchor, and kept only if its footprint
//! fits the grid, overlaps nothing and keeps its buffer clear of other rooms.

use log::{info, warn};

use crate::layout::{GridCoord, LevelLayout, Rotation, Tile, TileKind};
use crate::rng::LevelRng;
use crate::settings::{LevelSettings, RoomTemplate};

/// Share of the grid volume allowed as failed attempts per room
const ATTEMPT_BUDGET_RATIO: f64 = 0.25;

/// Pick an item with probability proportional to its weight
///
/// Items with a weight of zero or less are never picked. Returns `None` when
/// no item has a positive weight.
pub fn select_weighted<'a, T>(
    items: &'a [T],
    weight: impl Fn(&T) -> f64,
    rng: &mut LevelRng,
) -> Option<&'a T> {
    let total: f64 = items.iter().map(&weight).filter(|w| *w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.float_in(total);
    let mut cumulative = 0.0;
    let mut last = None;
    for item in items {
        let w = weight(item);
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last = Some(item);
        if roll < cumulative {
            return Some(item);
        }
    }
    // Rounding can leave the roll just above the final sum
    last
}

/// A uniformly chosen cell without a tile, anywhere in the grid
pub fn random_empty_coordinate(layout: &mut LevelLayout) -> Option<GridCoord> {
    let empty: Vec<GridCoord> = layout
        .grid_size()
        .cells()
        .filter(|c| !layout.is_occupied(c))
        .collect();
    layout.rng().choose(&empty).copied()
}

/// Whether no other room lies within `radius` cells of `cells`
///
/// The neighbourhood is the full Chebyshev ball around each cell, vertical
/// neighbours included.
pub fn room_buffer_is_clear(layout: &LevelLayout, cells: &[GridCoord], radius: u32) -> bool {
    if radius == 0 {
        return true;
    }
    let r = radius as i32;
    for cell in cells {
        for dx in -r..=r {
            for dy in -r..=r {
                for dz in -r..=r {
                    let neighbour = *cell + GridCoord::new(dx, dy, dz);
                    if cells.contains(&neighbour) {
                        continue;
                    }
                    if layout.kind_at(&neighbour).is_room() {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Whether `room` can be anchored at `anchor` with `rotation`
pub fn room_placement_is_valid(
    layout: &LevelLayout,
    room: &RoomTemplate,
    anchor: GridCoord,
    rotation: Rotation,
    room_buffer: u32,
) -> bool {
    if room.access_points.is_empty() || room.footprint.is_empty() {
        return false;
    }
    let cells: Vec<GridCoord> = room
        .footprint
        .iter()
        .map(|offset| anchor + offset.rotated(rotation))
        .collect();
    cells
        .iter()
        .all(|c| layout.contains_coord(c) && !layout.is_occupied(c))
        && room_buffer_is_clear(layout, &cells, room_buffer)
}

/// Insert the anchor tile and one section tile per extra footprint cell
fn insert_room(layout: &mut LevelLayout, room: &RoomTemplate, anchor: GridCoord, rotation: Rotation, kind: TileKind) {
    let access_points = room
        .access_points
        .iter()
        .map(|ap| ap.to_access_point())
        .collect();
    let tile = Tile::new(kind, rotation, room.name.clone())
        .with_footprint(room.footprint.clone())
        .with_access_points(access_points);
    layout.insert_tile(anchor, tile);
    for offset in room.footprint.iter().filter(|o| **o != GridCoord::ZERO) {
        layout.insert_tile(
            anchor + offset.rotated(rotation),
            Tile::section(TileKind::RoomSection, rotation, anchor),
        );
    }
}

/// Place one room drawn from `rooms` as a tile of `kind`
///
/// Gives up after `round(volume * 0.25)` failed attempts. Returns whether a
/// room was placed.
pub fn place_room(settings: &LevelSettings, layout: &mut LevelLayout, rooms: &[RoomTemplate], kind: TileKind) -> bool {
    let budget = (layout.grid_size().volume() as f64 * ATTEMPT_BUDGET_RATIO).round() as i64;
    let mut failures: i64 = 0;
    loop {
        let Some(room) = select_weighted(rooms, |r| r.selection_chance, layout.rng()) else {
            warn!("No {} room can be selected, list is empty or unweighted", kind);
            return false;
        };
        let rotation = match room.fixed_rotation {
            Some(rotation) => rotation,
            None => layout.rng().rotation(),
        };
        let anchor = match room.fixed_coordinate {
            Some(coord) if !layout.is_occupied(&coord) => Some(coord),
            _ => random_empty_coordinate(layout),
        };
        if let Some(anchor) = anchor
            && room_placement_is_valid(layout, room, anchor, rotation, settings.room_buffer)
        {
            insert_room(layout, room, anchor, rotation, kind);
            return true;
        }
        failures += 1;
        if failures > budget {
            warn!(
                "Could not place {} room '{}' after {} attempts",
                kind, room.name, failures
            );
            return false;
        }
    }
}

/// Place every key room entry, ordered by name
pub fn generate_key_rooms(settings: &LevelSettings, layout: &mut LevelLayout) -> usize {
    let mut total = 0;
    for (name, key) in &settings.key_rooms {
        let quantity = i64::from(key.quantity).clamp(0, layout.free_volume());
        let mut placed = 0;
        for _ in 0..quantity {
            if place_room(settings, layout, &key.rooms, TileKind::Key) {
                placed += 1;
            }
        }
        info!("Key rooms '{}': {} of {} requested", name, placed, key.quantity);
        total += placed;
    }
    total
}

/// Roll for each special room entry, ordered by name
pub fn generate_special_rooms(settings: &LevelSettings, layout: &mut LevelLayout) -> usize {
    let mut placed = 0;
    for (name, special) in &settings.special_rooms {
        if layout.free_volume() <= 0 {
            break;
        }
        if layout.rng().chance(special.chance)
            && place_room(settings, layout, &special.rooms, TileKind::Special)
        {
            info!("Special room '{}' placed", name);
            placed += 1;
        }
    }
    placed
}

/// Place a random number of basic rooms between the configured bounds
pub fn generate_basic_rooms(settings: &LevelSettings, layout: &mut LevelLayout) -> usize {
    let free = layout.free_volume();
    let min = i64::from(settings.basic_rooms_min).clamp(0, free);
    let max = i64::from(settings.basic_rooms_max).clamp(0, free);
    let quantity = layout.rng().range_inclusive(min, max);
    let mut placed = 0;
    for _ in 0..quantity {
        let Some(list) = select_weighted(&settings.basic_rooms, |l| l.weight, layout.rng()) else {
            warn!("No basic room list can be selected");
            break;
        };
        if place_room(settings, layout, &list.rooms, TileKind::Basic) {
            placed += 1;
        }
    }
    info!("Basic rooms: {} placed of {} drawn", placed, quantity);
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DirectionSet;
    use crate::settings::RoomList;

    fn layout(x: i32, y: i32, z: i32) -> LevelLayout {
        LevelLayout::new(GridCoord::new(x, y, z), LevelRng::new(11))
    }

    fn open_room(name: &str) -> RoomTemplate {
        RoomTemplate::single(name, DirectionSet::all())
    }

    #[test]
    fn test_select_weighted_skips_non_positive() {
        let mut rng = LevelRng::new(2);
        let items = [("a", 0.0), ("b", 2.0), ("c", -1.0)];
        for _ in 0..100 {
            assert_eq!(select_weighted(&items, |i| i.1, &mut rng).unwrap().0, "b");
        }
        let none = [("a", 0.0)];
        assert!(select_weighted(&none, |i| i.1, &mut rng).is_none());
        let empty: [(&str, f64); 0] = [];
        assert!(select_weighted(&empty, |i| i.1, &mut rng).is_none());
    }

    #[test]
    fn test_select_weighted_distribution() {
        let mut rng = LevelRng::new(8);
        let items = [1.0, 3.0];
        let heavy = (0..4000)
            .filter(|_| *select_weighted(&items, |w| *w, &mut rng).unwrap() == 3.0)
            .count();
        assert!((2700..3300).contains(&heavy), "{}", heavy);
    }

    #[test]
    fn test_random_empty_covers_whole_grid() {
        let mut level = layout(2, 1, 1);
        level.insert_tile(GridCoord::new(0, 0, 0), Tile::new(TileKind::Basic, Rotation::R0, "a"));
        for _ in 0..20 {
            assert_eq!(random_empty_coordinate(&mut level), Some(GridCoord::new(1, 0, 0)));
        }
        level.insert_tile(GridCoord::new(1, 0, 0), Tile::new(TileKind::Basic, Rotation::R0, "b"));
        assert_eq!(random_empty_coordinate(&mut level), None);
    }

    #[test]
    fn test_buffer_blocks_neighbouring_rooms() {
        let mut level = layout(5, 5, 1);
        level.insert_tile(GridCoord::new(2, 2, 0), Tile::new(TileKind::Basic, Rotation::R0, "a"));
        assert!(!room_buffer_is_clear(&level, &[GridCoord::new(3, 3, 0)], 1));
        assert!(room_buffer_is_clear(&level, &[GridCoord::new(4, 4, 0)], 1));
        assert!(!room_buffer_is_clear(&level, &[GridCoord::new(4, 4, 0)], 2));
        assert!(room_buffer_is_clear(&level, &[GridCoord::new(3, 3, 0)], 0));
    }

    #[test]
    fn test_placement_rotated_footprint_bounds() {
        let level = layout(3, 3, 1);
        let mut room = open_room("long");
        room.footprint = vec![GridCoord::ZERO, GridCoord::new(1, 0, 0)];
        // North-facing footprint from (2, 0) leaves the grid, rotated east it fits
        assert!(!room_placement_is_valid(&level, &room, GridCoord::new(2, 0, 0), Rotation::R0, 0));
        assert!(room_placement_is_valid(&level, &room, GridCoord::new(2, 0, 0), Rotation::R90, 0));
        // West-facing runs to y = -1
        assert!(!room_placement_is_valid(&level, &room, GridCoord::new(2, 0, 0), Rotation::R270, 0));
    }

    #[test]
    fn test_room_without_access_points_rejected() {
        let level = layout(3, 3, 1);
        let room = RoomTemplate {
            name: "sealed".into(),
            ..Default::default()
        };
        assert!(!room_placement_is_valid(&level, &room, GridCoord::ZERO, Rotation::R0, 0));
    }

    #[test]
    fn test_place_room_inserts_sections() {
        let settings = LevelSettings::default();
        let mut level = layout(4, 4, 1);
        let mut room = open_room("hall");
        room.footprint = vec![GridCoord::ZERO, GridCoord::new(1, 0, 0)];
        room.fixed_rotation = Some(Rotation::R0);
        room.fixed_coordinate = Some(GridCoord::new(1, 1, 0));
        assert!(place_room(&settings, &mut level, &[room], TileKind::Key));
        assert_eq!(level.kind_at(&GridCoord::new(1, 1, 0)), TileKind::Key);
        let section = level.tile(&GridCoord::new(2, 1, 0)).unwrap();
        assert_eq!(section.kind, TileKind::RoomSection);
        assert_eq!(section.parent, Some(GridCoord::new(1, 1, 0)));
    }

    #[test]
    fn test_place_room_gives_up_when_full() {
        let settings = LevelSettings::default();
        let mut level = layout(1, 1, 1);
        assert!(place_room(&settings, &mut level, &[open_room("a")], TileKind::Basic));
        assert!(!place_room(&settings, &mut level, &[open_room("b")], TileKind::Basic));
        assert_eq!(level.rooms(), 1);
    }

    #[test]
    fn test_basic_rooms_respect_buffer() {
        let settings = LevelSettings {
            grid_size: GridCoord::new(8, 8, 1),
            basic_rooms: vec![RoomList {
                weight: 1.0,
                rooms: vec![open_room("cell")],
            }],
            basic_rooms_min: 6,
            basic_rooms_max: 6,
            ..Default::default()
        };
        let mut level = layout(8, 8, 1);
        let placed = generate_basic_rooms(&settings, &mut level);
        assert!(placed >= 1);
        let anchors = level.room_anchors();
        for (i, a) in anchors.iter().enumerate() {
            for b in &anchors[i + 1..] {
                let chebyshev = (a.x - b.x).abs().max((a.y - b.y).abs());
                assert!(chebyshev > 1, "{} and {} too close", a, b);
            }
        }
    }

    #[test]
    fn test_key_rooms_quantity() {
        let mut settings = LevelSettings {
            grid_size: GridCoord::new(9, 9, 1),
            room_buffer: 0,
            ..Default::default()
        };
        settings.key_rooms.insert(
            "vault".into(),
            crate::settings::KeyRoomSettings {
                quantity: 3,
                rooms: vec![open_room("vault")],
            },
        );
        let mut level = layout(9, 9, 1);
        assert_eq!(generate_key_rooms(&settings, &mut level), 3);
        assert!(level.tiles().values().all(|t| t.kind == TileKind::Key));
    }
}
