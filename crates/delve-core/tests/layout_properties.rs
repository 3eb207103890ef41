use std::collections::{BTreeSet, VecDeque};

use delve_core::geometry::predicates::in_circle;
use delve_core::geometry::triangulate;
use delve_core::graph::{complete_graph, minimum_spanning_tree, DisjointSet};
use delve_core::layout::{Direction, DirectionSet, GridCoord, Rotation, Tile, TileKind};
use delve_core::router::{find_path, PathRequest, PathStep};
use delve_core::settings::{AccessPointTemplate, RoomList, RoomTemplate};
use delve_core::{generate_level, LevelLayout, LevelRng, LevelSettings};
use proptest::prelude::*;

fn chebyshev(a: &GridCoord, b: &GridCoord) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs()).max((a.z - b.z).abs())
}

fn two_cell_room() -> RoomTemplate {
    RoomTemplate {
        name: "hall".to_string(),
        footprint: vec![GridCoord::ZERO, GridCoord::new(1, 0, 0)],
        access_points: vec![AccessPointTemplate::new(
            GridCoord::ZERO,
            DirectionSet::SOUTH | DirectionSet::EAST | DirectionSet::WEST,
        )],
        ..Default::default()
    }
}

fn level_settings(seed: u64, floors: i32, buffer: u32) -> LevelSettings {
    LevelSettings {
        seed: Some(seed),
        grid_size: GridCoord::new(12, 12, floors),
        room_buffer: buffer,
        basic_rooms: vec![
            RoomList {
                weight: 2.0,
                rooms: vec![RoomTemplate::single("cell", DirectionSet::all())],
            },
            RoomList {
                weight: 1.0,
                rooms: vec![two_cell_room()],
            },
        ],
        basic_rooms_min: 3,
        basic_rooms_max: 8,
        ..Default::default()
    }
}

/// Cells reachable from `start` over horizontal steps that avoid rooms
fn reachable(layout: &LevelLayout, start: GridCoord) -> BTreeSet<GridCoord> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for direction in Direction::CARDINAL {
            let next = cell + direction.offset();
            if layout.contains_coord(&next) && !layout.kind_at(&next).is_room() && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rotating_four_quarter_turns_is_identity(index in 0usize..6, turns in 0i32..4) {
        let direction = Direction::ALL[index];
        let rotation = Rotation::from_quarter_turns(turns);
        let mut turned = direction;
        for _ in 0..4 {
            turned = turned.rotated(rotation);
        }
        prop_assert_eq!(turned, direction);
        prop_assert_eq!(direction.rotated(rotation).rotated(rotation.inverse()), direction);
    }

    #[test]
    fn triangulation_has_empty_circumcircles(
        raw in prop::collection::btree_set((0i32..20, 0i32..20), 3..14)
    ) {
        let points: Vec<GridCoord> = raw.iter().map(|&(x, y)| GridCoord::new(x, y, 0)).collect();
        let tri = triangulate(GridCoord::new(20, 20, 1), &points, true);
        for triangle in &tri.triangles {
            let [a, b, c] = triangle.map(|i| tri.vertices[i]);
            for (i, p) in tri.vertices.iter().enumerate() {
                if triangle.contains(&i) {
                    continue;
                }
                prop_assert!(in_circle(a, b, c, *p) <= 1e-9, "point {} inside {:?}", i, triangle);
            }
        }
    }

    #[test]
    fn spanning_tree_is_acyclic_and_complete(
        raw in prop::collection::btree_set((0i32..10, 0i32..10, 0i32..3), 2..12)
    ) {
        let points: Vec<GridCoord> = raw.iter().map(|&(x, y, z)| GridCoord::new(x, y, z)).collect();
        let spanning = minimum_spanning_tree(&points, &complete_graph(&points));
        prop_assert_eq!(spanning.tree.len(), points.len() - 1);

        let index = |p: &GridCoord| points.iter().position(|q| q == p).unwrap_or(usize::MAX);
        let mut sets = DisjointSet::new(points.len());
        for edge in &spanning.tree {
            prop_assert!(sets.union(index(&edge.a), index(&edge.b)), "cycle through {}", edge);
        }
        let total = spanning.tree.len() + spanning.discarded.len();
        prop_assert_eq!(total, points.len() * (points.len() - 1) / 2);
    }

    #[test]
    fn placed_rooms_never_overlap_or_crowd(seed in any::<u64>(), floors in 1i32..3, buffer in 0u32..3) {
        let layout = generate_level(&level_settings(seed, floors, buffer));
        let mut owners: Vec<(GridCoord, Vec<GridCoord>)> = Vec::new();
        for anchor in layout.room_anchors() {
            let tile = layout.tile(&anchor).unwrap();
            let cells = tile.cells(anchor);
            for cell in &cells {
                prop_assert!(layout.contains_coord(cell));
                let occupant = layout.tile(cell).unwrap();
                prop_assert!(*cell == anchor || occupant.parent == Some(anchor));
            }
            owners.push((anchor, cells));
        }
        for (i, (a, cells_a)) in owners.iter().enumerate() {
            for (b, cells_b) in &owners[i + 1..] {
                for p in cells_a {
                    for q in cells_b {
                        prop_assert!(
                            chebyshev(p, q) > buffer as i32,
                            "rooms {} and {} within buffer {}", a, b, buffer
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_gives_same_layout(seed in any::<u64>()) {
        let settings = level_settings(seed, 2, 1);
        let first = generate_level(&settings);
        let second = generate_level(&settings);
        prop_assert_eq!(first.tiles(), second.tiles());
        prop_assert_eq!(first.path_tiles(), second.path_tiles());
        prop_assert_eq!(first.connections(), second.connections());
    }

    #[test]
    fn found_paths_walk_from_start_to_goal(
        walls in prop::collection::btree_set((0i32..8, 0i32..8), 0..24)
    ) {
        let start = GridCoord::new(0, 0, 0);
        let goal = GridCoord::new(7, 7, 0);
        let mut layout = LevelLayout::new(GridCoord::new(8, 8, 1), LevelRng::new(3));
        for &(x, y) in &walls {
            let cell = GridCoord::new(x, y, 0);
            if cell != start && cell != goal {
                layout.insert_tile(cell, Tile::new(TileKind::Key, Rotation::R0, "wall"));
            }
        }
        let settings = LevelSettings::default();
        let path = find_path(&PathRequest { start, goal }, &settings, &layout, &[start, goal]);

        prop_assert_eq!(path.is_some(), reachable(&layout, start).contains(&goal));
        if let Some(path) = path {
            prop_assert!(path.steps.iter().all(|step| matches!(step, PathStep::Corridor(_))));
            let cells = path.cells();
            prop_assert_eq!(cells.first(), Some(&start));
            prop_assert_eq!(cells.last(), Some(&goal));
            let distinct: BTreeSet<&GridCoord> = cells.iter().collect();
            prop_assert_eq!(distinct.len(), cells.len());
            for pair in cells.windows(2) {
                prop_assert!(Direction::from_offset(pair[1] - pair[0]).is_some_and(Direction::is_horizontal));
                prop_assert!(!layout.kind_at(&pair[1]).is_room());
            }
        }
    }
}
