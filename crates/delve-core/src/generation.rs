//! Level generation pipeline
//!
//! Key rooms, special rooms, basic rooms, then corridors. Each phase can be
//! switched off in the settings. Generation never fails outright; anything
//! that cannot be placed or connected is logged and left out.

use log::{debug, info, warn};

use crate::graph::{add_random_edges, connection_candidates, minimum_spanning_tree};
use crate::layout::LevelLayout;
use crate::placement::{generate_basic_rooms, generate_key_rooms, generate_special_rooms};
use crate::rng::LevelRng;
use crate::router::{finalize_tiles, route_connections, RouteReport};
use crate::settings::LevelSettings;

/// Generate a complete level
pub fn generate_level(settings: &LevelSettings) -> LevelLayout {
    let rng = match settings.seed {
        Some(seed) => LevelRng::new(seed),
        None => LevelRng::from_entropy(),
    };
    info!("Generating level with seed {}", rng.seed());
    let mut layout = LevelLayout::new(settings.grid_size, rng);

    if !settings.grid_size.is_positive() {
        warn!("Grid size {} has no cells, nothing to generate", settings.grid_size);
        return layout;
    }

    if settings.generate_key_rooms {
        generate_key_rooms(settings, &mut layout);
    }
    if settings.generate_special_rooms {
        let placed = generate_special_rooms(settings, &mut layout);
        info!("Special rooms: {} placed", placed);
    }
    if settings.generate_basic_rooms {
        generate_basic_rooms(settings, &mut layout);
    }
    generate_corridors(settings, &mut layout);

    info!(
        "Level complete: {} rooms, {} corridor tiles",
        layout.rooms(),
        layout.corridors()
    );
    layout
}

/// Choose connections between the placed rooms and route them
///
/// The chosen connections are stored on the layout even when corridor
/// routing is switched off.
pub fn generate_corridors(settings: &LevelSettings, layout: &mut LevelLayout) -> RouteReport {
    let anchors = layout.room_anchors();
    let candidates = connection_candidates(layout.grid_size(), &anchors);
    let spanning = minimum_spanning_tree(&anchors, &candidates);
    let mut connections = spanning.tree;
    let extra = add_random_edges(
        &mut connections,
        &spanning.discarded,
        layout.rng(),
        settings.extra_corridor_chance,
    );
    info!(
        "Connections: {} from {} candidates, {} extra",
        connections.len(),
        candidates.len(),
        extra
    );
    if settings.log_connections {
        for edge in &connections {
            debug!("Connection {}", edge);
        }
    }
    layout.set_connections(connections.clone());

    if !settings.generate_corridors {
        return RouteReport::default();
    }
    let report = route_connections(settings, layout, &connections);
    let tiles = finalize_tiles(settings, layout);
    debug!("Inserted {} corridor tiles", tiles);
    report
}
