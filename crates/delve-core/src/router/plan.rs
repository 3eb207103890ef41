//! Access point planning and retries for one room connection

use log::{debug, warn};

use super::finalize::commit_path;
use super::search::{find_path, PathRequest, RoutedPath};
use crate::graph::Edge;
use crate::layout::{Direction, GridCoord, LevelLayout, TileKind};
use crate::settings::LevelSettings;

/// One end of a planned corridor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessChoice {
    /// Anchor of the room
    pub anchor: GridCoord,
    pub room: TileKind,
    /// Access point offset, room frame
    pub offset: GridCoord,
    /// Exit taken from the access point, room frame
    pub direction: Direction,
    /// World cell of the access point
    pub location: GridCoord,
}

/// Corridor endpoints chosen for a room connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPlan {
    pub edge: Edge,
    pub origin: AccessChoice,
    pub destination: AccessChoice,
    /// First corridor cell, in front of the origin access point
    pub start: GridCoord,
    /// Last corridor cell, in front of the destination access point
    pub end: GridCoord,
    pub distance: f64,
}

impl PathPlan {
    pub fn request(&self) -> PathRequest {
        PathRequest {
            start: self.start,
            goal: self.end,
        }
    }
}

/// Exits of the room anchored at `anchor` whose front cell is a free grid cell
fn exits(layout: &LevelLayout, anchor: GridCoord, excluded: &[GridCoord]) -> Vec<(AccessChoice, GridCoord)> {
    let Some(tile) = layout.tile(&anchor) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for access_point in &tile.access_points {
        for direction in access_point.directions.directions() {
            let front = anchor + (access_point.offset + direction.offset()).rotated(tile.rotation);
            if excluded.contains(&front) || layout.is_occupied(&front) || !layout.contains_coord(&front) {
                continue;
            }
            let choice = AccessChoice {
                anchor,
                room: tile.kind,
                offset: access_point.offset,
                direction,
                location: tile.access_point_location(anchor, access_point),
            };
            found.push((choice, front));
        }
    }
    found
}

/// Closest pair of free access point exits between the rooms of `edge`
///
/// Exits whose front cell is listed in the exclusions are skipped. Returns
/// `None` when either room is missing or has no usable exit.
pub fn shortest_access_pair(
    layout: &LevelLayout,
    edge: &Edge,
    excluded_origin: &[GridCoord],
    excluded_destination: &[GridCoord],
) -> Option<PathPlan> {
    let origins = exits(layout, edge.a, excluded_origin);
    let destinations = exits(layout, edge.b, excluded_destination);

    let mut best: Option<PathPlan> = None;
    for (destination, end) in &destinations {
        for (origin, start) in &origins {
            let distance = start.distance(end);
            if best.is_none_or(|plan| distance < plan.distance) {
                best = Some(PathPlan {
                    edge: *edge,
                    origin: *origin,
                    destination: *destination,
                    start: *start,
                    end: *end,
                    distance,
                });
            }
        }
    }
    best
}

/// Record a corridor of a single cell between two facing access points
pub fn commit_adjacent(layout: &mut LevelLayout, plan: &PathPlan) {
    let path = RoutedPath {
        start: plan.start,
        goal: plan.end,
        steps: vec![super::chain::PathStep::Corridor(plan.start)],
    };
    commit_path(layout, plan, &path);
}

fn mark_in_use(layout: &mut LevelLayout, choice: &AccessChoice) {
    let used = layout
        .tile_mut(&choice.anchor)
        .and_then(|tile| tile.access_point_mut(choice.offset))
        .is_some_and(|access_point| access_point.use_direction(choice.direction));
    if !used {
        debug!(
            "Access point {} of room {} does not open {}",
            choice.offset, choice.anchor, choice.direction
        );
    }
}

/// Route one planned connection, retrying with other access points
///
/// On failure the start cell is excluded and the origin room's other exits
/// are tried, then the destination's exits in turn. Returns the path that
/// was committed, or `None` if the rooms stay unconnected.
pub fn route_connection(
    settings: &LevelSettings,
    layout: &mut LevelLayout,
    plan: &PathPlan,
    planned: &[GridCoord],
) -> Option<RoutedPath> {
    let mut plan = *plan;
    if plan.start == plan.end {
        commit_adjacent(layout, &plan);
        mark_in_use(layout, &plan.origin);
        mark_in_use(layout, &plan.destination);
        return Some(RoutedPath {
            start: plan.start,
            goal: plan.end,
            steps: vec![super::chain::PathStep::Corridor(plan.start)],
        });
    }

    let origin_exits = layout
        .tile(&plan.edge.a)
        .map_or(0, |tile| tile.accessible_direction_count());
    let destination_exits = layout
        .tile(&plan.edge.b)
        .map_or(0, |tile| tile.accessible_direction_count());
    let mut excluded_origin = Vec::new();
    let mut excluded_destination = Vec::new();
    let mut origin_open = origin_exits > 0;

    loop {
        if let Some(path) = find_path(&plan.request(), settings, layout, planned) {
            commit_path(layout, &plan, &path);
            mark_in_use(layout, &plan.origin);
            mark_in_use(layout, &plan.destination);
            return Some(path);
        }

        let mut next = None;
        if origin_open {
            excluded_origin.push(plan.start);
            debug!("Excluding origin exit {} for {}", plan.start, plan.edge);
            next = shortest_access_pair(layout, &plan.edge, &excluded_origin, &[]);
            origin_open = next.is_some() && excluded_origin.len() < origin_exits;
        }
        // Origin exits exhausted, move on to the destination's
        if next.is_none() {
            excluded_destination.push(plan.end);
            if excluded_destination.len() >= destination_exits {
                break;
            }
            debug!("Excluding destination exit {} for {}", plan.end, plan.edge);
            next = shortest_access_pair(layout, &plan.edge, &[], &excluded_destination);
        }
        match next {
            Some(next) => plan = next,
            None => break,
        }
    }

    warn!("Rooms {} and {} left unconnected", plan.edge.a, plan.edge.b);
    None
}
