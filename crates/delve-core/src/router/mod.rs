//! Corridor router
//!
//! Plans access points for every chosen connection, routes each one with a
//! constrained A* that can insert stairs and elevator shafts, then turns the
//! recorded paths into corridor tiles.

pub mod chain;
pub mod finalize;
pub mod node;
pub mod plan;
pub mod search;
pub mod structures;

use log::{debug, info, warn};

pub use chain::PathStep;
pub use finalize::{commit_path, corridor_tile, finalize_tiles, structure_tiles};
pub use plan::{commit_adjacent, route_connection, shortest_access_pair, AccessChoice, PathPlan};
pub use search::{find_path, PathRequest, RoutedPath};

use crate::graph::Edge;
use crate::layout::{GridCoord, LevelLayout};
use crate::settings::LevelSettings;

/// Outcome of routing a set of connections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteReport {
    pub requested: usize,
    pub planned: usize,
    pub routed: usize,
    pub structures: usize,
}

impl RouteReport {
    pub fn failed(&self) -> usize {
        self.requested - self.routed
    }
}

/// Route every connection, shortest first, into path tiles
///
/// All access points are planned before any path is searched, so structures
/// keep clear of every corridor end. Tiles are not created here; see
/// [`finalize_tiles`].
pub fn route_connections(settings: &LevelSettings, layout: &mut LevelLayout, connections: &[Edge]) -> RouteReport {
    let mut sorted = connections.to_vec();
    sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let plans: Vec<PathPlan> = sorted
        .iter()
        .filter_map(|edge| {
            let plan = shortest_access_pair(layout, edge, &[], &[]);
            if plan.is_none() {
                warn!("No free access points between {} and {}", edge.a, edge.b);
            }
            plan
        })
        .collect();
    let planned: Vec<GridCoord> = plans.iter().flat_map(|plan| [plan.start, plan.end]).collect();

    let mut report = RouteReport {
        requested: sorted.len(),
        planned: plans.len(),
        ..Default::default()
    };
    for plan in &plans {
        if let Some(path) = route_connection(settings, layout, plan, &planned) {
            debug!(
                "Routed {} over {} cells with {} structures",
                plan.edge,
                path.cells().len(),
                path.structures()
            );
            report.routed += 1;
            report.structures += path.structures();
        }
    }
    info!(
        "Corridors: {} of {} connections routed, {} failed, {} structures",
        report.routed,
        report.requested,
        report.failed(),
        report.structures
    );
    report
}
