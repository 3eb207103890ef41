//! Search nodes and the cost model

use std::cmp::Ordering;

use super::chain::ChainId;
use crate::layout::{GridCoord, LevelLayout, StructurePlacement, TileKind};
use crate::settings::LevelSettings;

/// Multiplier applied to the vertical distance left to the goal
pub const ELEVATION_PENALTY: f64 = 2.5;

/// Costs of reaching a cell
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeCosts {
    /// Straight-line distance from the path start
    pub g: f64,
    /// Straight-line distance to the goal
    pub h: f64,
    pub f: f64,
    /// Storeys between the node and the goal
    pub elevation: i32,
}

/// Costs of a node located at `position`
///
/// `site` is the cell whose existing path data sets the tile weight: the
/// node itself for corridors, the first structure cell for structures.
/// `node_weight` is the structure's own weight, 0 for corridors.
pub fn node_costs(
    settings: &LevelSettings,
    layout: &LevelLayout,
    start: GridCoord,
    goal: GridCoord,
    site: GridCoord,
    position: GridCoord,
    node_weight: f64,
) -> NodeCosts {
    let weight = match layout.path_tile(&site) {
        Some(path_tile) => settings.tile_weight(path_tile.kind),
        None => settings.tile_weight(TileKind::Empty),
    } + node_weight;

    let elevation = (position.z - goal.z).abs();
    let g = start.distance(&position);
    let h = goal.distance(&position);
    let mut f = g + h + weight;
    if elevation != 0 {
        f += f64::from(elevation) * ELEVATION_PENALTY;
    }
    NodeCosts { g, h, f, elevation }
}

/// Role of a node in the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    Corridor,
    /// Exit node of a structure entered from the previous cell
    Structure(StructurePlacement),
    /// Cell covered by a committed structure, never expanded
    Section,
}

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub coord: GridCoord,
    pub costs: NodeCosts,
    pub role: NodeRole,
    /// Tail of the path leading to this node; structure nodes include their
    /// own cells
    pub chain: Option<ChainId>,
}

impl SearchNode {
    pub fn is_section(&self) -> bool {
        self.role == NodeRole::Section
    }

    pub fn structure(&self) -> Option<&StructurePlacement> {
        match &self.role {
            NodeRole::Structure(placement) => Some(placement),
            _ => None,
        }
    }
}

/// Frontier order: total cost, then elevation to goal, then heuristic
///
/// Coordinates break the remaining ties so runs are reproducible.
pub fn frontier_order(a: &SearchNode, b: &SearchNode) -> Ordering {
    a.costs
        .f
        .total_cmp(&b.costs.f)
        .then(a.costs.elevation.cmp(&b.costs.elevation))
        .then(a.costs.h.total_cmp(&b.costs.h))
        .then(a.coord.cmp(&b.coord))
}
