//! Constrained 3D A* over the level grid
//!
//! Corridors move between horizontal neighbours only. Vertical movement is
//! made by special structures, which the search enters as a single step and
//! commits atomically when their exit node is settled.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use log::debug;

use super::chain::{Chain, ChainId, PathStep};
use super::node::{frontier_order, node_costs, NodeRole, SearchNode};
use crate::layout::{Direction, GridCoord, LevelLayout};
use crate::settings::LevelSettings;

/// Evaluation order of horizontal neighbours
pub const EXPANSION_ORDER: [Direction; 4] = [
    Direction::West,
    Direction::North,
    Direction::East,
    Direction::South,
];

/// Cells a corridor must join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathRequest {
    pub start: GridCoord,
    pub goal: GridCoord,
}

/// A path found by [`find_path`], steps from start to goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedPath {
    pub start: GridCoord,
    pub goal: GridCoord,
    pub steps: Vec<PathStep>,
}

impl RoutedPath {
    /// Every cell of the path in order
    pub fn cells(&self) -> Vec<GridCoord> {
        self.steps
            .iter()
            .flat_map(|step| step.cells().iter().copied())
            .collect()
    }

    pub fn structures(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, PathStep::Structure(_)))
            .count()
    }
}

/// Search state for one request
pub(super) struct Search<'a> {
    pub(super) settings: &'a LevelSettings,
    pub(super) layout: &'a LevelLayout,
    pub(super) start: GridCoord,
    pub(super) goal: GridCoord,
    /// Room cells
    pub(super) inaccessible: HashSet<GridCoord>,
    /// Start and end cells of every planned path
    pub(super) planned: HashSet<GridCoord>,
    pub(super) open: BTreeMap<GridCoord, SearchNode>,
    pub(super) closed: BTreeMap<GridCoord, SearchNode>,
    pub(super) chain: Chain,
}

/// Route a corridor from `request.start` to `request.goal`
///
/// `planned` holds the start and end cells of every path planned for the
/// level; structures never cover them. Returns `None` when the frontier
/// empties, or when either endpoint lies outside the grid or inside a room.
pub fn find_path(
    request: &PathRequest,
    settings: &LevelSettings,
    layout: &LevelLayout,
    planned: &[GridCoord],
) -> Option<RoutedPath> {
    Search::new(request, settings, layout, planned).run()
}

impl<'a> Search<'a> {
    fn new(request: &PathRequest, settings: &'a LevelSettings, layout: &'a LevelLayout, planned: &[GridCoord]) -> Self {
        let inaccessible = layout
            .tiles()
            .iter()
            .filter(|(_, tile)| tile.kind.is_room())
            .map(|(coord, _)| *coord)
            .collect();
        Self {
            settings,
            layout,
            start: request.start,
            goal: request.goal,
            inaccessible,
            planned: planned.iter().copied().collect(),
            open: BTreeMap::new(),
            closed: BTreeMap::new(),
            chain: Chain::new(),
        }
    }

    /// Whether a cell may be part of any path at all
    pub(super) fn is_traversable(&self, coord: &GridCoord) -> bool {
        self.layout.contains_coord(coord) && !self.inaccessible.contains(coord)
    }

    fn run(mut self) -> Option<RoutedPath> {
        for endpoint in [self.start, self.goal] {
            if !self.is_traversable(&endpoint) {
                debug!("Path endpoint {} is outside the grid or inside a room", endpoint);
                return None;
            }
        }

        let costs = node_costs(self.settings, self.layout, self.start, self.goal, self.start, self.start, 0.0);
        let start = SearchNode {
            coord: self.start,
            costs,
            role: NodeRole::Corridor,
            chain: None,
        };
        if self.start == self.goal {
            return Some(RoutedPath {
                start: self.start,
                goal: self.goal,
                steps: vec![PathStep::Corridor(self.start)],
            });
        }
        self.closed.insert(self.start, start.clone());
        self.expand(&start);

        loop {
            let coord = self
                .open
                .values()
                .min_by(|a, b| frontier_order(a, b))
                .map(|node| node.coord)?;
            let node = self.open.remove(&coord)?;
            self.settle(&node);

            if coord == self.goal {
                let tail = self.extended_chain(&node);
                return Some(RoutedPath {
                    start: self.start,
                    goal: self.goal,
                    steps: self.chain.steps(Some(tail)),
                });
            }
            self.expand(&node);
        }
    }

    /// Move a popped node into CLOSED, committing structure cells first
    fn settle(&mut self, node: &SearchNode) {
        if let Some(placement) = node.structure() {
            for cell in &placement.cells {
                self.open.remove(cell);
                self.closed.insert(
                    *cell,
                    SearchNode {
                        coord: *cell,
                        costs: node.costs,
                        role: NodeRole::Section,
                        chain: node.chain,
                    },
                );
            }
        }
        self.closed.insert(node.coord, node.clone());
    }

    /// Chain tail for the children of `node`
    fn extended_chain(&mut self, node: &SearchNode) -> ChainId {
        match (node.structure(), node.chain) {
            (Some(placement), Some(tail)) if placement.cells.contains(&node.coord) => tail,
            _ => self.chain.push(node.chain, PathStep::Corridor(node.coord)),
        }
    }

    /// Add the corridor neighbours and structure placements of a settled node
    fn expand(&mut self, node: &SearchNode) {
        if node.is_section() {
            return;
        }
        let members = self.chain.members(node.chain);
        let tail = self.extended_chain(node);

        for direction in EXPANSION_ORDER {
            let neighbour = node.coord + direction.offset();
            if self.is_traversable(&neighbour)
                && !self.open.contains_key(&neighbour)
                && !self.closed.contains_key(&neighbour)
                && !members.contains(&neighbour)
                && !self
                    .layout
                    .path_tile(&neighbour)
                    .is_some_and(|path_tile| path_tile.is_structure())
            {
                let costs = node_costs(self.settings, self.layout, self.start, self.goal, neighbour, neighbour, 0.0);
                self.open.insert(
                    neighbour,
                    SearchNode {
                        coord: neighbour,
                        costs,
                        role: NodeRole::Corridor,
                        chain: Some(tail),
                    },
                );
            }

            self.evaluate_structures(node.coord, direction, &members, tail);
        }
    }
}
