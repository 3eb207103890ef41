//! Predecessor chains shared between search nodes
//!
//! Every node points at the tail of the path that led to it. Chains share
//! their prefixes, so extending one is a single push into the arena.

use hashbrown::HashSet;

use crate::layout::{GridCoord, StructurePlacement};

/// One step of a routed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// A plain corridor cell
    Corridor(GridCoord),
    /// A whole special structure, cells in commit order
    Structure(StructurePlacement),
}

impl PathStep {
    /// Cells covered by the step
    pub fn cells(&self) -> &[GridCoord] {
        match self {
            PathStep::Corridor(coord) => std::slice::from_ref(coord),
            PathStep::Structure(placement) => &placement.cells,
        }
    }

    /// Cell the path enters the step through
    pub fn entry(&self) -> Option<GridCoord> {
        self.cells().first().copied()
    }

    /// Cell the path leaves the step from
    pub fn departure(&self) -> Option<GridCoord> {
        self.cells().last().copied()
    }
}

pub type ChainId = usize;

#[derive(Debug, Clone)]
struct Link {
    step: PathStep,
    prev: Option<ChainId>,
}

/// Arena of chain links for one search
#[derive(Debug, Default)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` after `tail`, returning the new tail
    pub fn push(&mut self, tail: Option<ChainId>, step: PathStep) -> ChainId {
        self.links.push(Link { step, prev: tail });
        self.links.len() - 1
    }

    fn walk(&self, tail: Option<ChainId>) -> impl Iterator<Item = &PathStep> {
        let mut cursor = tail;
        std::iter::from_fn(move || {
            let link = self.links.get(cursor?)?;
            cursor = link.prev;
            Some(&link.step)
        })
    }

    /// Every cell on the chain ending at `tail`
    pub fn members(&self, tail: Option<ChainId>) -> HashSet<GridCoord> {
        self.walk(tail)
            .flat_map(|step| step.cells().iter().copied())
            .collect()
    }

    /// Steps from the first to `tail`
    pub fn steps(&self, tail: Option<ChainId>) -> Vec<PathStep> {
        let mut steps: Vec<PathStep> = self.walk(tail).cloned().collect();
        steps.reverse();
        steps
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
