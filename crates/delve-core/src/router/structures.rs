//! Special structure placement during the search
//!
//! Each structure is tried in two orientations from the cell in front of a
//! settled node. Ascending placements are anchored at that cell and follow
//! the template upwards. Descending placements run the template backwards,
//! so the path walks in at the top and leaves at the bottom.

use hashbrown::HashSet;

use super::chain::{ChainId, PathStep};
use super::node::{node_costs, NodeRole, SearchNode};
use super::search::Search;
use crate::layout::{Direction, GridCoord, Rotation, SpecialPathKind, StructurePlacement};
use crate::settings::StructureTemplate;

/// A structure placement proposed by one orientation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub placement: StructurePlacement,
    pub exit: GridCoord,
    /// Whether an identical structure already sits at the entry cell
    pub reuses_existing: bool,
}

/// Placement climbing from `current`, entered heading `rotation`
pub fn ascending(kind: SpecialPathKind, template: &StructureTemplate, current: GridCoord, rotation: Rotation) -> (StructurePlacement, GridCoord) {
    let cells = template
        .footprint
        .iter()
        .map(|offset| current + offset.rotated(rotation))
        .collect();
    let placement = StructurePlacement {
        kind,
        rotation,
        origin: current,
        cells,
    };
    (placement, current + template.exit.rotated(rotation))
}

/// Placement descending from the cell in front of `from`, heading `direction`
pub fn descending(
    kind: SpecialPathKind,
    template: &StructureTemplate,
    from: GridCoord,
    direction: Direction,
    rotation: Rotation,
) -> (StructurePlacement, GridCoord) {
    let current = from + direction.offset();
    let reversed = rotation.then(Rotation::R180);
    let exit = current + (-template.exit).rotated(reversed);

    let xy = from.manhattan_xy(&exit);
    let origin = match xy {
        d if d > 1 => exit - direction.offset(),
        1 => exit,
        _ => from + (-template.exit).rotated(rotation),
    };
    let placed_rotation = if xy == 0 { rotation } else { reversed };
    let cells = template
        .footprint
        .iter()
        .rev()
        .map(|offset| origin + offset.rotated(placed_rotation))
        .collect();
    let placement = StructurePlacement {
        kind,
        rotation: placed_rotation,
        origin,
        cells,
    };
    (placement, exit)
}

impl Search<'_> {
    /// Whether a structure may newly occupy `coord`
    fn is_free_for_structure(&self, coord: &GridCoord, members: &HashSet<GridCoord>, avoid_planned: bool) -> bool {
        self.is_traversable(coord)
            && !self.closed.contains_key(coord)
            && !self.layout.is_occupied(coord)
            && self.layout.path_tile(coord).is_none()
            && !members.contains(coord)
            && !(avoid_planned && self.planned.contains(coord))
    }

    /// Existing structure at `current` matching the placement exactly
    fn same_structure_at(&self, current: &GridCoord, placement: &StructurePlacement) -> bool {
        self.layout
            .path_tile(current)
            .and_then(|path_tile| path_tile.structure.as_ref())
            .is_some_and(|existing| existing.same_site(placement.kind, placement.rotation, placement.origin))
    }

    /// Existing descending structure seen from its other end
    fn mirrored_structure_at(
        &self,
        current: &GridCoord,
        placement: &StructurePlacement,
        exit: GridCoord,
        template: &StructureTemplate,
        rotation: Rotation,
    ) -> bool {
        let Some(existing) = self
            .layout
            .path_tile(current)
            .and_then(|path_tile| path_tile.structure.as_ref())
        else {
            return false;
        };
        let Some(parent) = self
            .layout
            .path_tile(&existing.origin)
            .and_then(|path_tile| path_tile.structure.as_ref())
        else {
            return false;
        };
        let expected_exit = exit + template.exit.rotated(rotation);
        parent.origin == expected_exit && parent.origin == placement.origin && parent.rotation == rotation
    }

    /// Whether `candidate` may enter OPEN
    fn admits(&self, candidate: &Candidate, members: &HashSet<GridCoord>) -> bool {
        let exit = &candidate.exit;
        if self.open.contains_key(exit) || self.closed.contains_key(exit) {
            return false;
        }
        if candidate.reuses_existing {
            return self.is_traversable(exit)
                && !members.contains(exit)
                && candidate
                    .placement
                    .cells
                    .iter()
                    .all(|cell| self.is_traversable(cell) && !members.contains(cell));
        }
        candidate
            .placement
            .cells
            .iter()
            .all(|cell| *cell != self.goal && self.is_free_for_structure(cell, members, true))
            && self.is_free_for_structure(exit, members, false)
    }

    /// Offer every enabled structure in front of the settled node at `from`
    pub(super) fn evaluate_structures(
        &mut self,
        from: GridCoord,
        direction: Direction,
        members: &HashSet<GridCoord>,
        tail: ChainId,
    ) {
        let Some(rotation) = direction.heading() else {
            return;
        };
        let current = from + direction.offset();
        if !self.is_traversable(&current) || self.closed.contains_key(&current) {
            return;
        }

        let settings = self.settings;
        for (kind, template) in settings.enabled_structures() {
            let (placement, exit) = ascending(kind, template, current, rotation);
            let reuses_existing = self.same_structure_at(&current, &placement);
            self.offer(
                Candidate {
                    placement,
                    exit,
                    reuses_existing,
                },
                current,
                template,
                members,
                tail,
            );

            let (placement, exit) = descending(kind, template, from, direction, rotation);
            let reuses_existing = self.same_structure_at(&current, &placement)
                || self.mirrored_structure_at(&current, &placement, exit, template, rotation);
            self.offer(
                Candidate {
                    placement,
                    exit,
                    reuses_existing,
                },
                current,
                template,
                members,
                tail,
            );
        }
    }

    fn offer(
        &mut self,
        candidate: Candidate,
        current: GridCoord,
        template: &StructureTemplate,
        members: &HashSet<GridCoord>,
        tail: ChainId,
    ) {
        if !self.admits(&candidate, members) {
            return;
        }
        let costs = node_costs(
            self.settings,
            self.layout,
            self.start,
            self.goal,
            current,
            candidate.exit,
            template.node_weight,
        );
        let chain = self
            .chain
            .push(Some(tail), PathStep::Structure(candidate.placement.clone()));
        self.open.insert(
            candidate.exit,
            SearchNode {
                coord: candidate.exit,
                costs,
                role: NodeRole::Structure(candidate.placement),
                chain: Some(chain),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32, z: i32) -> GridCoord {
        GridCoord::new(x, y, z)
    }

    #[test]
    fn test_ascending_stairs_north() {
        let template = StructureTemplate::stairs_1x2x2();
        let (placement, exit) = ascending(SpecialPathKind::Stairs1x2x2, &template, c(1, 0, 0), Rotation::R0);
        assert_eq!(placement.origin, c(1, 0, 0));
        assert_eq!(
            placement.cells,
            vec![c(1, 0, 0), c(2, 0, 0), c(1, 0, 1), c(2, 0, 1)]
        );
        assert_eq!(exit, c(3, 0, 1));
    }

    #[test]
    fn test_ascending_stairs_east() {
        let template = StructureTemplate::stairs_1x1x2();
        let (placement, exit) = ascending(SpecialPathKind::Stairs1x1x2, &template, c(0, 1, 0), Rotation::R90);
        assert_eq!(placement.cells, vec![c(0, 1, 0), c(0, 1, 1)]);
        assert_eq!(exit, c(0, 2, 1));
    }

    #[test]
    fn test_descending_stairs_north() {
        let template = StructureTemplate::stairs_1x2x2();
        let from = c(0, 0, 1);
        let (placement, exit) = descending(
            SpecialPathKind::Stairs1x2x2,
            &template,
            from,
            Direction::North,
            Rotation::R0,
        );
        // Walk in at the top, leave from the bottom two cells further on
        assert_eq!(exit, c(3, 0, 0));
        assert_eq!(placement.origin, c(2, 0, 0));
        assert_eq!(placement.rotation, Rotation::R180);
        assert_eq!(
            placement.cells,
            vec![c(1, 0, 1), c(2, 0, 1), c(1, 0, 0), c(2, 0, 0)]
        );
    }

    #[test]
    fn test_descending_elevator_west() {
        let template = StructureTemplate::elevator(3);
        let from = c(2, 2, 2);
        let (placement, exit) = descending(
            SpecialPathKind::ElevatorS3,
            &template,
            from,
            Direction::West,
            Rotation::R270,
        );
        assert_eq!(exit, c(2, 1, 0));
        assert_eq!(placement.origin, exit);
        assert_eq!(placement.cells, vec![c(2, 1, 2), c(2, 1, 1), c(2, 1, 0)]);
        assert_eq!(placement.rotation, Rotation::R90);
    }

    #[test]
    fn test_descending_cells_match_ascending_mirror() {
        // The same flight walked down covers the cells it covers walked up
        let template = StructureTemplate::stairs_1x2x2();
        let (down, down_exit) = descending(
            SpecialPathKind::Stairs1x2x2,
            &template,
            c(5, 0, 1),
            Direction::South,
            Rotation::R180,
        );
        let (up, up_exit) = ascending(SpecialPathKind::Stairs1x2x2, &template, c(3, 0, 0), Rotation::R0);
        let mut a = down.cells.clone();
        let mut b = up.cells.clone();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(down_exit, c(2, 0, 0));
        // Climbing back up leaves where the descent started
        assert_eq!(up_exit, c(5, 0, 1));
    }
}
