//! Exit directions and direction sets

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::coord::{GridCoord, Rotation};

/// One of the six axis-aligned exits of a cell
///
/// North is +x, East is +y, Above is +z.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Above,
    Below,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Above,
        Direction::Below,
    ];

    /// Horizontal directions in clockwise order starting at North
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset of one step in this direction
    pub const fn offset(self) -> GridCoord {
        match self {
            Direction::North => GridCoord::new(1, 0, 0),
            Direction::East => GridCoord::new(0, 1, 0),
            Direction::South => GridCoord::new(-1, 0, 0),
            Direction::West => GridCoord::new(0, -1, 0),
            Direction::Above => GridCoord::new(0, 0, 1),
            Direction::Below => GridCoord::new(0, 0, -1),
        }
    }

    /// Direction whose offset is exactly `offset`
    pub fn from_offset(offset: GridCoord) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.offset() == offset)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }

    /// Rotate about the vertical axis; Above and Below are unchanged
    pub fn rotated(self, rotation: Rotation) -> Direction {
        match self {
            Direction::Above | Direction::Below => self,
            _ => {
                let index = match self {
                    Direction::North => 0,
                    Direction::East => 1,
                    Direction::South => 2,
                    _ => 3,
                };
                Direction::CARDINAL[((index + rotation.quarter_turns()) % 4) as usize]
            }
        }
    }

    pub fn is_horizontal(self) -> bool {
        !matches!(self, Direction::Above | Direction::Below)
    }

    /// Rotation that turns North into this direction
    pub fn heading(self) -> Option<Rotation> {
        match self {
            Direction::North => Some(Rotation::R0),
            Direction::East => Some(Rotation::R90),
            Direction::South => Some(Rotation::R180),
            Direction::West => Some(Rotation::R270),
            Direction::Above | Direction::Below => None,
        }
    }

    /// Dominant direction from `start` towards `target`
    ///
    /// The difference is clamped per axis first, so any vertical offset wins.
    /// Returns `None` when the clamped horizontal components tie.
    pub fn between(start: &GridCoord, target: &GridCoord) -> Option<Direction> {
        let d = (*target - *start).signum();
        if d.z > 0 {
            Some(Direction::Above)
        } else if d.z < 0 {
            Some(Direction::Below)
        } else if d.x.abs() > d.y.abs() {
            Some(if d.x > 0 {
                Direction::North
            } else {
                Direction::South
            })
        } else if d.y.abs() > d.x.abs() {
            Some(if d.y > 0 {
                Direction::East
            } else {
                Direction::West
            })
        } else {
            None
        }
    }

    fn flag(self) -> DirectionSet {
        match self {
            Direction::North => DirectionSet::NORTH,
            Direction::East => DirectionSet::EAST,
            Direction::South => DirectionSet::SOUTH,
            Direction::West => DirectionSet::WEST,
            Direction::Above => DirectionSet::ABOVE,
            Direction::Below => DirectionSet::BELOW,
        }
    }
}

bitflags! {
    /// Set of exit directions
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DirectionSet: u8 {
        const NORTH = 0x01;
        const EAST = 0x02;
        const SOUTH = 0x04;
        const WEST = 0x08;
        const ABOVE = 0x10;
        const BELOW = 0x20;
    }
}

// Manual serde impl for DirectionSet
impl Serialize for DirectionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DirectionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(DirectionSet::from_bits_truncate(bits))
    }
}

impl From<Direction> for DirectionSet {
    fn from(direction: Direction) -> Self {
        direction.flag()
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DirectionSet::empty(), |set, d| set | d.flag())
    }
}

impl DirectionSet {
    pub fn has(&self, direction: Direction) -> bool {
        self.contains(direction.flag())
    }

    pub fn add(&mut self, direction: Direction) {
        self.insert(direction.flag());
    }

    /// Member directions in `Direction::ALL` order
    pub fn directions(&self) -> impl Iterator<Item = Direction> + use<> {
        let set = *self;
        Direction::ALL.into_iter().filter(move |d| set.has(*d))
    }

    pub fn len(&self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Every member direction rotated
    pub fn rotated(&self, rotation: Rotation) -> DirectionSet {
        self.directions().map(|d| d.rotated(rotation)).collect()
    }

    /// Only North, East, South and West
    pub fn horizontal(&self) -> DirectionSet {
        *self & (DirectionSet::NORTH | DirectionSet::EAST | DirectionSet::SOUTH | DirectionSet::WEST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rotate_north_clockwise() {
        assert_eq!(Direction::North.rotated(Rotation::R90), Direction::East);
        assert_eq!(Direction::North.rotated(Rotation::R180), Direction::South);
        assert_eq!(Direction::West.rotated(Rotation::R90), Direction::North);
        assert_eq!(Direction::Above.rotated(Rotation::R270), Direction::Above);
    }

    #[test]
    fn test_rotation_matches_offset() {
        for d in Direction::iter() {
            for r in Rotation::iter() {
                assert_eq!(d.rotated(r).offset(), d.offset().rotated(r));
            }
        }
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        for d in Direction::iter() {
            assert_eq!(d.offset() + d.opposite().offset(), GridCoord::ZERO);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_from_offset() {
        for d in Direction::iter() {
            assert_eq!(Direction::from_offset(d.offset()), Some(d));
        }
        assert_eq!(Direction::from_offset(GridCoord::new(1, 1, 0)), None);
    }

    #[test]
    fn test_between() {
        let o = GridCoord::ZERO;
        assert_eq!(
            Direction::between(&o, &GridCoord::new(5, 0, 0)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(&o, &GridCoord::new(0, -2, 0)),
            Some(Direction::West)
        );
        assert_eq!(
            Direction::between(&o, &GridCoord::new(3, 3, -1)),
            Some(Direction::Below)
        );
        // Clamped before comparison, so a diagonal ties
        assert_eq!(Direction::between(&o, &GridCoord::new(4, 1, 0)), None);
        assert_eq!(Direction::between(&o, &o), None);
    }

    #[test]
    fn test_heading() {
        for d in Direction::CARDINAL {
            let r = d.heading().unwrap();
            assert_eq!(Direction::North.rotated(r), d);
        }
        assert!(Direction::Below.heading().is_none());
    }

    #[test]
    fn test_direction_set() {
        let mut set = DirectionSet::from(Direction::North);
        set.add(Direction::Above);
        assert!(set.has(Direction::North));
        assert!(!set.has(Direction::South));
        assert_eq!(set.len(), 2);
        assert_eq!(set.horizontal(), DirectionSet::NORTH);

        let rotated = set.rotated(Rotation::R90);
        assert!(rotated.has(Direction::East));
        assert!(rotated.has(Direction::Above));

        let collected: Vec<_> = set.directions().collect();
        assert_eq!(collected, vec![Direction::North, Direction::Above]);
    }

    #[test]
    fn test_direction_set_serde_bits() {
        let set: DirectionSet = [Direction::East, Direction::West].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "10");
        let back: DirectionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
