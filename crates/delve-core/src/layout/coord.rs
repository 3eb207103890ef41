//! Grid coordinates and quarter-turn rotations

use std::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Integer cell position on the 3D level grid
///
/// Also used for grid sizes, where each axis holds the number of cells.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub const ZERO: GridCoord = GridCoord { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance between two cells
    pub fn distance(&self, other: &GridCoord) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Manhattan distance ignoring the vertical axis
    pub fn manhattan_xy(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Rotate about the vertical axis through the origin
    pub fn rotated(&self, rotation: Rotation) -> GridCoord {
        match rotation {
            Rotation::R0 => *self,
            Rotation::R90 => GridCoord::new(-self.y, self.x, self.z),
            Rotation::R180 => GridCoord::new(-self.x, -self.y, self.z),
            Rotation::R270 => GridCoord::new(self.y, -self.x, self.z),
        }
    }

    /// Each axis clamped to `[-1, 1]`
    pub fn signum(&self) -> GridCoord {
        GridCoord::new(self.x.signum(), self.y.signum(), self.z.signum())
    }

    /// Number of cells when this value is read as a grid size
    ///
    /// Zero if any axis is not positive.
    pub fn volume(&self) -> i64 {
        if !self.is_positive() {
            return 0;
        }
        i64::from(self.x) * i64::from(self.y) * i64::from(self.z)
    }

    /// True when every axis is strictly positive
    pub fn is_positive(&self) -> bool {
        self.x > 0 && self.y > 0 && self.z > 0
    }

    /// Whether `coord` lies inside a grid of this size
    pub fn contains(&self, coord: &GridCoord) -> bool {
        (0..self.x).contains(&coord.x)
            && (0..self.y).contains(&coord.y)
            && (0..self.z).contains(&coord.z)
    }

    /// Every coordinate of a grid of this size, ordered by x then y then z
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + use<> {
        let size = *self;
        let (sx, sy, sz) = if size.is_positive() {
            (size.x, size.y, size.z)
        } else {
            (0, 0, 0)
        };
        (0..sx).flat_map(move |x| {
            (0..sy).flat_map(move |y| (0..sz).map(move |z| GridCoord::new(x, y, z)))
        })
    }

    pub fn as_f64(&self) -> [f64; 3] {
        [f64::from(self.x), f64::from(self.y), f64::from(self.z)]
    }
}

impl Add for GridCoord {
    type Output = GridCoord;

    fn add(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for GridCoord {
    fn add_assign(&mut self, rhs: GridCoord) {
        *self = *self + rhs;
    }
}

impl Sub for GridCoord {
    type Output = GridCoord;

    fn sub(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for GridCoord {
    type Output = GridCoord;

    fn neg(self) -> GridCoord {
        GridCoord::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Rotation about the vertical axis in quarter turns
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Build from a number of quarter turns, any sign
    pub fn from_quarter_turns(turns: i32) -> Self {
        match turns.rem_euclid(4) {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    pub fn quarter_turns(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() * 90
    }

    /// Compose two rotations
    pub fn then(self, other: Rotation) -> Rotation {
        Rotation::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// The rotation that undoes this one
    pub fn inverse(self) -> Rotation {
        Rotation::from_quarter_turns(-self.quarter_turns())
    }
}
