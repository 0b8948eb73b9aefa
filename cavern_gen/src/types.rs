// Core spatial types shared across cave generation.
//
// Defines grid coordinates (`GridCoord`), the 6-bit direction flag set
// (`Direction`), and the face axes that orient walls (`FaceAxis`). All of
// these are small `Copy` values with pure operations; nothing here touches
// the grid or the PRNG.
//
// Axis conventions:
// - X: east  (positive) / west  (negative)
// - Y: up    (positive) / down  (negative)
// - Z: north (positive) / south (negative)
//
// `Direction` bit layout puts the three negative directions in the low bits
// and their positive partners exactly three bits higher, so `opposite()` is a
// pair of shifts and a `FaceAxis` is just the two-bit mask of its directions.
//
// See also: `wall.rs` for `GridWall`, which is keyed by `(GridCoord,
// FaceAxis)`, and `passage.rs` for the randomized step rules built on top of
// `GridCoord::direction_towards`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A cell position in a 3D grid. Each component is in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCoord {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// One step in `direction`. Composite masks add every contained step, so
    /// opposite bits cancel out.
    pub fn step(self, direction: Direction) -> Self {
        self.step_by(direction, 1)
    }

    /// `steps` cells in `direction`.
    pub fn step_by(self, direction: Direction, steps: i32) -> Self {
        let (dx, dy, dz) = direction.step_vector();
        Self::new(
            self.x + dx * steps,
            self.y + dy * steps,
            self.z + dz * steps,
        )
    }

    /// Clamp each component into `[min, max]` (inclusive).
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(
            self.x.clamp(min.x, max.x.max(min.x)),
            self.y.clamp(min.y, max.y.max(min.y)),
            self.z.clamp(min.z, max.z.max(min.z)),
        )
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        ((self.x - other.x).unsigned_abs())
            + ((self.y - other.y).unsigned_abs())
            + ((self.z - other.z).unsigned_abs())
    }

    /// True when both coordinates share the same (x, z) column.
    pub fn same_column(self, other: Self) -> bool {
        self.x == other.x && self.z == other.z
    }

    /// The single cardinal direction that most reduces the 3D distance to
    /// `target`. Ties prefer x, then y. `NONE` when already there.
    pub fn direction_towards(self, target: Self) -> Direction {
        let (dx, dy, dz) = (target.x - self.x, target.y - self.y, target.z - self.z);
        let (ax, ay, az) = (dx.abs(), dy.abs(), dz.abs());
        if ax == 0 && ay == 0 && az == 0 {
            Direction::NONE
        } else if ax >= ay && ax >= az {
            if dx > 0 { Direction::EAST } else { Direction::WEST }
        } else if ay >= az {
            if dy > 0 { Direction::UP } else { Direction::DOWN }
        } else if dz > 0 {
            Direction::NORTH
        } else {
            Direction::SOUTH
        }
    }

    /// The lateral direction making the most progress towards `target`,
    /// ignoring height. Ties prefer x. `NONE` when in the same column.
    pub fn lateral_direction_towards(self, target: Self) -> Direction {
        let dx = target.x - self.x;
        let dz = target.z - self.z;
        if dx == 0 && dz == 0 {
            Direction::NONE
        } else if dx.abs() >= dz.abs() {
            if dx > 0 { Direction::EAST } else { Direction::WEST }
        } else if dz > 0 {
            Direction::NORTH
        } else {
            Direction::SOUTH
        }
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Directions
// ---------------------------------------------------------------------------

/// A set of the six cardinal grid directions, stored as 6 bits.
///
/// A single-bit value is one direction; multi-bit values are masks used to
/// express "allowed" step sets. Combine with `|`, `&`, and `!`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction(u8);

impl Direction {
    pub const NONE: Self = Self(0);

    pub const WEST: Self = Self(0b00_0001);
    pub const DOWN: Self = Self(0b00_0010);
    pub const SOUTH: Self = Self(0b00_0100);

    pub const EAST: Self = Self(0b00_1000);
    pub const UP: Self = Self(0b01_0000);
    pub const NORTH: Self = Self(0b10_0000);

    pub const WEST_EAST: Self = Self(Self::WEST.0 | Self::EAST.0);
    pub const DOWN_UP: Self = Self(Self::DOWN.0 | Self::UP.0);
    pub const SOUTH_NORTH: Self = Self(Self::SOUTH.0 | Self::NORTH.0);

    pub const NEGATIVE: Self = Self(Self::WEST.0 | Self::DOWN.0 | Self::SOUTH.0);
    pub const POSITIVE: Self = Self(Self::EAST.0 | Self::UP.0 | Self::NORTH.0);

    pub const LATERAL: Self = Self(Self::WEST_EAST.0 | Self::SOUTH_NORTH.0);
    pub const VERTICAL: Self = Self::DOWN_UP;

    pub const ALL: Self = Self(0b11_1111);

    /// The six cardinals in bit order.
    pub const CARDINALS: [Self; 6] = [
        Self::WEST,
        Self::DOWN,
        Self::SOUTH,
        Self::EAST,
        Self::UP,
        Self::NORTH,
    ];

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every direction in `other` is also in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of directions in the set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Swap every negative direction with its positive partner. Works on masks
    /// as well as single directions.
    pub const fn opposite(self) -> Self {
        let negative = self.0 & Self::NEGATIVE.0;
        let positive = self.0 & Self::POSITIVE.0;
        Self((negative << 3) | (positive >> 3))
    }

    /// Quarter turn counter-clockwise seen from above. Only defined for
    /// single lateral directions (and `NONE`, which stays `NONE`).
    pub fn turn_left(self) -> Option<Self> {
        match self {
            Self::NONE => Some(Self::NONE),
            Self::WEST => Some(Self::SOUTH),
            Self::SOUTH => Some(Self::EAST),
            Self::EAST => Some(Self::NORTH),
            Self::NORTH => Some(Self::WEST),
            _ => None,
        }
    }

    /// Quarter turn clockwise seen from above.
    pub fn turn_right(self) -> Option<Self> {
        match self {
            Self::NONE => Some(Self::NONE),
            Self::WEST => Some(Self::NORTH),
            Self::NORTH => Some(Self::EAST),
            Self::EAST => Some(Self::SOUTH),
            Self::SOUTH => Some(Self::WEST),
            _ => None,
        }
    }

    /// The face axis a single cardinal direction runs along.
    pub fn axis(self) -> Option<FaceAxis> {
        FaceAxis::ALL
            .into_iter()
            .find(|axis| self.count() == 1 && axis.directions().contains(self))
    }

    /// Unit offset `(dx, dy, dz)`, summed over every contained direction.
    pub const fn step_vector(self) -> (i32, i32, i32) {
        let b = self.0;
        let dx = ((b & Self::EAST.0 != 0) as i32) - ((b & Self::WEST.0 != 0) as i32);
        let dy = ((b & Self::UP.0 != 0) as i32) - ((b & Self::DOWN.0 != 0) as i32);
        let dz = ((b & Self::NORTH.0 != 0) as i32) - ((b & Self::SOUTH.0 != 0) as i32);
        (dx, dy, dz)
    }

    /// The cardinals in this set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Self> {
        Self::CARDINALS.into_iter().filter(move |d| self.contains(*d))
    }
}

impl BitOr for Direction {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Direction {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Direction {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Direction {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Direction {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 6] = ["West", "Down", "South", "East", "Up", "North"];
        if self.is_empty() {
            return f.write_str("Direction(None)");
        }
        f.write_str("Direction(")?;
        let mut first = true;
        for (i, name) in NAMES.iter().enumerate() {
            if self.0 & (1 << i) != 0 {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Face axes
// ---------------------------------------------------------------------------

/// The axis perpendicular to a wall face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceAxis {
    WestEast,
    DownUp,
    SouthNorth,
}

impl FaceAxis {
    pub const ALL: [Self; 3] = [Self::WestEast, Self::DownUp, Self::SouthNorth];

    /// Both directions along this axis.
    pub const fn directions(self) -> Direction {
        match self {
            Self::WestEast => Direction::WEST_EAST,
            Self::DownUp => Direction::DOWN_UP,
            Self::SouthNorth => Direction::SOUTH_NORTH,
        }
    }

    pub const fn negative_direction(self) -> Direction {
        Direction(self.directions().0 & Direction::NEGATIVE.0)
    }

    pub const fn positive_direction(self) -> Direction {
        Direction(self.directions().0 & Direction::POSITIVE.0)
    }
}
