// Boundary faces between grid cells.
//
// A `GridWall` at `(coord, axis)` sits on the negative side of cell `coord`
// along `axis`: its positive side is `coord` itself and its negative side is
// the neighbor one step in `axis.negative_direction()`. Every face of the
// grid therefore has exactly one identity, which lets walls act as set keys.
//
// Walls whose coordinate lies on the outer boundary of a grid (component 0 or
// equal to the grid extent along the wall's axis) are "exterior": one of
// their sides is always outside the grid, so no algorithm can ever remove
// them.
//
// `WallDelta` records which faces an excavation added or removed, so callers
// that track a sub-region's boundary (a growing room's frontier) can follow
// along without rescanning the grid.

use crate::types::{FaceAxis, GridCoord};
use smallvec::SmallVec;
use std::fmt;

/// A face between two adjacent cells, identified by its positive-side cell
/// and the axis perpendicular to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridWall {
    pub coord: GridCoord,
    pub axis: FaceAxis,
}

impl GridWall {
    pub const fn new(coord: GridCoord, axis: FaceAxis) -> Self {
        Self { coord, axis }
    }

    /// The cell on the positive side of the face.
    pub fn positive_side(self) -> GridCoord {
        self.coord
    }

    /// The cell on the negative side of the face.
    pub fn negative_side(self) -> GridCoord {
        self.coord.step(self.axis.negative_direction())
    }

    /// True if this face lies on the outer boundary of a grid of the given
    /// size along its own axis.
    pub fn is_exterior(self, size: (u32, u32, u32)) -> bool {
        let (component, extent) = match self.axis {
            FaceAxis::WestEast => (self.coord.x, size.0),
            FaceAxis::DownUp => (self.coord.y, size.1),
            FaceAxis::SouthNorth => (self.coord.z, size.2),
        };
        component <= 0 || component >= extent as i32
    }

    /// The six faces surrounding a cell: for each axis, the face on the
    /// cell's negative side and the face on its positive side.
    pub fn around(coord: GridCoord) -> [Self; 6] {
        let mut walls = [Self::new(coord, FaceAxis::WestEast); 6];
        for (i, axis) in FaceAxis::ALL.into_iter().enumerate() {
            walls[i * 2] = Self::new(coord, axis);
            walls[i * 2 + 1] = Self::new(coord.step(axis.positive_direction()), axis);
        }
        walls
    }
}

impl fmt::Display for GridWall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.coord, self.axis)
    }
}

/// Walls flipped by one or more excavation calls.
///
/// One standing-space excavation touches at most 12 faces, and a wall
/// excavation two of those, so the inline capacity covers the common case.
#[derive(Clone, Debug, Default)]
pub struct WallDelta {
    pub added: SmallVec<[GridWall; 24]>,
    pub removed: SmallVec<[GridWall; 24]>,
}

impl WallDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
    }
}
