// Dense 3D open/closed cell grid plus the authoritative wall set.
//
// Cells are stored as a flat `Vec<bool>` indexed by
// `x + z * size_x + y * size_x * size_z`, giving O(1) read/write access.
// `true` is open (walkable), `false` is closed (solid). Out-of-bounds reads
// return closed, so the grid behaves as if surrounded by solid rock.
//
// The wall set holds exactly the faces with one open and one closed side.
// `try_excavate_cell()` is the only place cell state changes, and it
// re-derives the six faces around the cell from neighbor openness, so the
// invariant holds after every call without any global recomputation. The
// standing-space and wall excavations are built on top of it.
//
// See also: `wall.rs` for `GridWall`/`WallDelta`, `room.rs` and `passage.rs`
// which drive the excavation primitives, `cave.rs` which freezes the grid
// once generation finishes.
//
// **Critical constraint: single writer.** Excavation assumes exclusive,
// sequential access; the grid is never shared mutably.

use crate::types::{Direction, GridCoord};
use crate::wall::{GridWall, WallDelta};
use crate::wall_pool::WallPool;

/// Dense open/closed cell grid with its boundary walls.
#[derive(Clone, Debug, Default)]
pub struct VoxelGrid {
    /// Flat storage: index = x + z * size_x + y * size_x * size_z.
    cells: Vec<bool>,
    walls: WallPool,
    open_cells: usize,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
}

impl VoxelGrid {
    /// Create a grid with every cell closed and no walls.
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = (size_x as usize) * (size_y as usize) * (size_z as usize);
        Self {
            cells: vec![false; total],
            walls: WallPool::new(),
            open_cells: 0,
            size_x,
            size_y,
            size_z,
        }
    }

    pub fn size(&self) -> (u32, u32, u32) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Check whether a coordinate is within bounds.
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.size_x
            && (coord.y as u32) < self.size_y
            && (coord.z as u32) < self.size_z
    }

    /// Convert a coordinate to a flat index. Returns `None` if out of bounds.
    fn index(&self, coord: GridCoord) -> Option<usize> {
        if self.in_bounds(coord) {
            let x = coord.x as usize;
            let y = coord.y as usize;
            let z = coord.z as usize;
            let sx = self.size_x as usize;
            let sz = self.size_z as usize;
            Some(x + z * sx + y * sx * sz)
        } else {
            None
        }
    }

    /// Whether a cell is open. Always `false` outside the grid.
    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.index(coord).is_some_and(|i| self.cells[i])
    }

    /// Whether a character two cells tall fits at `coord`.
    pub fn is_standing_space_open(&self, coord: GridCoord) -> bool {
        self.is_open(coord) && self.is_open(coord.step(Direction::UP))
    }

    /// Number of open cells.
    pub fn open_cell_count(&self) -> usize {
        self.open_cells
    }

    /// The raw cell array, in storage order.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// All boundary walls. Order is reproducible but otherwise meaningless.
    pub fn walls(&self) -> &[GridWall] {
        self.walls.as_slice()
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn contains_wall(&self, wall: GridWall) -> bool {
        self.walls.contains(wall)
    }

    /// Whether a wall lies on the grid's outer boundary.
    pub fn is_exterior_wall(&self, wall: GridWall) -> bool {
        wall.is_exterior(self.size())
    }

    /// Whether a wall should exist given current cell state: exactly one side
    /// open.
    pub fn wall_expected(&self, wall: GridWall) -> bool {
        self.is_open(wall.positive_side()) != self.is_open(wall.negative_side())
    }

    /// Open a single cell and bring its six faces up to date.
    ///
    /// Returns `false` without touching anything if `coord` is outside the
    /// grid. Opening an already-open cell succeeds and changes nothing. Every
    /// wall that appears or disappears is recorded in `delta`.
    pub fn try_excavate_cell(&mut self, coord: GridCoord, delta: &mut WallDelta) -> bool {
        let Some(i) = self.index(coord) else {
            return false;
        };
        if !self.cells[i] {
            self.cells[i] = true;
            self.open_cells += 1;
        }

        for wall in GridWall::around(coord) {
            let expected = self.wall_expected(wall);
            if expected == self.walls.contains(wall) {
                continue;
            }
            if expected {
                self.walls.insert(wall);
                delta.added.push(wall);
            } else {
                self.walls.remove(wall);
                delta.removed.push(wall);
            }
        }
        true
    }

    /// Open `coord` and the cell above it.
    ///
    /// Fails only if `coord` itself is out of range; the upper cell is
    /// allowed to fail (e.g. at the grid ceiling).
    pub fn try_excavate_standing_space(&mut self, coord: GridCoord, delta: &mut WallDelta) -> bool {
        if !self.try_excavate_cell(coord, delta) {
            return false;
        }
        self.try_excavate_cell(coord.step(Direction::UP), delta);
        true
    }

    /// Carve through a wall by opening standing space on both of its sides.
    /// Succeeds if either side could be excavated.
    pub fn try_excavate_wall(&mut self, wall: GridWall, delta: &mut WallDelta) -> bool {
        let positive = self.try_excavate_standing_space(wall.positive_side(), delta);
        let negative = self.try_excavate_standing_space(wall.negative_side(), delta);
        positive || negative
    }

    /// Drop from `coord` to the lowest open cell reachable straight down
    /// without leaving open space.
    pub fn find_floor(&self, coord: GridCoord) -> GridCoord {
        let mut floor = coord;
        let mut below = floor.step(Direction::DOWN);
        while self.is_open(below) {
            floor = below;
            below = below.step(Direction::DOWN);
        }
        floor
    }

    /// Height of the lowest floor in column `(x, z)`: the first open cell
    /// scanning up from y = 0. Returns `size_y` if the column is solid or
    /// outside the grid.
    pub fn find_floor_height(&self, x: i32, z: i32) -> i32 {
        (0..self.size_y as i32)
            .find(|&y| self.is_open(GridCoord::new(x, y, z)))
            .unwrap_or(self.size_y as i32)
    }

    /// Every face whose presence disagrees with the cell state. Empty when the
    /// grid is consistent. Exhaustive, so meant for tests and debugging.
    pub fn inconsistent_walls(&self) -> Vec<GridWall> {
        let mut bad: Vec<GridWall> = self
            .walls
            .iter()
            .filter(|&wall| !self.wall_expected(wall))
            .collect();
        for y in 0..=self.size_y as i32 {
            for z in 0..=self.size_z as i32 {
                for x in 0..=self.size_x as i32 {
                    for wall in GridWall::around(GridCoord::new(x, y, z)).into_iter().step_by(2) {
                        if self.wall_expected(wall) && !self.walls.contains(wall) {
                            bad.push(wall);
                        }
                    }
                }
            }
        }
        bad
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FaceAxis;

    fn excavate(grid: &mut VoxelGrid, coord: GridCoord) -> bool {
        grid.try_excavate_cell(coord, &mut WallDelta::new())
    }

    #[test]
    fn new_grid_is_all_closed() {
        let grid = VoxelGrid::new(4, 4, 4);
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    assert!(!grid.is_open(GridCoord::new(x, y, z)));
                }
            }
        }
        assert_eq!(grid.wall_count(), 0);
        assert_eq!(grid.open_cell_count(), 0);
    }

    #[test]
    fn out_of_bounds_is_closed() {
        let grid = VoxelGrid::new(4, 4, 4);
        assert!(!grid.is_open(GridCoord::new(-1, 0, 0)));
        assert!(!grid.is_open(GridCoord::new(0, 4, 0)));
        assert!(!grid.is_open(GridCoord::new(100, 100, 100)));
    }

    #[test]
    fn out_of_bounds_excavation_fails_without_mutation() {
        let mut grid = VoxelGrid::new(4, 4, 4);
        let mut delta = WallDelta::new();
        assert!(!grid.try_excavate_cell(GridCoord::new(4, 0, 0), &mut delta));
        assert!(!grid.try_excavate_standing_space(GridCoord::new(0, -1, 0), &mut delta));
        assert!(delta.is_empty());
        assert_eq!(grid.open_cell_count(), 0);
        assert_eq!(grid.wall_count(), 0);
    }

    #[test]
    fn single_open_cell_has_six_walls() {
        let mut grid = VoxelGrid::new(4, 4, 4);
        let mut delta = WallDelta::new();
        assert!(grid.try_excavate_cell(GridCoord::new(1, 1, 1), &mut delta));
        assert_eq!(delta.added.len(), 6);
        assert!(delta.removed.is_empty());
        assert_eq!(grid.wall_count(), 6);
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn adjacent_cells_share_no_wall() {
        let mut grid = VoxelGrid::new(4, 4, 4);
        excavate(&mut grid, GridCoord::new(1, 1, 1));
        let mut delta = WallDelta::new();
        excavate(&mut grid, GridCoord::new(2, 1, 1));
        grid.try_excavate_cell(GridCoord::new(2, 1, 1), &mut delta);
        assert!(delta.is_empty(), "re-excavating changes nothing");
        // Two cells side by side: 2 * 6 - 2 shared faces.
        assert_eq!(grid.wall_count(), 10);
        assert!(!grid.contains_wall(GridWall::new(GridCoord::new(2, 1, 1), FaceAxis::WestEast)));
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn excavation_reports_removed_walls() {
        let mut grid = VoxelGrid::new(4, 4, 4);
        excavate(&mut grid, GridCoord::new(1, 1, 1));
        let mut delta = WallDelta::new();
        grid.try_excavate_cell(GridCoord::new(1, 2, 1), &mut delta);
        assert_eq!(delta.removed.as_slice(), &[GridWall::new(GridCoord::new(1, 2, 1), FaceAxis::DownUp)]);
        assert_eq!(delta.added.len(), 5);
    }

    #[test]
    fn excavation_is_idempotent() {
        let mut once = VoxelGrid::new(5, 3, 5);
        let mut twice = VoxelGrid::new(5, 3, 5);
        let c = GridCoord::new(2, 1, 2);
        excavate(&mut once, c);
        excavate(&mut twice, c);
        excavate(&mut twice, c);
        assert_eq!(once.cells(), twice.cells());
        let mut a = once.walls().to_vec();
        let mut b = twice.walls().to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn boundary_cell_keeps_exterior_walls() {
        let mut grid = VoxelGrid::new(3, 2, 3);
        excavate(&mut grid, GridCoord::ZERO);
        let exterior: Vec<_> = grid
            .walls()
            .iter()
            .filter(|w| grid.is_exterior_wall(**w))
            .collect();
        // West, down and south faces of the corner cell.
        assert_eq!(exterior.len(), 3);
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn standing_space_tolerates_ceiling() {
        let mut grid = VoxelGrid::new(4, 2, 4);
        let mut delta = WallDelta::new();
        assert!(grid.try_excavate_standing_space(GridCoord::new(1, 1, 1), &mut delta));
        assert!(grid.is_open(GridCoord::new(1, 1, 1)));
        assert!(!grid.is_standing_space_open(GridCoord::new(1, 1, 1)));
        assert!(grid.try_excavate_standing_space(GridCoord::new(1, 0, 1), &mut delta));
        assert!(grid.is_standing_space_open(GridCoord::new(1, 0, 1)));
        assert_eq!(grid.open_cell_count(), 2);
    }

    #[test]
    fn wall_excavation_opens_both_sides() {
        let mut grid = VoxelGrid::new(4, 3, 4);
        let wall = GridWall::new(GridCoord::new(2, 0, 1), FaceAxis::WestEast);
        assert!(grid.try_excavate_wall(wall, &mut WallDelta::new()));
        assert!(grid.is_standing_space_open(GridCoord::new(2, 0, 1)));
        assert!(grid.is_standing_space_open(GridCoord::new(1, 0, 1)));
        assert!(!grid.contains_wall(wall));
        assert!(grid.inconsistent_walls().is_empty());
    }

    #[test]
    fn exterior_wall_excavation_succeeds_on_one_side() {
        let mut grid = VoxelGrid::new(4, 3, 4);
        let wall = GridWall::new(GridCoord::new(0, 0, 1), FaceAxis::WestEast);
        assert!(grid.try_excavate_wall(wall, &mut WallDelta::new()));
        // The outside can never open, so the exterior face stays.
        assert!(grid.contains_wall(wall));
    }

    #[test]
    fn find_floor_drops_through_open_cells() {
        let mut grid = VoxelGrid::new(3, 6, 3);
        for y in 1..5 {
            excavate(&mut grid, GridCoord::new(1, y, 1));
        }
        assert_eq!(grid.find_floor(GridCoord::new(1, 4, 1)), GridCoord::new(1, 1, 1));
        // A closed start cell with closed below stays put.
        assert_eq!(grid.find_floor(GridCoord::new(0, 3, 0)), GridCoord::new(0, 3, 0));
    }

    #[test]
    fn find_floor_height_scans_up_from_bottom() {
        let mut grid = VoxelGrid::new(3, 6, 3);
        excavate(&mut grid, GridCoord::new(1, 2, 1));
        excavate(&mut grid, GridCoord::new(1, 3, 1));
        assert_eq!(grid.find_floor_height(1, 1), 2);
        assert_eq!(grid.find_floor_height(0, 0), 6);
        assert_eq!(grid.find_floor_height(-5, 0), 6);
    }

    #[test]
    fn indexing_is_correct() {
        let mut grid = VoxelGrid::new(10, 8, 6);
        let coord = GridCoord::new(5, 3, 4);
        excavate(&mut grid, coord);
        assert!(grid.is_open(coord));
        assert!(!grid.is_open(GridCoord::new(4, 3, 4)));
        assert!(!grid.is_open(GridCoord::new(5, 2, 4)));
        assert!(!grid.is_open(GridCoord::new(5, 3, 3)));
        let i = 5 + 4 * 10 + 3 * 10 * 6;
        assert!(grid.cells()[i]);
    }
}
