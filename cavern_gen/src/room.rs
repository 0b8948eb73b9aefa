// Room placement and organic room growth.
//
// `RoomLayout` divides the voxel grid into a coarse `w × w` room grid
// (`w = ceil(sqrt(room_count))`), one block per room. Each room's nominal
// center sits at the middle of its block on the floor (y = 0), optionally
// jittered by up to `room_center_randomness × room_size` cells per axis. Its
// cell budget is twice the volume of half a block.
//
// `RoomGrowth` grows a blob-shaped cavity from a seed cell: it keeps the
// walls bounding the region it has carved (the frontier) in a `WallPool`,
// repeatedly carves through a uniformly random frontier wall, and folds the
// resulting wall delta back into the frontier. Growth stops after the budget
// of carve attempts or when the frontier runs dry (e.g. the region is boxed in
// by exterior walls). Each `step()` is one carve attempt so the orchestrator
// can suspend between them.
//
// See also: `grid.rs` for the excavation primitives, `generator.rs` which
// grows every room in order, `wall_pool.rs` for the O(1) random pick.
//
// **Critical constraint: determinism.** All randomness comes from the
// caller's `CaveRng`; frontier order depends only on the excavation history.

use crate::grid::VoxelGrid;
use crate::prng::CaveRng;
use crate::types::GridCoord;
use crate::wall::WallDelta;
use crate::wall_pool::WallPool;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Placement of rooms on the coarse room grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomLayout {
    pub room_count: usize,
    /// Rooms per row (and number of rows) of the room grid.
    pub grid_width: usize,
    /// Voxel extent of one room-grid block.
    pub block_size: GridCoord,
    /// Nominal room extent: half a block, at least one cell per axis.
    pub room_size: GridCoord,
    grid_size: GridCoord,
}

impl RoomLayout {
    pub fn new(grid_size: (u32, u32, u32), room_count: usize) -> Self {
        let grid_width = room_grid_width(room_count);
        let w = grid_width.max(1) as i32;
        let grid_size = GridCoord::new(grid_size.0 as i32, grid_size.1 as i32, grid_size.2 as i32);
        let block_size = GridCoord::new(
            (grid_size.x / w).max(1),
            (grid_size.y / w).max(1),
            (grid_size.z / w).max(1),
        );
        let room_size = GridCoord::new(
            (block_size.x / 2).max(1),
            (block_size.y / 2).max(1),
            (block_size.z / 2).max(1),
        );
        Self {
            room_count,
            grid_width,
            block_size,
            room_size,
            grid_size,
        }
    }

    /// Maximum number of carve attempts when growing one room.
    pub fn cell_budget(&self) -> usize {
        2 * (self.room_size.x * self.room_size.y * self.room_size.z) as usize
    }

    /// Position of a room on the room grid (y is always 0).
    pub fn room_grid_coord(&self, room: usize) -> GridCoord {
        let w = self.grid_width.max(1);
        GridCoord::new((room % w) as i32, 0, (room / w) as i32)
    }

    /// The room at a room-grid position, if that position holds a room.
    pub fn room_at(&self, coord: GridCoord) -> Option<usize> {
        let w = self.grid_width as i32;
        if coord.x < 0 || coord.z < 0 || coord.y != 0 || coord.x >= w || coord.z >= w {
            return None;
        }
        let room = (coord.x + coord.z * w) as usize;
        (room < self.room_count).then_some(room)
    }

    /// Unjittered center: the middle of the room's block, on the floor.
    pub fn nominal_center(&self, room: usize) -> GridCoord {
        let cell = self.room_grid_coord(room);
        GridCoord::new(
            self.block_size.x / 2 + self.block_size.x * cell.x,
            0,
            self.block_size.z / 2 + self.block_size.z * cell.z,
        )
    }

    /// Nominal center moved by a random offset of up to `randomness ×
    /// room_size` per axis, kept inside the grid.
    pub fn randomized_center(&self, room: usize, randomness: f32, rng: &mut CaveRng) -> GridCoord {
        let center = self.nominal_center(room);
        if randomness <= 0.0 {
            return center;
        }
        let wiggle = GridCoord::new(
            (self.room_size.x as f32 * randomness) as i32,
            (self.room_size.y as f32 * randomness) as i32,
            (self.room_size.z as f32 * randomness) as i32,
        );
        let min = GridCoord::new(center.x - wiggle.x, center.y - wiggle.y, center.z - wiggle.z)
            .clamp(GridCoord::ZERO, self.grid_size);
        let max = GridCoord::new(
            center.x + wiggle.x + 1,
            center.y + wiggle.y + 1,
            center.z + wiggle.z + 1,
        )
        .clamp(GridCoord::ZERO, self.grid_size);
        GridCoord::new(
            rng.range_i32(min.x, max.x),
            rng.range_i32(min.y, max.y),
            rng.range_i32(min.z, max.z),
        )
    }
}

/// Smallest `w` with `w * w >= room_count`.
pub fn room_grid_width(room_count: usize) -> usize {
    let mut w = (room_count as f64).sqrt() as usize;
    while w * w < room_count {
        w += 1;
    }
    w
}

// ---------------------------------------------------------------------------
// Growth
// ---------------------------------------------------------------------------

/// An in-progress room growth. One `step()` is one carve attempt.
#[derive(Clone, Debug)]
pub struct RoomGrowth {
    seed: GridCoord,
    frontier: WallPool,
    delta: WallDelta,
    remaining: usize,
    grown: usize,
}

impl RoomGrowth {
    /// Open standing space at `seed` and set up the frontier.
    ///
    /// Returns `None` (with the grid untouched) if the seed is outside the
    /// grid, in which case the room cannot be grown.
    pub fn start(grid: &mut VoxelGrid, seed: GridCoord, max_cell_budget: usize) -> Option<Self> {
        let before = grid.open_cell_count();
        let mut delta = WallDelta::new();
        if !grid.try_excavate_standing_space(seed, &mut delta) {
            return None;
        }
        let mut frontier = WallPool::new();
        frontier.apply(&delta);
        delta.clear();
        Some(Self {
            seed,
            frontier,
            delta,
            remaining: max_cell_budget,
            grown: grid.open_cell_count() - before,
        })
    }

    /// Carve through one random frontier wall. Returns `true` while more
    /// growth is possible.
    pub fn step(&mut self, grid: &mut VoxelGrid, rng: &mut CaveRng) -> bool {
        if self.is_finished() {
            return false;
        }
        let Some(wall) = self.frontier.pick(rng) else {
            self.remaining = 0;
            return false;
        };
        let before = grid.open_cell_count();
        // A failed carve simply leaves the frontier as it was.
        grid.try_excavate_wall(wall, &mut self.delta);
        self.frontier.apply(&self.delta);
        self.delta.clear();
        self.grown += grid.open_cell_count() - before;
        self.remaining -= 1;
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0 || self.frontier.is_empty()
    }

    pub fn seed(&self) -> GridCoord {
        self.seed
    }

    /// Cells newly opened by this growth so far.
    pub fn grown_cells(&self) -> usize {
        self.grown
    }

    /// Walls currently bounding the grown region.
    pub fn frontier(&self) -> &WallPool {
        &self.frontier
    }
}

/// Grow a room at `seed` to completion and return the number of cells it
/// opened. Zero if the seed is outside the grid.
pub fn grow(grid: &mut VoxelGrid, rng: &mut CaveRng, seed: GridCoord, max_cell_budget: usize) -> usize {
    let Some(mut growth) = RoomGrowth::start(grid, seed, max_cell_budget) else {
        return 0;
    };
    while growth.step(grid, rng) {}
    growth.grown_cells()
}
