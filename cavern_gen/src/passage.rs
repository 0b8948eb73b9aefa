// Passage carving between two room floors.
//
// A passage is a walk from one floor cell toward a target, opening standing
// space at every visited cell, until the walk reaches the target's column
// (same x and z, any height). Two walk styles:
//
// - Straight: each step moves one cell along the lateral axis with the
//   larger remaining distance (ties prefer x), so the passage stays at the
//   starting height.
// - Winding: each step moves in a random direction drawn from every face
//   except the one pointing directly away from the target. Up is dropped
//   when the cell below is open (no climbing out of an open floor), and down
//   is dropped when the cell two above is open (no digging under an existing
//   passage). If that leaves nothing, the walk takes the single best
//   direction toward the target.
//
// Positions are clamped to `[0, size - 2]` per axis so standing space always
// fits. The target is clamped the same way, otherwise a target on the
// outermost column could never be reached. A fail-safe of
// `10 × (size_x + size_y + size_z)` steps bounds every walk; hitting it
// aborts the passage with a warning, leaving whatever was already carved.
//
// See also: `grid.rs` for `try_excavate_standing_space`, `generator.rs` which
// carves one passage per maze connection.
//
// **Critical constraint: determinism.** Winding steps draw from `CaveRng`
// only; straight passages consume no randomness at all.

use crate::grid::VoxelGrid;
use crate::prng::CaveRng;
use crate::types::{Direction, GridCoord};
use crate::wall::WallDelta;

/// Where a passage walk stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassageStatus {
    Carving,
    /// Reached the target column.
    Arrived,
    /// Gave up after the fail-safe number of steps.
    Aborted,
}

/// Summary of a finished passage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassageOutcome {
    /// Number of steps taken.
    pub length: usize,
    pub arrived: bool,
}

/// An in-progress passage. One `step()` moves the walk by one cell.
#[derive(Clone, Debug)]
pub struct PassageCarver {
    current: GridCoord,
    target: GridCoord,
    winding: bool,
    length: usize,
    fail_safe: usize,
    max_coord: GridCoord,
    status: PassageStatus,
    delta: WallDelta,
}

/// Step bound for any passage in a grid of the given size.
pub fn fail_safe_steps(size: (u32, u32, u32)) -> usize {
    10 * (size.0 as usize + size.1 as usize + size.2 as usize)
}

impl PassageCarver {
    /// Open standing space at `from` and prepare a walk toward `to`.
    pub fn start(grid: &mut VoxelGrid, from: GridCoord, to: GridCoord, winding: bool) -> Self {
        let (sx, sy, sz) = grid.size();
        let max_coord = GridCoord::new(sx as i32 - 2, sy as i32 - 2, sz as i32 - 2);
        let mut delta = WallDelta::new();
        grid.try_excavate_standing_space(from, &mut delta);
        delta.clear();
        let mut carver = Self {
            current: from,
            target: to.clamp(GridCoord::ZERO, max_coord),
            winding,
            length: 0,
            fail_safe: fail_safe_steps(grid.size()),
            max_coord,
            status: PassageStatus::Carving,
            delta,
        };
        if carver.current.same_column(carver.target) {
            carver.status = PassageStatus::Arrived;
        }
        carver
    }

    /// Advance the walk by one cell.
    pub fn step(&mut self, grid: &mut VoxelGrid, rng: &mut CaveRng) -> PassageStatus {
        if self.status != PassageStatus::Carving {
            return self.status;
        }
        if self.length >= self.fail_safe {
            log::warn!(
                "passage from {} toward {} aborted after {} steps",
                self.current,
                self.target,
                self.length
            );
            self.status = PassageStatus::Aborted;
            return self.status;
        }

        let next = if self.winding {
            let allowed = winding_directions(grid, self.current);
            random_step_towards(self.current, self.target, allowed, rng)
        } else {
            self.current.step(self.current.lateral_direction_towards(self.target))
        };
        self.current = next.clamp(GridCoord::ZERO, self.max_coord);
        grid.try_excavate_standing_space(self.current, &mut self.delta);
        self.delta.clear();
        self.length += 1;

        if self.current.same_column(self.target) {
            self.status = PassageStatus::Arrived;
        }
        self.status
    }

    pub fn status(&self) -> PassageStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != PassageStatus::Carving
    }

    pub fn current(&self) -> GridCoord {
        self.current
    }

    pub fn target(&self) -> GridCoord {
        self.target
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn fail_safe(&self) -> usize {
        self.fail_safe
    }

    pub fn outcome(&self) -> PassageOutcome {
        PassageOutcome {
            length: self.length,
            arrived: self.status == PassageStatus::Arrived,
        }
    }
}

/// Carve a whole passage from `from` toward `to`.
pub fn carve_passage(
    grid: &mut VoxelGrid,
    rng: &mut CaveRng,
    from: GridCoord,
    to: GridCoord,
    winding: bool,
) -> PassageOutcome {
    let mut carver = PassageCarver::start(grid, from, to, winding);
    while carver.step(grid, rng) == PassageStatus::Carving {}
    carver.outcome()
}

/// Directions a winding walk may take from `coord`.
pub fn winding_directions(grid: &VoxelGrid, coord: GridCoord) -> Direction {
    let mut allowed = Direction::ALL;
    if grid.is_open(coord.step(Direction::DOWN)) {
        allowed &= !Direction::UP;
    }
    if grid.is_open(coord.step_by(Direction::UP, 2)) {
        allowed &= !Direction::DOWN;
    }
    allowed
}

/// One step in a random allowed direction, preferring not to move directly
/// away from `target`. When the only allowed direction is away, takes it;
/// when nothing is allowed, stays at `coord`.
pub fn random_step_towards(
    coord: GridCoord,
    target: GridCoord,
    allowed: Direction,
    rng: &mut CaveRng,
) -> GridCoord {
    let best = coord.direction_towards(target);
    let candidates = allowed & !best.opposite();
    random_orthogonal_step(coord, candidates, rng)
        .or_else(|| random_orthogonal_step(coord, allowed, rng))
        .unwrap_or(coord)
}

/// One step in a uniformly random direction from `allowed`, or `None` if
/// `allowed` is empty.
pub fn random_orthogonal_step(
    coord: GridCoord,
    allowed: Direction,
    rng: &mut CaveRng,
) -> Option<GridCoord> {
    let pick = rng.pick_index(allowed.count() as usize)?;
    allowed.iter().nth(pick).map(|direction| coord.step(direction))
}
