// Room-connectivity maze: a randomized Prim's spanning tree over a small grid.
//
// The maze runs on the coarse room grid (`w × 1 × w`, one cell per room). It
// starts from a random cell, keeps a frontier of the interior walls bounding
// the visited region, and repeatedly removes a random frontier wall. If that
// opens a cell on either side, the wall is dropped from the maze (a
// connection); otherwise it stays as a wall between two visited cells. When
// the frontier is empty every reachable cell has been visited exactly once,
// so the removed walls form a spanning tree and the remaining walls are
// exactly the non-connections.
//
// Room-grid positions past `room_count` (the unused tail of the last row) are
// excluded up front: they start out visited and never get walls toward them,
// so the spanning tree covers exactly the real rooms. Each `step()` processes
// one frontier wall so the orchestrator can suspend mid-maze.
//
// See also: `generator.rs`, which turns the maze's missing walls into
// passages between room centers; `wall.rs` for the face identity scheme.
//
// **Critical constraint: determinism.** Frontier picks go through `CaveRng`
// only, and frontier order depends only on prior picks.

use crate::prng::CaveRng;
use crate::types::GridCoord;
use crate::wall::GridWall;
use crate::wall_pool::WallPool;

#[derive(Clone, Debug, Default)]
pub struct ConnectivityMaze {
    size_x: u32,
    size_y: u32,
    size_z: u32,
    visited: Vec<bool>,
    walls: WallPool,
    frontier: Vec<GridWall>,
    connections: usize,
    started: bool,
}

impl ConnectivityMaze {
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        let total = size_x as usize * size_y as usize * size_z as usize;
        Self {
            size_x,
            size_y,
            size_z,
            visited: vec![false; total],
            ..Self::default()
        }
    }

    pub fn size(&self) -> (u32, u32, u32) {
        (self.size_x, self.size_y, self.size_z)
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        let in_range = coord.x >= 0
            && coord.y >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.size_x
            && (coord.y as u32) < self.size_y
            && (coord.z as u32) < self.size_z;
        in_range.then(|| {
            let (sx, sz) = (self.size_x as usize, self.size_z as usize);
            coord.x as usize + coord.z as usize * sx + coord.y as usize * sx * sz
        })
    }

    /// True if the cell has been visited (or excluded). Out-of-range cells
    /// are closed.
    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.index(coord).is_some_and(|i| self.visited[i])
    }

    /// Leave a cell out of the spanning tree. Only meaningful before the
    /// first `step()`; returns `false` if the cell is out of range or already
    /// open.
    pub fn exclude_cell(&mut self, coord: GridCoord) -> bool {
        if self.started {
            return false;
        }
        match self.index(coord) {
            Some(i) if !self.visited[i] => {
                self.visited[i] = true;
                true
            }
            _ => false,
        }
    }

    /// Visit a cell and wall it off from every neighbor not yet visited.
    fn visit(&mut self, coord: GridCoord) -> bool {
        let Some(i) = self.index(coord) else {
            return false;
        };
        if self.visited[i] {
            return false;
        }
        self.visited[i] = true;
        for wall in GridWall::around(coord) {
            let other = if wall.positive_side() == coord {
                wall.negative_side()
            } else {
                wall.positive_side()
            };
            if self.is_open(other) {
                continue;
            }
            self.walls.insert(wall);
            if !self.is_exterior_wall(wall) {
                self.frontier.push(wall);
            }
        }
        true
    }

    /// Visit a random non-excluded cell. Does nothing if every cell is
    /// excluded or the maze is empty.
    pub fn start(&mut self, rng: &mut CaveRng) {
        if self.started {
            return;
        }
        self.started = true;
        let candidates: Vec<usize> = (0..self.visited.len()).filter(|&i| !self.visited[i]).collect();
        if let Some(pick) = rng.pick_index(candidates.len()) {
            let coord = self.coord_of(candidates[pick]);
            self.visit(coord);
        }
    }

    fn coord_of(&self, index: usize) -> GridCoord {
        let (sx, sz) = (self.size_x as usize, self.size_z as usize);
        GridCoord::new(
            (index % sx) as i32,
            (index / (sx * sz)) as i32,
            ((index / sx) % sz) as i32,
        )
    }

    /// Process one frontier wall (or start the maze on the first call).
    /// Returns `true` while frontier walls remain.
    pub fn step(&mut self, rng: &mut CaveRng) -> bool {
        if !self.started {
            self.start(rng);
            return !self.frontier.is_empty();
        }
        let Some(pick) = rng.pick_index(self.frontier.len()) else {
            return false;
        };
        let wall = self.frontier.swap_remove(pick);
        let opened_positive = self.visit(wall.positive_side());
        let opened_negative = self.visit(wall.negative_side());
        if opened_positive || opened_negative {
            self.walls.remove(wall);
            self.connections += 1;
        }
        !self.frontier.is_empty()
    }

    /// Run the maze to completion.
    pub fn generate(&mut self, rng: &mut CaveRng) {
        while self.step(rng) {}
    }

    pub fn is_finished(&self) -> bool {
        self.started && self.frontier.is_empty()
    }

    /// True if the wall separates two cells (i.e. they are not connected).
    pub fn contains(&self, wall: GridWall) -> bool {
        self.walls.contains(wall)
    }

    pub fn walls(&self) -> &[GridWall] {
        self.walls.as_slice()
    }

    /// Number of walls removed so far: the edges of the spanning tree.
    pub fn connection_count(&self) -> usize {
        self.connections
    }

    pub fn is_exterior_wall(&self, wall: GridWall) -> bool {
        wall.is_exterior(self.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, FaceAxis};

    fn generated(n: u32, seed: u64) -> ConnectivityMaze {
        let mut maze = ConnectivityMaze::new(n, 1, n);
        let mut rng = CaveRng::new(seed);
        maze.generate(&mut rng);
        maze
    }

    /// Cells reachable from the origin through missing walls.
    fn reachable(maze: &ConnectivityMaze, from: GridCoord) -> usize {
        let mut seen = vec![from];
        let mut stack = vec![from];
        while let Some(c) = stack.pop() {
            for wall in GridWall::around(c) {
                if maze.contains(wall) || maze.is_exterior_wall(wall) {
                    continue;
                }
                let other = if wall.positive_side() == c {
                    wall.negative_side()
                } else {
                    wall.positive_side()
                };
                if maze.is_open(other) && !seen.contains(&other) {
                    seen.push(other);
                    stack.push(other);
                }
            }
        }
        seen.len()
    }

    #[test]
    fn spanning_tree_has_n_squared_minus_one_connections() {
        for (n, seed) in [(1, 1), (2, 2), (3, 3), (5, 4), (8, 5)] {
            let maze = generated(n, seed);
            assert!(maze.is_finished());
            assert_eq!(maze.connection_count(), (n * n - 1) as usize, "n = {n}");
        }
    }

    #[test]
    fn every_cell_is_reachable() {
        let maze = generated(6, 17);
        assert_eq!(reachable(&maze, GridCoord::ZERO), 36);
    }

    #[test]
    fn interior_walls_are_non_tree_edges() {
        // 2(n-1)n interior faces in an n x 1 x n grid, n^2 - 1 of them removed.
        let n = 4;
        let maze = generated(n, 21);
        let interior = maze.walls().iter().filter(|w| !maze.is_exterior_wall(**w)).count();
        let total = (2 * (n - 1) * n) as usize;
        assert_eq!(interior, total - maze.connection_count());
    }

    #[test]
    fn single_cell_maze_finishes_immediately() {
        let mut maze = ConnectivityMaze::new(1, 1, 1);
        let mut rng = CaveRng::new(1);
        assert!(!maze.step(&mut rng));
        assert!(maze.is_finished());
        assert_eq!(maze.connection_count(), 0);
        assert!(maze.is_open(GridCoord::ZERO));
        assert_eq!(maze.walls().len(), 6);
    }

    #[test]
    fn excluded_cells_stay_out_of_the_tree() {
        // Five rooms on a 3x3 room grid: cells 5..9 are excluded.
        let mut maze = ConnectivityMaze::new(3, 1, 3);
        for i in 5..9 {
            let coord = GridCoord::new(i % 3, 0, i / 3);
            assert!(maze.exclude_cell(coord));
        }
        assert!(!maze.exclude_cell(GridCoord::new(2, 0, 2)));
        let mut rng = CaveRng::new(8);
        maze.generate(&mut rng);
        assert_eq!(maze.connection_count(), 4);
        // Excluded cells carry no walls, so the walk passes through them too.
        assert_eq!(reachable(&maze, GridCoord::ZERO), 9);
        // No wall ever faces an excluded cell from a real one.
        let toward_excluded = GridWall::new(GridCoord::new(2, 0, 1), FaceAxis::WestEast);
        assert!(!maze.contains(toward_excluded));
    }

    #[test]
    fn exclusion_after_start_is_refused() {
        let mut maze = ConnectivityMaze::new(2, 1, 2);
        let mut rng = CaveRng::new(2);
        maze.step(&mut rng);
        assert!(!maze.exclude_cell(GridCoord::new(1, 0, 1)));
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generated(7, 99);
        let b = generated(7, 99);
        assert_eq!(a.walls(), b.walls());
    }

    #[test]
    fn three_dimensional_maze_spans_all_cells() {
        let mut maze = ConnectivityMaze::new(3, 3, 3);
        let mut rng = CaveRng::new(4);
        maze.generate(&mut rng);
        assert_eq!(maze.connection_count(), 26);
        assert_eq!(reachable(&maze, GridCoord::new(1, 1, 1)), 27);
        assert!(maze.is_open(GridCoord::ZERO.step(Direction::UP)));
    }
}
