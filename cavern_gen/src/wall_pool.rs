// Order-preserving set of walls with O(1) random pick and removal.
//
// Walls live in a dense `Vec` with a parallel `FxHashMap` from wall to its
// slot. Removal swaps the last wall into the vacated slot and patches its
// index, so insert, remove, contains, and uniform random pick are all O(1).
// Iteration order is the slot order, which depends only on the sequence of
// inserts and removes, so it is reproducible for a fixed seed.
//
// Used for the grid's authoritative wall set (`grid.rs`), a growing room's
// frontier (`room.rs`), and the maze's wall set (`maze.rs`).

use crate::prng::CaveRng;
use crate::wall::{GridWall, WallDelta};
use rustc_hash::FxHashMap;

/// A set of walls supporting O(1) uniform random selection.
#[derive(Clone, Debug, Default)]
pub struct WallPool {
    walls: Vec<GridWall>,
    slots: FxHashMap<GridWall, usize>,
}

impl WallPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn contains(&self, wall: GridWall) -> bool {
        self.slots.contains_key(&wall)
    }

    /// Add a wall. Returns `false` if it was already present.
    pub fn insert(&mut self, wall: GridWall) -> bool {
        if self.slots.contains_key(&wall) {
            return false;
        }
        self.slots.insert(wall, self.walls.len());
        self.walls.push(wall);
        true
    }

    /// Remove a wall. Returns `false` if it was not present.
    pub fn remove(&mut self, wall: GridWall) -> bool {
        let Some(slot) = self.slots.remove(&wall) else {
            return false;
        };
        self.walls.swap_remove(slot);
        if let Some(&moved) = self.walls.get(slot) {
            self.slots.insert(moved, slot);
        }
        true
    }

    /// A uniformly random wall, left in the pool.
    pub fn pick(&self, rng: &mut CaveRng) -> Option<GridWall> {
        rng.pick_index(self.walls.len()).map(|i| self.walls[i])
    }

    /// Fold an excavation delta into the set: `(self ∪ added) \ removed`.
    pub fn apply(&mut self, delta: &WallDelta) {
        for &wall in &delta.added {
            self.insert(wall);
        }
        for &wall in &delta.removed {
            self.remove(wall);
        }
    }

    pub fn as_slice(&self) -> &[GridWall] {
        &self.walls
    }

    pub fn iter(&self) -> impl Iterator<Item = GridWall> + '_ {
        self.walls.iter().copied()
    }
}
