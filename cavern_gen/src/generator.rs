// Cave generation orchestrator: a resumable state machine.
//
// `CaveGenerator` runs the whole pipeline in four strictly sequential phases:
//
//   Idle → GrowingRooms → BuildingMaze → CarvingPassages → Complete
//
// 1. GrowingRooms: for each room in index order, pick a (jittered) center
//    from the `RoomLayout` and grow a blob-shaped room there.
// 2. BuildingMaze: run randomized Prim's over the `w × 1 × w` room grid, so
//    every room is connected to every other by exactly one chain of
//    connections.
// 3. CarvingPassages: for each room, in index order, carve a passage toward
//    its west and south neighbors wherever the maze has no wall between
//    them. Passages run floor to floor.
// 4. Complete: the grid and maze are frozen into a `Cave`, one `Completed`
//    event is emitted, and the optional completion callback fires.
//
// `step(budget)` performs discrete units of work (one room start, one
// frontier pick, one maze pick, one passage move) until the budget's step
// count or wall-clock limit runs out, then returns with all progress held in
// plain owned state. Calling it again resumes exactly where it left off, and
// the result does not depend on how the work was sliced. Dropping the
// generator abandons generation.
//
// Excavation failures (out-of-range centers, passages that hit the fail-safe)
// are absorbed: they are logged and reported in events, never returned as
// errors. The only fallible operation is `new()`, which validates the config.
//
// See also: `room.rs`, `maze.rs`, `passage.rs` for the phase algorithms,
// `cave.rs` for the finished result, `event.rs` for the narrative events.
//
// **Critical constraint: determinism.** With a fixed seed the generated cave
// is identical regardless of step budgets. The wall clock only decides when
// `step()` returns, never what the next unit of work does.

use crate::cave::Cave;
use crate::config::{CaveConfig, ConfigError};
use crate::event::GenerationEvent;
use crate::grid::VoxelGrid;
use crate::maze::ConnectivityMaze;
use crate::passage::{PassageCarver, PassageStatus};
use crate::prng::{CaveRng, resolve_seed};
use crate::room::{RoomGrowth, RoomLayout};
use crate::types::{Direction, FaceAxis, GridCoord};
use crate::wall::GridWall;
use serde::Serialize;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Public step interface
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GenerationPhase {
    Idle,
    GrowingRooms,
    BuildingMaze,
    CarvingPassages,
    Complete,
}

/// How much work one `step()` call may do. Either limit may be absent; with
/// both absent the call runs to completion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepBudget {
    pub max_steps: Option<u64>,
    /// Wall-clock limit. A time-limited call always performs at least one
    /// unit of work so progress is guaranteed.
    pub time_limit: Option<Duration>,
}

impl StepBudget {
    pub const UNLIMITED: Self = Self {
        max_steps: None,
        time_limit: None,
    };

    pub fn steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
            time_limit: None,
        }
    }

    pub fn time(limit: Duration) -> Self {
        Self {
            max_steps: None,
            time_limit: Some(limit),
        }
    }

    fn exhausted(&self, steps: u64, started: Instant) -> bool {
        self.max_steps.is_some_and(|max| steps >= max)
            || (steps > 0 && self.time_limit.is_some_and(|limit| started.elapsed() >= limit))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    InProgress,
    Finished,
}

/// The result of one `step()` call.
#[derive(Clone, Debug)]
pub struct StepResult {
    pub status: StepStatus,
    /// Units of work performed.
    pub steps: u64,
    /// Narrative events emitted during this call, in order.
    pub events: Vec<GenerationEvent>,
}

/// One-shot completion callback.
pub type CompletionCallback = Box<dyn FnOnce(&Cave)>;

// ---------------------------------------------------------------------------
// Internal state machine
// ---------------------------------------------------------------------------

/// Where the generator is, including the in-progress sub-task of the
/// current phase.
enum Work {
    Idle,
    GrowingRooms {
        room: usize,
        growth: Option<RoomGrowth>,
    },
    BuildingMaze,
    CarvingPassages {
        connection: usize,
        carver: Option<PassageCarver>,
    },
    Complete,
}

impl Work {
    fn phase(&self) -> GenerationPhase {
        match self {
            Work::Idle => GenerationPhase::Idle,
            Work::GrowingRooms { .. } => GenerationPhase::GrowingRooms,
            Work::BuildingMaze => GenerationPhase::BuildingMaze,
            Work::CarvingPassages { .. } => GenerationPhase::CarvingPassages,
            Work::Complete => GenerationPhase::Complete,
        }
    }
}

pub struct CaveGenerator {
    config: CaveConfig,
    seed: u64,
    rng: CaveRng,
    layout: RoomLayout,
    grid: VoxelGrid,
    maze: ConnectivityMaze,
    room_centers: Vec<GridCoord>,
    /// Room pairs to join with passages, filled when the maze is done.
    connections: Vec<(usize, usize)>,
    work: Work,
    cave: Option<Cave>,
    on_complete: Option<CompletionCallback>,
}

impl CaveGenerator {
    /// Validate `config` and set up an idle generator. A seed of 0 is
    /// replaced by a time-based seed, available from `seed()`.
    pub fn new(config: CaveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = resolve_seed(config.seed);
        let (sx, sy, sz) = config.grid_size;
        let room_count = config.room_count as usize;
        let layout = RoomLayout::new(config.grid_size, room_count);

        let w = layout.grid_width as u32;
        let mut maze = ConnectivityMaze::new(w, 1, w);
        for unused in room_count..layout.grid_width * layout.grid_width {
            maze.exclude_cell(layout.room_grid_coord(unused));
        }

        log::info!(
            "generating {sx}x{sy}x{sz} cave with {room_count} rooms (seed {seed}, winding passages: {})",
            config.winding_passages
        );

        Ok(Self {
            rng: CaveRng::new(seed),
            seed,
            grid: VoxelGrid::new(sx, sy, sz),
            maze,
            room_centers: Vec::with_capacity(room_count),
            connections: Vec::new(),
            layout,
            config,
            work: Work::Idle,
            cave: None,
            on_complete: None,
        })
    }

    /// Register a callback to run once, right after generation completes.
    /// Registering after completion runs it immediately. Replaces any
    /// callback registered earlier.
    pub fn on_complete(&mut self, callback: impl FnOnce(&Cave) + 'static) {
        match &self.cave {
            Some(cave) => callback(cave),
            None => self.on_complete = Some(Box::new(callback)),
        }
    }

    /// Do work until `budget` runs out or generation completes.
    pub fn step(&mut self, budget: StepBudget) -> StepResult {
        let started = Instant::now();
        let mut events = Vec::new();
        let mut steps = 0;
        while !self.is_complete() && !budget.exhausted(steps, started) {
            self.advance(&mut events);
            steps += 1;
        }
        let status = if self.is_complete() {
            StepStatus::Finished
        } else {
            StepStatus::InProgress
        };
        StepResult {
            status,
            steps,
            events,
        }
    }

    /// One time slice of the configured length (`time_slice_ms`).
    pub fn step_slice(&mut self) -> StepResult {
        self.step(StepBudget::time(self.config.time_slice()))
    }

    /// Finish generation in one call. The cave is then available from
    /// `cave()`.
    pub fn run_to_completion(&mut self) -> StepResult {
        self.step(StepBudget::UNLIMITED)
    }

    pub fn phase(&self) -> GenerationPhase {
        self.work.phase()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.work, Work::Complete)
    }

    /// Rough completion fraction in `[0, 1]` for progress display. Rooms
    /// fill the first half, passages the second.
    pub fn progress(&self) -> f32 {
        match &self.work {
            Work::Idle => 0.0,
            Work::GrowingRooms { room, .. } => 0.5 * *room as f32 / self.layout.room_count.max(1) as f32,
            Work::BuildingMaze => 0.5,
            Work::CarvingPassages { connection, .. } => {
                0.5 + 0.5 * *connection as f32 / self.connections.len().max(1) as f32
            }
            Work::Complete => 1.0,
        }
    }

    /// The finished cave, once generation is complete.
    pub fn cave(&self) -> Option<&Cave> {
        self.cave.as_ref()
    }

    pub fn into_cave(self) -> Option<Cave> {
        self.cave
    }

    /// The resolved seed (never 0).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    // -----------------------------------------------------------------------
    // Phase work
    // -----------------------------------------------------------------------

    /// Perform one unit of work.
    fn advance(&mut self, events: &mut Vec<GenerationEvent>) {
        let work = std::mem::replace(&mut self.work, Work::Complete);
        self.work = match work {
            Work::Idle => {
                self.enter_phase(GenerationPhase::GrowingRooms, events);
                Work::GrowingRooms { room: 0, growth: None }
            }
            Work::GrowingRooms { room, growth } => self.grow_room(room, growth, events),
            Work::BuildingMaze => self.build_maze(events),
            Work::CarvingPassages { connection, carver } => {
                self.carve_passage(connection, carver, events)
            }
            Work::Complete => Work::Complete,
        };
    }

    fn enter_phase(&self, phase: GenerationPhase, events: &mut Vec<GenerationEvent>) {
        log::debug!("entering phase {phase:?}");
        events.push(GenerationEvent::PhaseEntered { phase });
    }

    fn grow_room(
        &mut self,
        room: usize,
        growth: Option<RoomGrowth>,
        events: &mut Vec<GenerationEvent>,
    ) -> Work {
        let Some(mut growth) = growth else {
            let center = self.layout.randomized_center(
                room,
                self.config.room_center_randomness,
                &mut self.rng,
            );
            self.room_centers.push(center);
            return match RoomGrowth::start(&mut self.grid, center, self.layout.cell_budget()) {
                Some(growth) => Work::GrowingRooms {
                    room,
                    growth: Some(growth),
                },
                None => {
                    log::debug!("room {room} center {center} is outside the grid");
                    self.room_finished(room, center, 0, events)
                }
            };
        };
        if growth.step(&mut self.grid, &mut self.rng) {
            return Work::GrowingRooms {
                room,
                growth: Some(growth),
            };
        }
        self.room_finished(room, growth.seed(), growth.grown_cells(), events)
    }

    fn room_finished(
        &mut self,
        room: usize,
        center: GridCoord,
        cells: usize,
        events: &mut Vec<GenerationEvent>,
    ) -> Work {
        log::info!("room {room} grown at {center}: {cells} cells");
        events.push(GenerationEvent::RoomGrown {
            room,
            center,
            cells,
        });
        if room + 1 < self.layout.room_count {
            Work::GrowingRooms {
                room: room + 1,
                growth: None,
            }
        } else {
            self.enter_phase(GenerationPhase::BuildingMaze, events);
            Work::BuildingMaze
        }
    }

    fn build_maze(&mut self, events: &mut Vec<GenerationEvent>) -> Work {
        if self.maze.step(&mut self.rng) {
            return Work::BuildingMaze;
        }
        self.connections = self.connected_room_pairs();
        log::debug!(
            "room maze built: {} connections",
            self.maze.connection_count()
        );
        events.push(GenerationEvent::MazeBuilt {
            connections: self.maze.connection_count(),
        });
        self.enter_phase(GenerationPhase::CarvingPassages, events);
        Work::CarvingPassages {
            connection: 0,
            carver: None,
        }
    }

    /// Each room paired with its west and south neighbors wherever the maze
    /// left no wall between them, in room order.
    fn connected_room_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for room in 0..self.layout.room_count {
            let cell = self.layout.room_grid_coord(room);
            for (axis, direction) in [
                (FaceAxis::WestEast, Direction::WEST),
                (FaceAxis::SouthNorth, Direction::SOUTH),
            ] {
                let Some(neighbor) = self.layout.room_at(cell.step(direction)) else {
                    continue;
                };
                if !self.maze.contains(GridWall::new(cell, axis)) {
                    pairs.push((room, neighbor));
                }
            }
        }
        pairs
    }

    fn carve_passage(
        &mut self,
        connection: usize,
        carver: Option<PassageCarver>,
        events: &mut Vec<GenerationEvent>,
    ) -> Work {
        let Some(&(from_room, to_room)) = self.connections.get(connection) else {
            return self.finish(events);
        };
        let Some(mut carver) = carver else {
            let from = self.grid.find_floor(self.room_centers[from_room]);
            let to = self.grid.find_floor(self.room_centers[to_room]);
            let carver = PassageCarver::start(&mut self.grid, from, to, self.config.winding_passages);
            return Work::CarvingPassages {
                connection,
                carver: Some(carver),
            };
        };
        if carver.step(&mut self.grid, &mut self.rng) == PassageStatus::Carving {
            return Work::CarvingPassages {
                connection,
                carver: Some(carver),
            };
        }
        let outcome = carver.outcome();
        log::debug!(
            "passage {from_room} -> {to_room}: {} steps, {}",
            outcome.length,
            if outcome.arrived { "arrived" } else { "aborted" }
        );
        events.push(GenerationEvent::PassageCarved {
            from_room,
            to_room,
            length: outcome.length,
            arrived: outcome.arrived,
        });
        Work::CarvingPassages {
            connection: connection + 1,
            carver: None,
        }
    }

    /// Freeze the result, announce completion, and fire the callback.
    fn finish(&mut self, events: &mut Vec<GenerationEvent>) -> Work {
        let cave = Cave::new(
            std::mem::take(&mut self.grid),
            std::mem::take(&mut self.maze),
            self.layout.clone(),
            self.room_centers.clone(),
            self.seed,
        );
        log::info!(
            "cave complete: {} open cells, {} walls",
            cave.open_cell_count(),
            cave.walls().len()
        );
        self.enter_phase(GenerationPhase::Complete, events);
        events.push(GenerationEvent::Completed {
            open_cells: cave.open_cell_count(),
            walls: cave.walls().len(),
        });
        if let Some(callback) = self.on_complete.take() {
            callback(&cave);
        }
        self.cave = Some(cave);
        Work::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn small_config(seed: u64) -> CaveConfig {
        CaveConfig {
            grid_size: (24, 6, 24),
            room_count: 4,
            seed,
            ..CaveConfig::default()
        }
    }

    fn completed_events(events: &[GenerationEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::Completed { .. }))
            .count()
    }

    #[test]
    fn starts_idle() {
        let generator = CaveGenerator::new(small_config(1)).unwrap();
        assert_eq!(generator.phase(), GenerationPhase::Idle);
        assert!(!generator.is_complete());
        assert!(generator.cave().is_none());
        assert_eq!(generator.progress(), 0.0);
    }

    #[test]
    fn run_to_completion_produces_consistent_cave() {
        let mut generator = CaveGenerator::new(small_config(42)).unwrap();
        generator.run_to_completion();
        let cave = generator.cave().unwrap();
        assert!(cave.open_cell_count() > 0);
        assert_eq!(cave.room_count(), 4);
        assert!(cave.grid().inconsistent_walls().is_empty());
        assert_eq!(cave.rooms_maze().connection_count(), 3);
        assert!(generator.is_complete());
        assert_eq!(generator.progress(), 1.0);
    }

    #[test]
    fn phases_run_in_order() {
        let mut generator = CaveGenerator::new(small_config(5)).unwrap();
        let result = generator.step(StepBudget::UNLIMITED);
        let phases: Vec<_> = result
            .events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::PhaseEntered { phase } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                GenerationPhase::GrowingRooms,
                GenerationPhase::BuildingMaze,
                GenerationPhase::CarvingPassages,
                GenerationPhase::Complete,
            ]
        );
        assert_eq!(result.status, StepStatus::Finished);
    }

    #[test]
    fn completion_is_reported_exactly_once() {
        let mut generator = CaveGenerator::new(small_config(9)).unwrap();
        let mut completed = 0;
        loop {
            let result = generator.step(StepBudget::steps(7));
            completed += completed_events(&result.events);
            if result.status == StepStatus::Finished {
                break;
            }
        }
        let after = generator.step(StepBudget::UNLIMITED);
        assert_eq!(after.steps, 0);
        assert!(after.events.is_empty());
        assert_eq!(after.status, StepStatus::Finished);
        assert_eq!(completed, 1);
    }

    #[test]
    fn callback_fires_once() {
        let calls = Rc::new(Cell::new(0));
        let mut generator = CaveGenerator::new(small_config(3)).unwrap();
        let seen = Rc::clone(&calls);
        generator.on_complete(move |cave| {
            assert!(cave.open_cell_count() > 0);
            seen.set(seen.get() + 1);
        });
        generator.run_to_completion();
        generator.step(StepBudget::UNLIMITED);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_registered_late_runs_immediately() {
        let calls = Rc::new(Cell::new(0));
        let mut generator = CaveGenerator::new(small_config(3)).unwrap();
        generator.run_to_completion();
        let seen = Rc::clone(&calls);
        generator.on_complete(move |_| seen.set(seen.get() + 1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn slicing_does_not_change_the_result() {
        let mut whole = CaveGenerator::new(small_config(77)).unwrap();
        whole.run_to_completion();

        let mut sliced = CaveGenerator::new(small_config(77)).unwrap();
        while sliced.step(StepBudget::steps(1)).status == StepStatus::InProgress {}

        let (a, b) = (whole.cave().unwrap(), sliced.cave().unwrap());
        assert_eq!(a.grid().cells(), b.grid().cells());
        assert_eq!(a.walls(), b.walls());
        assert_eq!(a.room_centers(), b.room_centers());
    }

    #[test]
    fn step_budget_limits_work() {
        let mut generator = CaveGenerator::new(small_config(2)).unwrap();
        let result = generator.step(StepBudget::steps(0));
        assert_eq!(result.steps, 0);
        assert_eq!(generator.phase(), GenerationPhase::Idle);

        let result = generator.step(StepBudget::steps(3));
        assert_eq!(result.steps, 3);
        assert_eq!(result.status, StepStatus::InProgress);
        assert_eq!(generator.phase(), GenerationPhase::GrowingRooms);
    }

    #[test]
    fn zero_time_budget_still_makes_progress() {
        let mut generator = CaveGenerator::new(small_config(2)).unwrap();
        let result = generator.step(StepBudget::time(Duration::ZERO));
        assert_eq!(result.steps, 1);
        assert_eq!(generator.phase(), GenerationPhase::GrowingRooms);
    }

    #[test]
    fn time_sliced_generation_finishes() {
        let mut generator = CaveGenerator::new(small_config(6)).unwrap();
        let mut slices = 0;
        while generator.step_slice().status == StepStatus::InProgress {
            slices += 1;
            assert!(slices < 10_000);
        }
        assert!(generator.cave().is_some());
    }

    #[test]
    fn non_square_room_count_is_fully_connected() {
        let config = CaveConfig {
            grid_size: (30, 6, 30),
            room_count: 5,
            seed: 11,
            ..CaveConfig::default()
        };
        let mut generator = CaveGenerator::new(config).unwrap();
        let result = generator.step(StepBudget::UNLIMITED);
        let passages = result
            .events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::PassageCarved { .. }))
            .count();
        assert_eq!(passages, 4);
        assert!(result.events.contains(&GenerationEvent::MazeBuilt { connections: 4 }));
    }

    #[test]
    fn single_room_needs_no_passages() {
        let config = CaveConfig {
            grid_size: (8, 2, 8),
            room_count: 1,
            seed: 42,
            ..CaveConfig::default()
        };
        let mut generator = CaveGenerator::new(config).unwrap();
        generator.run_to_completion();
        let cave = generator.cave().unwrap();
        assert_eq!(cave.rooms_maze().connection_count(), 0);
        assert!(cave.open_cell_count() >= 2);
    }

    #[test]
    fn rooms_grow_in_index_order() {
        let mut generator = CaveGenerator::new(small_config(8)).unwrap();
        let result = generator.step(StepBudget::UNLIMITED);
        let rooms: Vec<_> = result
            .events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::RoomGrown { room, .. } => Some(*room),
                _ => None,
            })
            .collect();
        assert_eq!(rooms, vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_seed_resolves_to_nonzero() {
        let generator = CaveGenerator::new(small_config(0)).unwrap();
        assert_ne!(generator.seed(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CaveConfig {
            room_count: 0,
            ..CaveConfig::default()
        };
        assert!(matches!(CaveGenerator::new(config), Err(ConfigError::NoRooms)));
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocation() {
        let config = CaveConfig {
            grid_size: (1 << 21, 1 << 21, 1 << 21),
            ..CaveConfig::default()
        };
        assert!(matches!(
            CaveGenerator::new(config),
            Err(ConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn straight_passages_always_arrive() {
        let config = CaveConfig {
            winding_passages: false,
            room_center_randomness: 0.0,
            room_count: 9,
            ..small_config(4)
        };
        let mut generator = CaveGenerator::new(config).unwrap();
        let result = generator.run_to_completion();
        let mut passages = 0;
        for event in &result.events {
            if let GenerationEvent::PassageCarved { arrived, .. } = event {
                assert!(*arrived);
                passages += 1;
            }
        }
        assert_eq!(passages, 8);
        assert!(generator.cave().unwrap().grid().inconsistent_walls().is_empty());
    }
}
