// cavern_gen — procedural voxel cave generation.
//
// This crate carves a cave system out of a solid 3D voxel grid: blob-shaped
// rooms laid out on a coarse room grid, joined by passages along the edges
// of a random spanning tree over the rooms. It tracks every wall (face
// between an open and a closed cell) incrementally as it excavates, so the
// finished cave hands mesh builders an exact wall set without a rescan. It
// has no rendering or engine dependencies.
//
// Module overview:
// - `types.rs`:     GridCoord, Direction bitmask, FaceAxis.
// - `wall.rs`:      GridWall face identity, WallDelta excavation record.
// - `wall_pool.rs`: WallPool — wall set with O(1) random pick.
// - `grid.rs`:      VoxelGrid — open/closed cells, authoritative wall set, excavation primitives.
// - `room.rs`:      RoomLayout + RoomGrowth — room placement and organic growth.
// - `maze.rs`:      ConnectivityMaze — randomized Prim's over the room grid.
// - `passage.rs`:   PassageCarver — straight or winding floor-to-floor passages.
// - `generator.rs`: CaveGenerator — resumable phase state machine, step budgets.
// - `cave.rs`:      Cave — the finished, read-only query surface.
// - `event.rs`:     GenerationEvent — narrative events returned from `step()`.
// - `config.rs`:    CaveConfig + ConfigError — all tunable parameters.
// - `prng`:         Re-exported from `cavern_prng` — xoshiro256++ PRNG with SplitMix64 seeding.
//
// The `generate` binary (`main.rs`) drives a generator from the command
// line and prints a summary.
//
// **Critical constraint: determinism.** A cave is a pure function of its
// config: all randomness comes from one seeded `CaveRng`, wall sets iterate
// in insertion-derived order, and step budgets only decide when `step()`
// returns, never what gets carved.

pub mod cave;
pub mod config;
pub mod event;
pub mod generator;
pub mod grid;
pub mod maze;
pub mod passage;
pub use cavern_prng as prng;
pub mod room;
pub mod types;
pub mod wall;
pub mod wall_pool;

pub use cave::{Cave, CaveSummary, RoomSummary};
pub use config::{CaveConfig, ConfigError};
pub use event::GenerationEvent;
pub use generator::{CaveGenerator, GenerationPhase, StepBudget, StepResult, StepStatus};
