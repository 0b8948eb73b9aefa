// Generation events returned from `CaveGenerator::step()`.
//
// Events narrate what the generator did during a step: phase changes, each
// finished room, the finished maze, each finished passage, and completion.
// They are informational only (progress bars, logs, the CLI's `--json`
// output); nothing in the generator reads them back.
//
// See also: `generator.rs` which emits them, `main.rs` which prints them.
//
// **Critical constraint: exactly one `Completed`.** It is emitted on the
// step that finishes passage carving and never again, even if `step()` is
// called after completion.

use crate::generator::GenerationPhase;
use crate::types::GridCoord;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum GenerationEvent {
    /// The generator moved to a new phase.
    PhaseEntered { phase: GenerationPhase },
    /// A room finished growing. `cells` is zero if its center was outside
    /// the grid.
    RoomGrown {
        room: usize,
        center: GridCoord,
        cells: usize,
    },
    /// The room-connectivity maze is complete.
    MazeBuilt { connections: usize },
    /// A passage between two connected rooms finished.
    PassageCarved {
        from_room: usize,
        to_room: usize,
        length: usize,
        arrived: bool,
    },
    /// Generation finished; the cave is ready to query.
    Completed { open_cells: usize, walls: usize },
}
