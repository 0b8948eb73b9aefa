// The finished cave: a read-only view of a completed generation.
//
// `Cave` owns the final voxel grid, the room-connectivity maze, the room
// layout, and the room centers, and exposes the queries consumers need:
// cell openness, floor lookup, the authoritative wall set (for mesh
// building), and room geometry. It only exists once generation is complete,
// so consumers cannot observe a half-built grid through it.
//
// `CaveSummary` is a serializable digest for logs and the CLI's `--json`
// output.
//
// See also: `generator.rs` which builds the `Cave` on completion, `grid.rs`
// for the underlying queries.

use crate::grid::VoxelGrid;
use crate::maze::ConnectivityMaze;
use crate::room::RoomLayout;
use crate::types::GridCoord;
use crate::wall::GridWall;
use serde::Serialize;

#[derive(Clone, Debug)]
pub struct Cave {
    grid: VoxelGrid,
    maze: ConnectivityMaze,
    layout: RoomLayout,
    room_centers: Vec<GridCoord>,
    seed: u64,
}

impl Cave {
    pub(crate) fn new(
        grid: VoxelGrid,
        maze: ConnectivityMaze,
        layout: RoomLayout,
        room_centers: Vec<GridCoord>,
        seed: u64,
    ) -> Self {
        Self {
            grid,
            maze,
            layout,
            room_centers,
            seed,
        }
    }

    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.grid.is_open(coord)
    }

    pub fn is_standing_space_open(&self, coord: GridCoord) -> bool {
        self.grid.is_standing_space_open(coord)
    }

    /// Lowest floor in column `(x, z)`, or `size_y` if the column is solid.
    pub fn find_floor_height(&self, x: i32, z: i32) -> i32 {
        self.grid.find_floor_height(x, z)
    }

    /// Drop from `coord` to the floor beneath it.
    pub fn find_floor(&self, coord: GridCoord) -> GridCoord {
        self.grid.find_floor(coord)
    }

    /// Every face separating an open cell from a closed one.
    pub fn walls(&self) -> &[GridWall] {
        self.grid.walls()
    }

    pub fn open_cell_count(&self) -> usize {
        self.grid.open_cell_count()
    }

    pub fn room_count(&self) -> usize {
        self.layout.room_count
    }

    /// Center chosen for a room, or `None` for an invalid index.
    pub fn room_center(&self, room: usize) -> Option<GridCoord> {
        self.room_centers.get(room).copied()
    }

    pub fn room_centers(&self) -> &[GridCoord] {
        &self.room_centers
    }

    /// Nominal room extent (half a room-grid block per axis).
    pub fn room_size(&self) -> GridCoord {
        self.layout.room_size
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn grid_size(&self) -> (u32, u32, u32) {
        self.grid.size()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// The room-connectivity maze; missing interior walls are passages.
    pub fn rooms_maze(&self) -> &ConnectivityMaze {
        &self.maze
    }

    /// The resolved seed (never 0).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn summary(&self) -> CaveSummary {
        let rooms = self
            .room_centers
            .iter()
            .enumerate()
            .map(|(index, &center)| RoomSummary {
                index,
                center,
                floor: self.grid.find_floor(center),
                open: self.grid.is_open(center),
            })
            .collect();
        let exterior_walls = self
            .walls()
            .iter()
            .filter(|wall| self.grid.is_exterior_wall(**wall))
            .count();
        CaveSummary {
            seed: self.seed,
            grid_size: self.grid_size(),
            open_cells: self.open_cell_count(),
            walls: self.walls().len(),
            exterior_walls,
            maze_connections: self.maze.connection_count(),
            rooms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaveSummary {
    pub seed: u64,
    pub grid_size: (u32, u32, u32),
    pub open_cells: usize,
    pub walls: usize,
    pub exterior_walls: usize,
    pub maze_connections: usize,
    pub rooms: Vec<RoomSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub index: usize,
    pub center: GridCoord,
    /// Floor beneath the center (the center itself if it is closed).
    pub floor: GridCoord,
    /// Whether the center cell was opened.
    pub open: bool,
}
