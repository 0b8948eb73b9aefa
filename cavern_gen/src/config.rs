// Data-driven generation parameters.
//
// Everything that shapes a cave lives in `CaveConfig`: grid extent, number of
// rooms, how far room centers may stray from their nominal spots, whether
// passages wind, the seed, and how long one `step()` slice may run. Configs
// load from JSON (missing fields take their defaults) and are validated
// before a generator is built; the generator never mutates its config.
//
// See also: `generator.rs` which consumes the config, `room.rs` for how
// `grid_size` and `room_count` turn into a room layout, `main.rs` for the CLI
// overrides.
//
// **Critical constraint: determinism.** A config with a non-zero seed fully
// determines the generated cave. Seed 0 asks for a time-based seed, which
// the generator resolves once and reports via `CaveGenerator::seed()`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Smallest extent per axis: standing space is two cells tall, and passages
/// clamp to `[0, size - 2]`.
pub const MIN_GRID_EXTENT: u32 = 2;

/// Largest extent per axis. Coordinates are `i32`.
pub const MAX_GRID_EXTENT: u32 = i32::MAX as u32;

/// Largest total cell count. The grid stores one byte per cell and the wall
/// pool grows with the open surface, so this keeps a grid within a few
/// gigabytes at worst.
pub const MAX_GRID_CELLS: u64 = 1 << 28;

/// Largest room count. The room maze is `w × w` with `w = ceil(sqrt(n))`.
pub const MAX_ROOM_COUNT: u32 = 1 << 16;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    /// Voxel grid extent `(x, y, z)`; y is height.
    pub grid_size: (u32, u32, u32),
    pub room_count: u32,
    /// Fraction of the room size by which a room center may be jittered,
    /// within [0, 1].
    pub room_center_randomness: f32,
    /// Random-walk passages when true, straight lateral ones when false.
    pub winding_passages: bool,
    /// PRNG seed; 0 means derive one from the clock.
    pub seed: u64,
    /// Default wall-clock budget for one `step()` slice.
    pub time_slice_ms: u64,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            grid_size: (64, 8, 64),
            room_count: 4,
            room_center_randomness: 0.5,
            winding_passages: true,
            seed: 0,
            time_slice_ms: 50,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size along {axis} must be non-zero")]
    ZeroSizedAxis { axis: char },
    #[error("grid size along {axis} is {size}, need at least 2 for standing space")]
    GridTooSmall { axis: char, size: u32 },
    #[error("grid of {x}x{y}x{z} cells is too large (at most {max_cells} cells)")]
    GridTooLarge {
        x: u32,
        y: u32,
        z: u32,
        max_cells: u64,
    },
    #[error("room count must be at least 1")]
    NoRooms,
    #[error("room count {0} is too large (at most 65536)")]
    TooManyRooms(u32),
    #[error("room center randomness must be within [0, 1], got {0}")]
    RandomnessOutOfRange(f32),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CaveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (sx, sy, sz) = self.grid_size;
        for (axis, size) in [('x', sx), ('y', sy), ('z', sz)] {
            if size == 0 {
                return Err(ConfigError::ZeroSizedAxis { axis });
            }
            if size < MIN_GRID_EXTENT {
                return Err(ConfigError::GridTooSmall { axis, size });
            }
        }
        let too_large = ConfigError::GridTooLarge {
            x: sx,
            y: sy,
            z: sz,
            max_cells: MAX_GRID_CELLS,
        };
        if [sx, sy, sz].iter().any(|&size| size > MAX_GRID_EXTENT) {
            return Err(too_large);
        }
        let cells = u64::from(sx)
            .checked_mul(u64::from(sy))
            .and_then(|c| c.checked_mul(u64::from(sz)));
        if cells.is_none_or(|c| c > MAX_GRID_CELLS) {
            return Err(too_large);
        }
        if self.room_count == 0 {
            return Err(ConfigError::NoRooms);
        }
        if self.room_count > MAX_ROOM_COUNT {
            return Err(ConfigError::TooManyRooms(self.room_count));
        }
        if !(0.0..=1.0).contains(&self.room_center_randomness) {
            return Err(ConfigError::RandomnessOutOfRange(self.room_center_randomness));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn time_slice(&self) -> Duration {
        Duration::from_millis(self.time_slice_ms)
    }
}
