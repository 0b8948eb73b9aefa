// Cave generator CLI entry point.
//
// Builds a `CaveConfig` (from a JSON file and/or flags), runs the generator
// in time slices the way an interactive host would, prints progress per
// slice, and finishes with a summary of the cave: open cells, walls, maze
// connections, and each room's center and floor.
//
// Usage:
//   cargo run -p cavern_gen --bin generate -- [--config cave.json] [--seed N]
//     [--size 64x8x64] [--rooms N] [--randomness R] [--straight] [--json]
//
// Set `RUST_LOG=debug` to see phase changes and individual passages.

use cavern_gen::{CaveConfig, CaveGenerator, CaveSummary, GenerationEvent, StepStatus};
use clap::Parser as _;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, clap::Parser)]
#[command(name = "generate", about = "Carve a procedural voxel cave and summarize it")]
struct GenerateArgs {
    /// JSON config file; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// PRNG seed. 0 picks a time-based seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Grid extent as XxYxZ, e.g. "64x8x64". Y is height.
    #[arg(long, value_parser = parse_grid_size)]
    size: Option<(u32, u32, u32)>,

    /// Number of rooms.
    #[arg(long)]
    rooms: Option<u32>,

    /// Room center randomness in [0, 1].
    #[arg(long)]
    randomness: Option<f32>,

    /// Carve straight lateral passages instead of winding ones.
    #[arg(long)]
    straight: bool,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn parse_grid_size(s: &str) -> Result<(u32, u32, u32), String> {
    let parts: Vec<&str> = s.split(['x', 'X']).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected XxYxZ, got {s:?}"));
    };
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("bad extent {part:?} in {s:?}: {e}"))
    };
    Ok((parse(*x)?, parse(*y)?, parse(*z)?))
}

fn build_config(args: &GenerateArgs) -> Result<CaveConfig, cavern_gen::ConfigError> {
    let mut config = match &args.config {
        Some(path) => CaveConfig::load(path)?,
        None => CaveConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(size) = args.size {
        config.grid_size = size;
    }
    if let Some(rooms) = args.rooms {
        config.room_count = rooms;
    }
    if let Some(randomness) = args.randomness {
        config.room_center_randomness = randomness;
    }
    if args.straight {
        config.winding_passages = false;
    }
    config.validate()?;
    Ok(config)
}

fn print_summary(summary: &CaveSummary) {
    let (sx, sy, sz) = summary.grid_size;
    println!("Seed: {}", summary.seed);
    println!("Grid: {sx}x{sy}x{sz}");
    println!("Open cells: {}", summary.open_cells);
    println!("Walls: {} ({} exterior)", summary.walls, summary.exterior_walls);
    println!("Maze connections: {}", summary.maze_connections);
    for room in &summary.rooms {
        println!(
            "  room {:>2}: center {} floor {}{}",
            room.index,
            room.center,
            room.floor,
            if room.open { "" } else { " (not grown)" }
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = GenerateArgs::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    let mut generator = match CaveGenerator::new(config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    generator.on_complete(|cave| log::info!("cave ready (seed {})", cave.seed()));

    let mut passages_aborted = 0;
    loop {
        let result = generator.step_slice();
        for event in &result.events {
            if let GenerationEvent::PassageCarved { arrived: false, .. } = event {
                passages_aborted += 1;
            }
        }
        if !args.json {
            println!(
                "[{:>3.0}%] {:?} ({} steps)",
                generator.progress() * 100.0,
                generator.phase(),
                result.steps
            );
        }
        if result.status == StepStatus::Finished {
            break;
        }
    }

    let Some(cave) = generator.cave() else {
        eprintln!("error: generation stopped without a cave");
        return ExitCode::FAILURE;
    };
    let summary = cave.summary();
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!();
        print_summary(&summary);
        if passages_aborted > 0 {
            println!("Passages aborted: {passages_aborted}");
        }
    }
    ExitCode::SUCCESS
}
