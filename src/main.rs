//! # Mazechase Main Entry Point
//!
//! Generates a maze, prints it, and optionally plans a route or runs a chase.

use clap::Parser;
use log::{info, warn};
use mazechase::config::DEFAULT_PURSUER_SPEED;
use mazechase::generation::utils;
use mazechase::{Maze, MazeConfig, MazeError, MazeResult, Point, Position, Pursuer, PursuitStep};

/// Seconds per simulated chase tick.
const CHASE_TICK: f32 = 1.0 / 30.0;

/// Command line arguments for mazechase.
#[derive(Parser, Debug)]
#[command(name = "mazechase")]
#[command(about = "Procedural maze generation with pursuit pathfinding")]
#[command(version)]
struct Args {
    /// Random seed for maze generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Maze size in cells, either `N` or `W,H`
    #[arg(long)]
    size: Option<String>,

    /// Number of auto-distributed exits
    #[arg(long)]
    exits: Option<i32>,

    /// Number of extra connections
    #[arg(long)]
    extra_solutions: Option<i32>,

    /// Print the JSON summary instead of the ASCII maze
    #[arg(long)]
    json: bool,

    /// Plan a route between two points, written `x,y:x,y`
    #[arg(long)]
    route: Option<String>,

    /// Run a chase between two random nodes for this many ticks
    #[arg(long)]
    chase: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> MazeResult<()> {
    let args = Args::parse();

    // Initialize logging
    initialize_logging(&args.log_level)?;

    info!("Starting mazechase v{}", mazechase::VERSION);

    let config = build_config(&args)?;
    let maze = Maze::generate(&config)?;

    if args.json {
        println!("{}", maze.summary_json()?);
    } else {
        print!("{}", maze.to_ascii());
    }

    if let Some(text) = &args.route {
        let (start, goal) = parse_route(text)?;
        print_route(&maze, start, goal);
    }

    if let Some(ticks) = args.chase {
        run_chase(&maze, &config, ticks);
    }

    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> MazeResult<()> {
    let level: log::LevelFilter = log_level
        .parse()
        .map_err(|_| MazeError::InvalidArgument(format!("Unknown log level: {}", log_level)))?;

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .try_init()
        .map_err(|e| MazeError::InvalidArgument(e.to_string()))?;

    Ok(())
}

/// Loads the configuration file (if any) and applies command line overrides.
fn build_config(args: &Args) -> MazeResult<MazeConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            MazeConfig::from_json_file(path)?
        }
        None => MazeConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(size) = &args.size {
        config.maze_size = parse_size(size)?;
    }
    if let Some(exits) = args.exits {
        config.exits.auto_distribute = true;
        config.exits.count = exits;
    }
    if let Some(extra) = args.extra_solutions {
        config.extra_solutions = extra;
    }

    // Always record a seed so the run can be reproduced
    if config.seed.is_none() {
        config.seed = Some(rand::random());
    }
    info!("Generating maze with seed: {:?}", config.seed);
    Ok(config)
}

/// Parses `N` or `W,H`.
fn parse_size(text: &str) -> MazeResult<Position> {
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|_| MazeError::InvalidArgument(format!("Bad maze size: {}", text)))
    };

    match text.split_once(',') {
        Some((w, h)) => Ok(Position::new(parse(w)?, parse(h)?)),
        None => Ok(Position::splat(parse(text)?)),
    }
}

/// Parses `x,y`.
fn parse_point(text: &str) -> MazeResult<Point> {
    let bad = || MazeError::InvalidArgument(format!("Bad point: {}", text));
    let (x, y) = text.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse::<f32>().map_err(|_| bad())?;
    let y = y.trim().parse::<f32>().map_err(|_| bad())?;
    Ok(Point::new(x, y))
}

/// Parses `x,y:x,y`.
fn parse_route(text: &str) -> MazeResult<(Point, Point)> {
    let (start, goal) = text
        .split_once(':')
        .ok_or_else(|| MazeError::InvalidArgument(format!("Bad route, expected x,y:x,y: {}", text)))?;
    Ok((parse_point(start)?, parse_point(goal)?))
}

fn print_route(maze: &Maze, start: Point, goal: Point) {
    let route = maze.find_route(start, goal);
    if !route.reached_goal() {
        warn!("Goal {} not reached; showing the partial route", goal);
    }

    println!(
        "Route {} -> {}: {} waypoints, cost {}, {} expanded{}",
        start,
        goal,
        route.len(),
        route.cost(),
        route.expanded(),
        if route.ends_at_exit() { ", ends at exit" } else { "" }
    );
    for point in route.waypoints() {
        println!("  {}", point);
    }
}

/// Chases a fixed quarry from a random node and reports each waypoint event.
fn run_chase(maze: &Maze, config: &MazeConfig, ticks: u32) {
    let mut rng = utils::create_rng(config);
    let (Some(start), Some(quarry)) = (
        maze.random_navigation_point(&mut rng),
        maze.random_navigation_point(&mut rng),
    ) else {
        warn!("Maze has no nodes to chase between");
        return;
    };

    let mut pursuer = Pursuer::new(start, DEFAULT_PURSUER_SPEED);
    println!("Chase from {} to {}", start, quarry);

    for tick in 0..ticks {
        match pursuer.update(CHASE_TICK, quarry, maze) {
            PursuitStep::Repathed { waypoints, complete } => {
                println!("[{:>5}] planned {} waypoints (complete: {})", tick, waypoints, complete)
            }
            PursuitStep::ReachedWaypoint { at, .. } => {
                println!("[{:>5}] reached {}", tick, at)
            }
            _ => {}
        }

        if pursuer.position() == quarry {
            println!("[{:>5}] caught the quarry at {}", tick, quarry);
            return;
        }
    }
    println!("Chase ended at {} after {} ticks", pursuer.position(), ticks);
}
