//! Loading maze configuration from JSON files.

use mazechase::{Maze, MazeConfig, MazeError, MazeResult, Position};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_partial_config_takes_defaults() -> MazeResult<()> {
    let file = write_config(r#"{ "seed": 12, "maze_size": { "x": 9, "y": 7 }, "exits": { "count": 1 } }"#);

    let config = MazeConfig::from_json_file(file.path())?;
    assert_eq!(config.seed, Some(12));
    assert_eq!(config.maze_size, Position::new(9, 7));
    assert_eq!(config.exits.count, 1);
    assert!(config.exits.auto_distribute);
    assert_eq!(config.wall_width, MazeConfig::default().wall_width);

    let maze = Maze::generate(&config)?;
    assert!(maze.exit_footprints().len() <= 1);
    Ok(())
}

#[test]
fn test_config_round_trips_through_a_file() -> MazeResult<()> {
    let mut original = MazeConfig::for_testing(77);
    original.extra_solutions = 3;
    let file = write_config(&original.to_json()?);

    let loaded = MazeConfig::from_json_file(file.path())?;
    assert_eq!(loaded, original);

    // Same file, same maze
    let a = Maze::generate(&loaded)?;
    let b = Maze::generate(&original)?;
    assert_eq!(a.map(), b.map());
    Ok(())
}

#[test]
fn test_malformed_config_is_rejected() {
    let file = write_config("{ \"maze_size\": 12 ");

    match MazeConfig::from_json_file(file.path()) {
        Err(MazeError::InvalidConfig(message)) => {
            assert!(message.contains(&file.path().display().to_string()))
        }
        other => panic!("expected InvalidConfig, got {:?}", other),
    }
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    assert!(matches!(
        MazeConfig::from_json_file(&path),
        Err(MazeError::Io(_))
    ));
}
