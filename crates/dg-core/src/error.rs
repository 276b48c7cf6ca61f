//! Error types for configuration and stage control
//!
//! The layout algorithms themselves never fail; degenerate geometry is
//! handled with sentinels and fallbacks. Errors only arise from invalid
//! configuration or from driving the stage controller out of order.

use thiserror::Error;

use crate::generator::Stage;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Room minimum size must be positive, got {width}x{height}")]
    RoomMinSize { width: i32, height: i32 },

    #[error("Dungeon size must not be negative, got {width}x{height}")]
    DungeonSize { width: i32, height: i32 },

    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },

    #[error("Door sizes must satisfy 1 <= min <= max, got min {min}, max {max}")]
    DoorSize { min: i32, max: i32 },

    #[error("Minimum distance from walls must not be negative, got {0}")]
    WallDistance(i32),

    #[error("Execution delay must be a non-negative number of seconds, got {0}")]
    ExecutionDelay(f32),
}

/// Errors from the stage controller's manual triggers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("Pass requires stage {expected} but the dungeon is at stage {current}")]
    NotReady { expected: Stage, current: Stage },

    #[error("A generation pass is still running")]
    Busy,
}
