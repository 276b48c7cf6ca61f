//! dg-core: deterministic procedural dungeon layout generation
//!
//! A rectangular area is recursively partitioned into leaf rooms, doors are
//! carved where neighbouring rooms overlap, and redundant small rooms are
//! pruned without leaving any room doorless. The crate does no I/O: draw
//! commands go to an injected [`DrawSink`] and pacing is left to the host.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`geometry`] | Integer rectangles, intersection and containment |
//! | [`partition`] | Arena BSP tree and the resumable partition pass |
//! | [`dungeon`] | Rooms, doors and adjacency keyed by stable ids |
//! | [`doors`] | Pairwise door carving between overlapping rooms |
//! | [`prune`] | Size-ranked pruning that never strands a neighbour |
//! | [`generator`] | Stage controller, stepping and pacing |
//! | [`draw`] | Draw commands, channels and sinks |
//! | [`config`] | Generator options and validation |

pub mod config;
pub mod doors;
pub mod draw;
pub mod dungeon;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod partition;
pub mod prune;
mod rng;

pub use config::{AutoGenerate, GeneratorConfig};
pub use draw::{Channel, Color, CommandQueue, DrawCommand, DrawSink, NullSink};
pub use dungeon::{Door, DoorId, Dungeon, Room, RoomId};
pub use error::{ConfigError, StageError};
pub use generator::{Generator, Stage, StepOutcome};
pub use geometry::{Rect, Size, Vec2};
pub use rng::DungeonRng;
