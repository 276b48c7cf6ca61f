//! Stage controller sequencing the generation passes
//!
//! `Empty -> RoomsCompleted -> DoorsCompleted -> ConnectionsCompleted`.
//! Each pass is resumable and advanced one unit of work per [`Generator::step`];
//! the draw commands of that unit are forwarded to the injected sink before
//! `step` returns. Later passes start on their own when configured to,
//! otherwise they wait for a manual trigger.

use std::time::Duration;

use log::{info, trace};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::config::GeneratorConfig;
use crate::doors::{DoorParams, DoorPlacer};
use crate::draw::{Batch, DrawSink, NullSink};
use crate::dungeon::Dungeon;
use crate::error::{ConfigError, StageError};
use crate::partition::{PartitionParams, RoomPartitioner};
use crate::prune::RoomPruner;
use crate::rng::DungeonRng;

/// Progress of the current dungeon
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Stage {
    #[default]
    Empty,
    RoomsCompleted,
    DoorsCompleted,
    ConnectionsCompleted,
}

/// Result of a single [`Generator::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A pass is running; call `step` again
    Working,
    /// No pass is running and the next one needs a manual trigger
    Waiting(Stage),
    /// All passes are done
    Finished,
}

#[derive(Debug, Clone)]
enum Pass {
    Idle,
    Rooms(RoomPartitioner),
    Doors(DoorPlacer),
    Connections(RoomPruner),
}

/// Owns one generation session: configuration, RNG, dungeon and sink
#[derive(Debug)]
pub struct Generator<S: DrawSink = NullSink> {
    config: GeneratorConfig,
    rng: DungeonRng,
    dungeon: Dungeon,
    sink: S,
    pass: Pass,
    runs: u64,
    steps: u64,
}

impl<S: DrawSink> Generator<S> {
    /// Create a generator; partitioning starts right away when
    /// `auto_generate.rooms` is set.
    pub fn new(config: GeneratorConfig, sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut generator = Self {
            rng: DungeonRng::new(config.seed),
            config,
            dungeon: Dungeon::new(),
            sink,
            pass: Pass::Idle,
            runs: 0,
            steps: 0,
        };
        if generator.config.auto_generate.rooms {
            generator.start_generation();
        }
        Ok(generator)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replace the configuration; takes effect at the next
    /// [`start_generation`](Self::start_generation).
    pub fn set_config(&mut self, config: GeneratorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn stage(&self) -> Stage {
        self.dungeon.stage()
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (Dungeon, S) {
        (self.dungeon, self.sink)
    }

    /// Whether a pass is in flight
    pub fn is_running(&self) -> bool {
        !matches!(self.pass, Pass::Idle)
    }

    /// Steps taken since the last restart
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Pause the host should leave between steps
    pub fn execution_delay(&self) -> Duration {
        self.config.execution_delay()
    }

    /// Abandon any pass in flight, wipe the dungeon and the sink, reseed and
    /// begin partitioning.
    pub fn start_generation(&mut self) {
        if self.is_running() {
            info!("cancelling in-flight generation at stage {}", self.stage());
        }
        self.pass = Pass::Idle;
        self.sink.clear_all();
        self.dungeon.reset();
        self.rng = DungeonRng::new(self.config.seed);
        self.runs += 1;
        self.steps = 0;

        info!(
            "generation run {} with seed {} over {}x{}",
            self.runs,
            self.config.seed,
            self.config.dungeon_size.width,
            self.config.dungeon_size.height
        );
        self.pass = Pass::Rooms(RoomPartitioner::new(
            self.config.dungeon_size,
            PartitionParams::from(&self.config),
        ));
    }

    /// Start door placement after rooms completed without auto-run
    pub fn trigger_doors(&mut self) -> Result<(), StageError> {
        self.ready_for(Stage::RoomsCompleted)?;
        self.pass = Pass::Doors(DoorPlacer::new(&self.dungeon, DoorParams::from(&self.config)));
        Ok(())
    }

    /// Start pruning after doors completed without auto-run
    pub fn trigger_connections(&mut self) -> Result<(), StageError> {
        self.ready_for(Stage::DoorsCompleted)?;
        self.pass = Pass::Connections(RoomPruner::new(&mut self.dungeon, self.config.remove_ratio));
        Ok(())
    }

    fn ready_for(&self, expected: Stage) -> Result<(), StageError> {
        if self.is_running() {
            return Err(StageError::Busy);
        }
        let current = self.stage();
        if current != expected {
            return Err(StageError::NotReady { expected, current });
        }
        Ok(())
    }

    /// Advance the running pass by one unit of work
    pub fn step(&mut self) -> StepOutcome {
        if !self.is_running() {
            return self.idle_outcome();
        }
        let mut batch = Batch::new(self.config.emit_draw_commands);
        let more = match &mut self.pass {
            Pass::Idle => false,
            Pass::Rooms(partitioner) => partitioner.step(&mut self.rng, &mut self.dungeon, &mut batch),
            Pass::Doors(placer) => placer.step(&mut self.rng, &mut self.dungeon, &mut batch),
            Pass::Connections(pruner) => pruner.step(&mut self.dungeon, &mut batch),
        };
        self.steps += 1;
        let emitted = batch.flush_into(&mut self.sink);
        trace!("step {} emitted {} draw operations", self.steps, emitted);

        if !more {
            self.finish_pass();
        }
        if self.is_running() {
            StepOutcome::Working
        } else {
            self.idle_outcome()
        }
    }

    fn idle_outcome(&self) -> StepOutcome {
        match self.stage() {
            Stage::ConnectionsCompleted => StepOutcome::Finished,
            stage => StepOutcome::Waiting(stage),
        }
    }

    fn finish_pass(&mut self) {
        let pass = std::mem::replace(&mut self.pass, Pass::Idle);
        match pass {
            Pass::Idle => {}
            Pass::Rooms(_) => {
                self.dungeon.set_stage(Stage::RoomsCompleted);
                info!("rooms completed: {} rooms", self.dungeon.room_count());
                if self.config.auto_generate.doors {
                    self.pass =
                        Pass::Doors(DoorPlacer::new(&self.dungeon, DoorParams::from(&self.config)));
                }
            }
            Pass::Doors(_) => {
                self.dungeon.set_stage(Stage::DoorsCompleted);
                info!("doors completed: {} doors", self.dungeon.door_count());
                if self.config.auto_generate.connections {
                    self.pass = Pass::Connections(RoomPruner::new(
                        &mut self.dungeon,
                        self.config.remove_ratio,
                    ));
                }
            }
            Pass::Connections(pruner) => {
                self.dungeon.set_stage(Stage::ConnectionsCompleted);
                info!(
                    "connections completed: pruned {} of {} allowed, {} rooms and {} doors remain",
                    pruner.removed(),
                    pruner.budget(),
                    self.dungeon.room_count(),
                    self.dungeon.door_count()
                );
            }
        }
    }

    /// Step until no pass is running
    pub fn run_to_completion(&mut self) -> StepOutcome {
        loop {
            let outcome = self.step();
            if outcome != StepOutcome::Working {
                return outcome;
            }
        }
    }

    /// Step until no pass is running, calling `wait` with the configured
    /// delay between steps. Pacing never affects the generated layout.
    pub fn run_paced(&mut self, mut wait: impl FnMut(Duration)) -> StepOutcome {
        let delay = self.execution_delay();
        loop {
            let outcome = self.step();
            if outcome != StepOutcome::Working {
                return outcome;
            }
            wait(delay);
        }
    }
}

impl Generator<NullSink> {
    /// Generator without visualization
    pub fn headless(config: GeneratorConfig) -> Result<Self, ConfigError> {
        Self::new(config, NullSink)
    }
}
