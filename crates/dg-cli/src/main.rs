//! Dungeon layout generator
//!
//! Drives the generator step by step, pausing between steps when a delay is
//! configured, and prints the resulting rooms, doors and connections.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::{info, trace, warn};
use strum::IntoEnumIterator;

use dg_core::{
    Channel, CommandQueue, DrawCommand, DrawSink, Dungeon, Generator, GeneratorConfig, Size, Stage,
    StepOutcome,
};

/// Generate a dungeon layout by binary space partitioning
#[derive(Parser, Debug)]
#[command(name = "dungen")]
#[command(author, version, about = "Generate a BSP dungeon layout", long_about = None)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Random seed
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Dungeon size as WIDTHxHEIGHT
    #[arg(long = "size", value_parser = parse_size)]
    size: Option<Size>,

    /// Minimum room size as WIDTHxHEIGHT
    #[arg(long = "room-min", value_parser = parse_size)]
    room_min: Option<Size>,

    /// Maximum size of rooms kept by the large-room chance, as WIDTHxHEIGHT
    #[arg(long = "room-max", value_parser = parse_size)]
    room_max: Option<Size>,

    /// Probability of preferring a cut along X
    #[arg(long = "split-bias")]
    split_bias: Option<f32>,

    /// Probability of keeping a room that already fits the maximum size
    #[arg(long = "large-room-chance")]
    large_room_chance: Option<f32>,

    /// Smallest door
    #[arg(long = "door-min")]
    door_min: Option<i32>,

    /// Largest door
    #[arg(long = "door-max")]
    door_max: Option<i32>,

    /// Clearance between doors and perpendicular walls
    #[arg(long = "wall-distance")]
    wall_distance: Option<i32>,

    /// Fraction of rooms pruning may remove
    #[arg(long = "remove-ratio")]
    remove_ratio: Option<f32>,

    /// Seconds to wait between generation steps
    #[arg(short = 'd', long = "delay")]
    delay: Option<f32>,

    /// Run doors and connections through the manual triggers
    #[arg(long = "manual")]
    manual: bool,

    /// Do not emit draw commands
    #[arg(long = "no-draw")]
    no_draw: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_size(text: &str) -> Result<Size, String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{text}'"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok(Size::new(width, height))
}

impl Args {
    fn build_config(&self) -> anyhow::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(size) = self.size {
            config.dungeon_size = size;
        }
        if let Some(size) = self.room_min {
            config.room_min_size = size;
        }
        if let Some(size) = self.room_max {
            config.room_max_size = size;
        }
        if let Some(bias) = self.split_bias {
            config.split_direction_bias = bias;
        }
        if let Some(chance) = self.large_room_chance {
            config.large_room_chance = chance;
        }
        if let Some(min) = self.door_min {
            config.door_min_size = min;
        }
        if let Some(max) = self.door_max {
            config.door_max_size = max;
        }
        if let Some(distance) = self.wall_distance {
            config.min_distance_from_walls = distance;
        }
        if let Some(ratio) = self.remove_ratio {
            config.remove_ratio = ratio;
        }
        if let Some(delay) = self.delay {
            config.execution_delay = delay;
        }
        if self.manual {
            config.auto_generate.doors = false;
            config.auto_generate.connections = false;
        }
        if self.no_draw {
            config.emit_draw_commands = false;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Sink that keeps the queue for render passes and counts what arrived
#[derive(Debug, Default)]
struct TallySink {
    queue: CommandQueue,
    received: BTreeMap<Channel, usize>,
}

impl DrawSink for TallySink {
    fn enqueue(&mut self, channel: Channel, command: DrawCommand) {
        trace!("[{channel}] {command:?}");
        *self.received.entry(channel).or_default() += 1;
        self.queue.enqueue(channel, command);
    }

    fn clear(&mut self, channel: Channel) {
        self.queue.clear(channel);
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = args.build_config()?;
    let mut generator = Generator::new(config, TallySink::default())?;

    loop {
        match generator.run_paced(std::thread::sleep) {
            StepOutcome::Finished => break,
            StepOutcome::Waiting(Stage::Empty) => generator.start_generation(),
            StepOutcome::Waiting(Stage::RoomsCompleted) => {
                info!("rooms ready, placing doors");
                generator.trigger_doors()?;
            }
            StepOutcome::Waiting(Stage::DoorsCompleted) => {
                info!("doors ready, pruning");
                generator.trigger_connections()?;
            }
            StepOutcome::Waiting(Stage::ConnectionsCompleted) | StepOutcome::Working => {
                unreachable!("run_paced returns only when idle")
            }
        }
    }

    let problems = generator.dungeon().check_invariants();
    if !problems.is_empty() {
        for problem in &problems {
            log::error!("{problem}");
        }
        bail!("generated dungeon is inconsistent ({} problems)", problems.len());
    }

    print_summary(&generator);
    Ok(())
}

fn print_summary(generator: &Generator<TallySink>) {
    let dungeon = generator.dungeon();
    let config = generator.config();

    println!(
        "seed {} over {}x{}: {} rooms, {} doors, {} steps",
        config.seed,
        config.dungeon_size.width,
        config.dungeon_size.height,
        dungeon.room_count(),
        dungeon.door_count(),
        generator.steps()
    );
    print_rooms(dungeon);

    let components = dungeon.connected_components();
    if components.len() > 1 {
        warn!(
            "pruning left {} disconnected groups of rooms",
            components.len()
        );
    }

    let sink = generator.sink();
    let mut drawn: BTreeMap<Channel, usize> = BTreeMap::new();
    sink.queue.execute_all(|channel, _| *drawn.entry(channel).or_default() += 1);
    for channel in Channel::iter() {
        println!(
            "{:<18} {:>5} queued {:>6} emitted",
            channel.to_string(),
            drawn.get(&channel).copied().unwrap_or(0),
            sink.received.get(&channel).copied().unwrap_or(0)
        );
    }
}

fn print_rooms(dungeon: &Dungeon) {
    for room in dungeon.rooms() {
        let r = room.rect;
        let links: Vec<String> = room.connections.iter().map(ToString::to_string).collect();
        println!(
            "{:>8} ({:>4},{:>4}) {:>3}x{:<3} doors {:>2} -> {}",
            room.id.to_string(),
            r.x,
            r.y,
            r.width,
            r.height,
            room.doors.len(),
            links.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("50x100"), Ok(Size::new(50, 100)));
        assert_eq!(parse_size("5X10"), Ok(Size::new(5, 10)));
        assert!(parse_size("50").is_err());
        assert!(parse_size("ax3").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "dungen",
            "--seed",
            "9",
            "--size",
            "30x20",
            "--manual",
            "--no-draw",
        ]);
        let config = args.build_config().unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.dungeon_size, Size::new(30, 20));
        assert!(!config.auto_generate.doors);
        assert!(!config.auto_generate.connections);
        assert!(!config.emit_draw_commands);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let args = Args::parse_from(["dungen", "--remove-ratio", "2"]);
        assert!(args.build_config().is_err());
    }

    #[test]
    fn test_tally_sink_counts_every_command() {
        let config = GeneratorConfig {
            dungeon_size: Size::new(30, 30),
            room_min_size: Size::new(5, 5),
            ..Default::default()
        };
        let mut generator = Generator::new(config, TallySink::default()).unwrap();
        generator.run_to_completion();
        let sink = generator.sink();
        assert_eq!(
            sink.received.get(&Channel::AcceptedRooms).copied(),
            Some(sink.queue.commands(Channel::AcceptedRooms).len())
        );
    }
}
