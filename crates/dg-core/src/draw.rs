//! Visualization commands and the sink that receives them
//!
//! The generator never renders anything. It appends abstract draw commands
//! to an injected [`DrawSink`], grouped by [`Channel`]; the host executes
//! them once per render pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::geometry::{Rect, Vec2};

/// Logical grouping of draw commands
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Channel {
    /// The partition node currently being explored
    #[strum(to_string = "rooms in progress")]
    RoomsInProgress,
    #[strum(to_string = "accepted rooms")]
    AcceptedRooms,
    #[strum(to_string = "doors")]
    Doors,
    #[strum(to_string = "connections")]
    Connections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Color {
    Yellow,
    Red,
    Blue,
    Green,
}

/// A single deferred drawing operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Rect { rect: Rect, color: Color },
    Line { from: Vec2, to: Vec2, color: Color },
}

impl DrawCommand {
    pub fn color(&self) -> Color {
        match *self {
            DrawCommand::Rect { color, .. } | DrawCommand::Line { color, .. } => color,
        }
    }
}

/// Receiver of draw commands
///
/// Append-only from the generator's side; only called from the thread
/// driving the generator.
pub trait DrawSink {
    fn enqueue(&mut self, channel: Channel, command: DrawCommand);

    fn clear(&mut self, channel: Channel);

    fn clear_all(&mut self) {
        for channel in Channel::iter() {
            self.clear(channel);
        }
    }
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DrawSink for NullSink {
    fn enqueue(&mut self, _channel: Channel, _command: DrawCommand) {}

    fn clear(&mut self, _channel: Channel) {}
}

/// In-memory sink keeping commands per channel until cleared
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    channels: BTreeMap<Channel, Vec<DrawCommand>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands currently queued on a channel
    pub fn commands(&self, channel: Channel) -> &[DrawCommand] {
        self.channels
            .get(&channel)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of queued commands
    pub fn len(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every queued command once, in channel order.
    ///
    /// Commands stay queued; a host calls this once per render pass.
    pub fn execute_all(&self, mut draw: impl FnMut(Channel, &DrawCommand)) {
        for (&channel, commands) in &self.channels {
            for command in commands {
                draw(channel, command);
            }
        }
    }
}

impl DrawSink for CommandQueue {
    fn enqueue(&mut self, channel: Channel, command: DrawCommand) {
        self.channels.entry(channel).or_default().push(command);
    }

    fn clear(&mut self, channel: Channel) {
        self.channels.remove(&channel);
    }
}

impl<S: DrawSink + ?Sized> DrawSink for &mut S {
    fn enqueue(&mut self, channel: Channel, command: DrawCommand) {
        (**self).enqueue(channel, command);
    }

    fn clear(&mut self, channel: Channel) {
        (**self).clear(channel);
    }
}

/// Commands produced by one generation step, forwarded to a sink afterwards
#[derive(Debug, Default, Clone)]
pub(crate) struct Batch {
    enabled: bool,
    ops: Vec<BatchOp>,
}

#[derive(Debug, Clone)]
enum BatchOp {
    Draw(Channel, DrawCommand),
    Clear(Channel),
}

impl Batch {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ops: Vec::new(),
        }
    }

    pub(crate) fn rect(&mut self, channel: Channel, rect: Rect, color: Color) {
        if self.enabled {
            self.ops
                .push(BatchOp::Draw(channel, DrawCommand::Rect { rect, color }));
        }
    }

    pub(crate) fn line(&mut self, channel: Channel, from: Vec2, to: Vec2, color: Color) {
        if self.enabled {
            self.ops
                .push(BatchOp::Draw(channel, DrawCommand::Line { from, to, color }));
        }
    }

    pub(crate) fn clear(&mut self, channel: Channel) {
        if self.enabled {
            self.ops.push(BatchOp::Clear(channel));
        }
    }

    pub(crate) fn flush_into<S: DrawSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let count = self.ops.len();
        for op in self.ops.drain(..) {
            match op {
                BatchOp::Draw(channel, command) => sink.enqueue(channel, command),
                BatchOp::Clear(channel) => sink.clear(channel),
            }
        }
        count
    }
}
