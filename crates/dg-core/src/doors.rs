//! Door placement between adjacent rooms
//!
//! Rooms are inflated by one unit, so neighbours overlap in a strip two
//! units thick along their shared wall. Every pair of rooms is tested; a
//! door is carved inside the strip after trimming the corner zones where
//! perpendicular walls meet it.

use log::debug;

use crate::config::GeneratorConfig;
use crate::draw::{Batch, Channel, Color};
use crate::dungeon::{Dungeon, RoomId};
use crate::geometry::Rect;
use crate::rng::DungeonRng;

/// Door size limits and wall clearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorParams {
    pub door_min_size: i32,
    pub door_max_size: i32,
    pub min_distance_from_walls: i32,
}

impl From<&GeneratorConfig> for DoorParams {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            door_min_size: config.door_min_size,
            door_max_size: config.door_max_size,
            min_distance_from_walls: config.min_distance_from_walls,
        }
    }
}

impl DoorParams {
    /// Carve a door in the overlap of two room rectangles.
    ///
    /// Returns [`Rect::ZERO`] when the rooms do not overlap or the trimmed
    /// overlap is too short for `door_min_size`.
    pub fn carve(&self, a: Rect, b: Rect, rng: &mut DungeonRng) -> Rect {
        let overlap = a.intersect(&b);
        if overlap.is_zero() {
            return Rect::ZERO;
        }

        if overlap.width > overlap.height {
            let Some((margin, offset, size)) = self.place(overlap.width, overlap.height, rng) else {
                return Rect::ZERO;
            };
            Rect::new(overlap.x + margin + offset, overlap.y, size, overlap.height)
        } else {
            let Some((margin, offset, size)) = self.place(overlap.height, overlap.width, rng) else {
                return Rect::ZERO;
            };
            Rect::new(overlap.x, overlap.y + margin + offset, overlap.width, size)
        }
    }

    /// Trim both ends of a wall of length `along` by the wall thickness
    /// `across` plus the clearance, then pick a door on what is left.
    /// Returns `(margin, offset, size)`.
    fn place(&self, along: i32, across: i32, rng: &mut DungeonRng) -> Option<(i32, i32, i32)> {
        let margin = i64::from(across) + i64::from(self.min_distance_from_walls);
        let span = i64::from(along) - 2 * margin;
        if span < i64::from(self.door_min_size) {
            return None;
        }
        // span fits between door_min_size and along, so both convert back
        let span = i32::try_from(span).ok()?;
        let margin = i32::try_from(margin).ok()?;
        let (offset, size) = self.pick(span, rng)?;
        Some((margin, offset, size))
    }

    /// Choose `(offset, size)` of a door along a usable span
    fn pick(&self, span: i32, rng: &mut DungeonRng) -> Option<(i32, i32)> {
        if span < self.door_min_size {
            return None;
        }
        let size = rng.range_inclusive(self.door_min_size, self.door_max_size.min(span));
        let offset = rng.range_inclusive(0, span - size);
        Some((offset, size))
    }
}

/// Resumable door pass; one step tests room `i` against every later room
#[derive(Debug, Clone)]
pub struct DoorPlacer {
    rooms: Vec<(RoomId, Rect)>,
    next: usize,
    params: DoorParams,
}

impl DoorPlacer {
    pub fn new(dungeon: &Dungeon, params: DoorParams) -> Self {
        Self {
            rooms: dungeon.rooms().map(|room| (room.id, room.rect)).collect(),
            next: 0,
            params,
        }
    }

    pub fn is_done(&self) -> bool {
        self.next + 1 >= self.rooms.len()
    }

    /// Place the doors of one room. Returns false when no rooms remain.
    pub(crate) fn step(
        &mut self,
        rng: &mut DungeonRng,
        dungeon: &mut Dungeon,
        batch: &mut Batch,
    ) -> bool {
        if self.is_done() {
            return false;
        }
        let i = self.next;
        let (a, rect_a) = self.rooms[i];
        for &(b, rect_b) in &self.rooms[i + 1..] {
            let door = self.params.carve(rect_a, rect_b, rng);
            if door.is_zero() {
                continue;
            }
            if let Some(id) = dungeon.add_door(door, a, b) {
                batch.rect(Channel::Doors, door, Color::Blue);
                debug!("placed {} between {} and {} at {:?}", id, a, b, door);
            }
        }
        self.next += 1;
        !self.is_done()
    }

    /// Run the whole pass without visualization
    pub fn run(mut self, rng: &mut DungeonRng, dungeon: &mut Dungeon) {
        let mut batch = Batch::new(false);
        while self.step(rng, dungeon, &mut batch) {}
    }
}
