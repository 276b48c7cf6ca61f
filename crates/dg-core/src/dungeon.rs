//! Rooms, doors and their adjacency
//!
//! Rooms and doors are addressed by stable ids and stored in ordered maps,
//! so removing a room is a map update plus detaching its doors from the
//! neighbours that still list them.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generator::Stage;
use crate::geometry::Rect;

/// Stable room identifier, assigned in partition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// Stable door identifier, assigned in placement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoorId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

impl fmt::Display for DoorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "door#{}", self.0)
    }
}

/// A finalized leaf room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Leaf rectangle inflated by one unit on every side
    pub rect: Rect,
    /// Doors incident to this room, in placement order
    pub doors: Vec<DoorId>,
    /// Rooms reachable through one of `doors`
    pub connections: Vec<RoomId>,
}

impl Room {
    pub fn new(id: RoomId, rect: Rect) -> Self {
        Self {
            id,
            rect,
            doors: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// The rectangle as partitioned, before wall inflation
    pub fn interior(&self) -> Rect {
        self.rect.inflate(-1)
    }
}

/// A carved opening between exactly two rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub rect: Rect,
    pub rooms: (RoomId, RoomId),
}

impl Door {
    /// The room on the other side of this door from `room`
    pub fn other(&self, room: RoomId) -> RoomId {
        if self.rooms.0 == room {
            self.rooms.1
        } else {
            self.rooms.0
        }
    }

    pub fn connects(&self, room: RoomId) -> bool {
        self.rooms.0 == room || self.rooms.1 == room
    }
}

/// Root of ownership for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    rooms: BTreeMap<RoomId, Room>,
    doors: BTreeMap<DoorId, Door>,
    /// Room ids ranked by ascending size, filled by the pruning pass
    reduced: Vec<RoomId>,
    stage: Stage,
    next_room: u32,
    next_door: u32,
}

impl Dungeon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every room and door and return to [`Stage::Empty`]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn door_count(&self) -> usize {
        self.doors.len()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.values()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(&id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    /// Size-ranked working list used by pruning
    pub fn reduced(&self) -> &[RoomId] {
        &self.reduced
    }

    pub(crate) fn set_reduced(&mut self, reduced: Vec<RoomId>) {
        self.reduced = reduced;
    }

    /// Rooms directly connected to `id`
    pub fn neighbors(&self, id: RoomId) -> &[RoomId] {
        self.rooms
            .get(&id)
            .map(|room| room.connections.as_slice())
            .unwrap_or_default()
    }

    /// Record a finalized room; `rect` must already be inflated
    pub(crate) fn add_room(&mut self, rect: Rect) -> RoomId {
        let id = RoomId(self.next_room);
        self.next_room += 1;
        self.rooms.insert(id, Room::new(id, rect));
        id
    }

    /// Record a door between two rooms and register them with each other.
    ///
    /// Returns `None` if either room is unknown or both ids are the same.
    pub(crate) fn add_door(&mut self, rect: Rect, a: RoomId, b: RoomId) -> Option<DoorId> {
        if a == b || !self.rooms.contains_key(&a) || !self.rooms.contains_key(&b) {
            return None;
        }
        let id = DoorId(self.next_door);
        self.next_door += 1;
        self.doors.insert(
            id,
            Door {
                id,
                rect,
                rooms: (a, b),
            },
        );
        for (room, other) in [(a, b), (b, a)] {
            if let Some(room) = self.rooms.get_mut(&room) {
                room.doors.push(id);
                if !room.connections.contains(&other) {
                    room.connections.push(other);
                }
            }
        }
        Some(id)
    }

    /// Delete a room and every door incident to it, detaching those doors
    /// from the neighbours on the other side.
    pub(crate) fn remove_room(&mut self, id: RoomId) -> Option<Room> {
        let room = self.rooms.remove(&id)?;
        for door_id in &room.doors {
            let Some(door) = self.doors.remove(door_id) else {
                continue;
            };
            let other = door.other(id);
            if other == id {
                continue;
            }
            if let Some(neighbor) = self.rooms.get_mut(&other) {
                neighbor.doors.retain(|d| d != door_id);
                let still_linked = neighbor
                    .doors
                    .iter()
                    .any(|d| self.doors.get(d).is_some_and(|door| door.connects(id)));
                if !still_linked {
                    neighbor.connections.retain(|&r| r != id);
                }
            }
        }
        self.reduced.retain(|&r| r != id);
        Some(room)
    }

    /// Groups of rooms reachable from one another through doors, each
    /// sorted by id, ordered by their smallest id.
    pub fn connected_components(&self) -> Vec<Vec<RoomId>> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();

        for &start in self.rooms.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                for &next in self.neighbors(current) {
                    if seen.insert(next) {
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// True when every room can reach every other room
    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    /// Check the door/room bookkeeping; returns one message per violation.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for door in self.doors.values() {
            let (a, b) = door.rooms;
            if a == b {
                problems.push(format!("{} connects {} to itself", door.id, a));
            }
            if door.rect.width < 0 || door.rect.height < 0 {
                problems.push(format!("{} has negative dimensions", door.id));
            }
            for room_id in [a, b] {
                match self.rooms.get(&room_id) {
                    None => problems.push(format!("{} references missing {}", door.id, room_id)),
                    Some(room) if !room.doors.contains(&door.id) => {
                        problems.push(format!("{} does not list {}", room_id, door.id));
                    }
                    Some(_) => {}
                }
            }
        }

        for room in self.rooms.values() {
            if room.rect.width < 0 || room.rect.height < 0 {
                problems.push(format!("{} has negative dimensions", room.id));
            }
            for door_id in &room.doors {
                match self.doors.get(door_id) {
                    None => problems.push(format!("{} lists missing {}", room.id, door_id)),
                    Some(door) if !door.connects(room.id) => {
                        problems.push(format!("{} lists unrelated {}", room.id, door_id));
                    }
                    Some(_) => {}
                }
            }
            for other in &room.connections {
                if !self.rooms.contains_key(other) {
                    problems.push(format!("{} connects to missing {}", room.id, other));
                }
            }
        }

        problems
    }
}
