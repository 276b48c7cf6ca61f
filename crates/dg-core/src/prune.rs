//! Pruning of small rooms
//!
//! Rooms are ranked by diagonal length and scanned smallest first. A room
//! is removed unless some neighbour reaches the rest of the dungeon only
//! through it. The check is local: no neighbour is ever left without a
//! door, but global connectivity is not re-verified.

use log::debug;

use crate::draw::{Batch, Channel, Color};
use crate::dungeon::{Dungeon, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scanning,
    Drawing,
    Done,
}

/// Resumable pruning pass; one step examines one candidate room
#[derive(Debug, Clone)]
pub struct RoomPruner {
    order: Vec<RoomId>,
    cursor: usize,
    budget: usize,
    removed: usize,
    phase: Phase,
}

/// Number of rooms the pass may remove
pub fn removal_budget(remove_ratio: f32, room_count: usize) -> usize {
    (remove_ratio * room_count as f32).floor().max(0.0) as usize
}

/// Whether some neighbour of `room` has no door left but the one to `room`
pub fn is_sole_connection(dungeon: &Dungeon, room: RoomId) -> bool {
    let Some(candidate) = dungeon.room(room) else {
        return false;
    };
    candidate.doors.iter().any(|&door_id| {
        let Some(door) = dungeon.door(door_id) else {
            return false;
        };
        let other = door.other(room);
        other != room && dungeon.room(other).is_some_and(|n| n.doors.len() == 1)
    })
}

impl RoomPruner {
    /// Rank the dungeon's rooms and store the ranking as its reduced list
    pub fn new(dungeon: &mut Dungeon, remove_ratio: f32) -> Self {
        let mut order: Vec<_> = dungeon.rooms().map(|r| (r.rect.diagonal_squared(), r.id)).collect();
        order.sort();
        let order: Vec<RoomId> = order.into_iter().map(|(_, id)| id).collect();
        dungeon.set_reduced(order.clone());

        Self {
            budget: removal_budget(remove_ratio, order.len()),
            order,
            cursor: 0,
            removed: 0,
            phase: Phase::Scanning,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Examine one candidate, or draw the final connection graph once the
    /// scan is over. Returns false when the pass is finished.
    pub(crate) fn step(&mut self, dungeon: &mut Dungeon, batch: &mut Batch) -> bool {
        match self.phase {
            Phase::Scanning => {
                if self.removed >= self.budget || self.cursor >= self.order.len() {
                    self.phase = Phase::Drawing;
                    return true;
                }
                let candidate = self.order[self.cursor];
                self.cursor += 1;
                if !is_sole_connection(dungeon, candidate) {
                    dungeon.remove_room(candidate);
                    self.removed += 1;
                    debug!("pruned {} ({}/{})", candidate, self.removed, self.budget);
                }
                true
            }
            Phase::Drawing => {
                batch.clear(Channel::Connections);
                for room in dungeon.rooms() {
                    let from = room.rect.center();
                    for door in room.doors.iter().filter_map(|&d| dungeon.door(d)) {
                        batch.line(Channel::Connections, from, door.rect.center(), Color::Green);
                    }
                }
                self.phase = Phase::Done;
                false
            }
            Phase::Done => false,
        }
    }

    /// Run the whole pass without visualization
    pub fn run(mut self, dungeon: &mut Dungeon) -> usize {
        let mut batch = Batch::new(false);
        while self.step(dungeon, &mut batch) {}
        self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    /// Hub with three leaves: a big hub `h` and leaves of growing size.
    fn star() -> (Dungeon, RoomId, [RoomId; 3]) {
        let mut dungeon = Dungeon::new();
        let h = dungeon.add_room(Rect::new(0, 0, 30, 30));
        let a = dungeon.add_room(Rect::new(0, 0, 4, 4));
        let b = dungeon.add_room(Rect::new(0, 0, 5, 5));
        let c = dungeon.add_room(Rect::new(0, 0, 6, 6));
        for leaf in [a, b, c] {
            dungeon.add_door(Rect::new(0, 0, 1, 1), h, leaf);
        }
        (dungeon, h, [a, b, c])
    }

    #[test]
    fn test_budget() {
        assert_eq!(removal_budget(0.2, 10), 2);
        assert_eq!(removal_budget(0.5, 5), 2);
        assert_eq!(removal_budget(0.0, 50), 0);
        assert_eq!(removal_budget(1.0, 7), 7);
    }

    #[test]
    fn test_ranking_is_by_size() {
        let (mut dungeon, h, [a, b, c]) = star();
        RoomPruner::new(&mut dungeon, 0.0);
        assert_eq!(dungeon.reduced(), &[a, b, c, h]);
    }

    #[test]
    fn test_sole_connection() {
        let (dungeon, h, [a, _, _]) = star();
        assert!(!is_sole_connection(&dungeon, a));
        assert!(is_sole_connection(&dungeon, h));
    }

    #[test]
    fn test_prunes_smallest_first_within_budget() {
        let (mut dungeon, h, [a, b, c]) = star();
        let removed = RoomPruner::new(&mut dungeon, 0.5).run(&mut dungeon);

        assert_eq!(removed, 2);
        assert!(dungeon.room(a).is_none());
        assert!(dungeon.room(b).is_none());
        assert!(dungeon.room(c).is_some());
        assert_eq!(dungeon.neighbors(h), &[c]);
        assert_eq!(dungeon.reduced(), &[c, h]);
        assert!(dungeon.check_invariants().is_empty());
    }

    #[test]
    fn test_never_strands_a_neighbour() {
        let (mut dungeon, h, leaves) = star();
        RoomPruner::new(&mut dungeon, 1.0).run(&mut dungeon);

        // the hub is the only link of the last leaf and must survive
        assert!(dungeon.room(h).is_some());
        for room in dungeon.rooms() {
            assert!(!room.doors.is_empty(), "{} stranded", room.id);
        }
        assert_eq!(
            leaves.iter().filter(|&&l| dungeon.room(l).is_some()).count(),
            1
        );
    }

    #[test]
    fn test_chain_keeps_inner_links() {
        // a - b - c, all the same size: a goes first, then b stays because
        // c has a single door, and c stays because b has a single door
        let mut dungeon = Dungeon::new();
        let a = dungeon.add_room(Rect::new(0, 0, 5, 5));
        let b = dungeon.add_room(Rect::new(5, 0, 5, 5));
        let c = dungeon.add_room(Rect::new(10, 0, 5, 5));
        dungeon.add_door(Rect::new(4, 1, 1, 2), a, b);
        dungeon.add_door(Rect::new(9, 1, 1, 2), b, c);

        let removed = RoomPruner::new(&mut dungeon, 1.0).run(&mut dungeon);
        assert_eq!(removed, 1);
        assert_eq!(dungeon.room_ids(), vec![b, c]);
    }

    #[test]
    fn test_draws_connection_lines() {
        let (mut dungeon, _, _) = star();
        let mut pruner = RoomPruner::new(&mut dungeon, 0.0);
        let mut batch = Batch::new(true);
        while pruner.step(&mut dungeon, &mut batch) {}
        assert!(pruner.is_done());

        let mut queue = crate::draw::CommandQueue::new();
        batch.flush_into(&mut queue);
        // three doors, each drawn from both of its rooms
        assert_eq!(queue.commands(Channel::Connections).len(), 6);
    }
}
