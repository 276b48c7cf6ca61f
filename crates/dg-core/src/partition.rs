//! Binary space partition of the dungeon area into leaf rooms
//!
//! The tree is an arena of nodes addressed by [`NodeId`]; parent and child
//! links are indices. Traversal is an explicit cursor that visits one node
//! per step, so a host can watch the partition grow:
//!
//! - an unsplit node is either accepted as a room or split in two, and the
//!   cursor descends into the right child;
//! - a split node recomputes its completion from its children and moves to
//!   the missing side, or back to its parent once both sides are complete;
//! - the walk ends when the root reports [`Completion::Complete`].

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::draw::{Batch, Channel, Color};
use crate::dungeon::{Dungeon, RoomId};
use crate::geometry::{Rect, Size};
use crate::rng::DungeonRng;

/// Completion state of a partition node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completion {
    Complete,
    /// Right subtree complete, left still open
    MissingLeft,
    /// Left subtree complete, right still open
    MissingRight,
    MissingBoth,
}

impl Completion {
    /// Status of a split node given its children's status
    pub fn combine(left: Completion, right: Completion) -> Completion {
        match (left == Completion::Complete, right == Completion::Complete) {
            (true, true) => Completion::Complete,
            (false, true) => Completion::MissingLeft,
            (true, false) => Completion::MissingRight,
            (false, false) => Completion::MissingBoth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionNode {
    pub rect: Rect,
    pub status: Completion,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Room recorded when this node was accepted as a leaf
    pub room: Option<RoomId>,
}

impl PartitionNode {
    fn new(rect: Rect, parent: Option<NodeId>) -> Self {
        Self {
            rect,
            status: Completion::MissingBoth,
            parent,
            left: None,
            right: None,
            room: None,
        }
    }

    /// `(left, right)` once the node has been split
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.left.zip(self.right)
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-backed partition tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
}

impl PartitionTree {
    pub fn new(root: Rect) -> Self {
        Self {
            nodes: vec![PartitionNode::new(root, None)],
        }
    }

    pub const ROOT: NodeId = NodeId(0);

    pub fn node(&self, id: NodeId) -> &PartitionNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut PartitionNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PartitionNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &PartitionNode)> {
        self.nodes().filter(|(_, n)| n.is_leaf())
    }

    pub fn is_complete(&self) -> bool {
        self.node(Self::ROOT).status == Completion::Complete
    }

    /// Attach two children to `id`: `first` becomes the right child and
    /// `second` the left one. Returns `(right, left)`.
    fn split(&mut self, id: NodeId, first: Rect, second: Rect) -> (NodeId, NodeId) {
        let right = NodeId(self.nodes.len());
        self.nodes.push(PartitionNode::new(first, Some(id)));
        let left = NodeId(self.nodes.len());
        self.nodes.push(PartitionNode::new(second, Some(id)));

        let node = self.node_mut(id);
        node.right = Some(right);
        node.left = Some(left);
        node.status = Completion::MissingBoth;
        (right, left)
    }
}

/// Size and probability knobs for partitioning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionParams {
    pub room_min_size: Size,
    pub room_max_size: Size,
    pub split_direction_bias: f32,
    pub large_room_chance: f32,
}

impl From<&GeneratorConfig> for PartitionParams {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            room_min_size: config.room_min_size,
            room_max_size: config.room_max_size,
            split_direction_bias: config.split_direction_bias,
            large_room_chance: config.large_room_chance,
        }
    }
}

impl PartitionParams {
    /// Decide whether an unsplit rectangle becomes a room
    fn accepts(&self, rect: Rect, rng: &mut DungeonRng) -> bool {
        let min = self.room_min_size;
        if rect.width / 2 < min.width && rect.height / 2 < min.height {
            return true;
        }
        let max = self.room_max_size;
        rect.width < max.width && rect.height < max.height && rng.chance(self.large_room_chance)
    }

    /// Cut `rect` in two. Horizontal splits cut along X and are preferred
    /// with probability `split_direction_bias`; the other axis is used when
    /// the preferred one cannot hold two minimum-size rooms.
    fn cut(&self, rect: Rect, rng: &mut DungeonRng) -> (Rect, Rect) {
        let min = self.room_min_size;
        let prefer_horizontal = rng.chance(self.split_direction_bias);
        let fits_horizontal = rect.width / 2 >= min.width;
        let fits_vertical = rect.height / 2 >= min.height;

        let horizontal = if prefer_horizontal {
            fits_horizontal || !fits_vertical
        } else {
            !fits_vertical
        };

        if horizontal {
            let cut = rng.range_inclusive(min.width, rect.width - min.width);
            (
                Rect::new(rect.x, rect.y, cut, rect.height),
                Rect::new(rect.x + cut, rect.y, rect.width - cut, rect.height),
            )
        } else {
            let cut = rng.range_inclusive(min.height, rect.height - min.height);
            (
                Rect::new(rect.x, rect.y, rect.width, cut),
                Rect::new(rect.x, rect.y + cut, rect.width, rect.height - cut),
            )
        }
    }
}

/// Resumable partition pass
#[derive(Debug, Clone)]
pub struct RoomPartitioner {
    tree: PartitionTree,
    cursor: Option<NodeId>,
    params: PartitionParams,
}

impl RoomPartitioner {
    pub fn new(area: Size, params: PartitionParams) -> Self {
        Self {
            tree: PartitionTree::new(Rect::new(0, 0, area.width, area.height)),
            cursor: Some(PartitionTree::ROOT),
            params,
        }
    }

    pub fn tree(&self) -> &PartitionTree {
        &self.tree
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_none()
    }

    /// Visit one node. Returns false once the root is complete.
    pub(crate) fn step(
        &mut self,
        rng: &mut DungeonRng,
        dungeon: &mut Dungeon,
        batch: &mut Batch,
    ) -> bool {
        let Some(id) = self.cursor else {
            return false;
        };
        let node = self.tree.node(id).clone();
        batch.clear(Channel::RoomsInProgress);
        batch.rect(Channel::RoomsInProgress, node.rect, Color::Yellow);

        self.cursor = match node.children() {
            None if self.params.accepts(node.rect, rng) => {
                let room = dungeon.add_room(node.rect.inflate(1));
                let entry = self.tree.node_mut(id);
                entry.status = Completion::Complete;
                entry.room = Some(room);
                batch.rect(Channel::AcceptedRooms, node.rect, Color::Red);
                debug!("accepted {} at {:?}", room, node.rect);
                node.parent
            }
            None => {
                let (first, second) = self.params.cut(node.rect, rng);
                let (right, _) = self.tree.split(id, first, second);
                trace!("split {:?} into {:?} / {:?}", node.rect, first, second);
                Some(right)
            }
            Some((left, right)) => {
                let status = Completion::combine(
                    self.tree.node(left).status,
                    self.tree.node(right).status,
                );
                self.tree.node_mut(id).status = status;
                match status {
                    Completion::Complete => node.parent,
                    Completion::MissingLeft => Some(left),
                    Completion::MissingRight | Completion::MissingBoth => Some(right),
                }
            }
        };

        if self.cursor.is_none() {
            batch.clear(Channel::RoomsInProgress);
            return false;
        }
        true
    }

    /// Run the whole pass without visualization
    pub fn run(mut self, rng: &mut DungeonRng, dungeon: &mut Dungeon) -> PartitionTree {
        let mut batch = Batch::new(false);
        while self.step(rng, dungeon, &mut batch) {}
        self.tree
    }
}
