/*
  Haliax, a Tak engine.
  Copyright (C) 2022 The Haliax Authors (see AUTHORS.md file)

  Haliax is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  Haliax is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! The transposition table backing the tree search.
//!
//! Search nodes live in an arena owned by the table; positions that
//! transpose into one another share a node through the Zobrist-keyed index.
//! Edges refer to their child nodes by arena index, never by pointer, so
//! the node graph cannot form ownership cycles: everything dies with the
//! arena.

use crate::base::Move;

use std::collections::HashMap;

use nohash_hasher::BuildNoHashHasher;

/// The default byte budget for the node arena.
pub const DEFAULT_ARENA_BYTES: usize = 16 * 1024 * 1024;

/// The minimum number of hash buckets to reserve for the Zobrist index.
const MIN_BUCKETS: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// A handle to a node in the arena.
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    /// The arena slot this handle names.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The proof state of a node, in the perspective of the side to move there.
pub enum NodeState {
    /// Not yet proven either way.
    Unknown,
    /// The side to move wins with best play.
    Win,
    /// The side to move loses with best play.
    Loss,
    /// Best play leads to a draw.
    Draw,
}

#[derive(Clone, Debug)]
/// An edge out of a search node: a move, the statistics PUCT needs, and the
/// child it leads to.
pub struct Edge {
    /// The move this edge plays.
    pub m: Move,
    /// The normalized prior probability assigned by the evaluator.
    pub prior: f32,
    /// The number of times selection has walked this edge.
    pub visits: u32,
    /// The accumulated value of those walks, from the perspective of the
    /// side to move at the edge's parent (the player choosing it).
    pub total_value: f32,
    /// The node this edge leads to.
    pub child: NodeId,
}

impl Edge {
    #[must_use]
    /// The arithmetic mean value of this edge, zero if it is unvisited.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_value / self.visits as f32
        }
    }
}

#[derive(Clone, Debug)]
/// One node of the search tree, keyed by the Zobrist hash of the position it
/// was created for.
pub struct SearchNode {
    /// The Zobrist key this node was created for.
    pub key: u64,
    /// The proof state of this node.
    pub state: NodeState,
    /// How many plies separate this node from its proven end, when `state`
    /// is not `Unknown`.
    pub end_in_ply: u16,
    /// The number of completed visits through this node.
    pub visits: u32,
    /// The running mean value of those visits, in `[-1, 1]` from the side
    /// to move here.
    pub value: f32,
    /// Whether this node's edges have been populated.
    pub expanded: bool,
    /// The outgoing edges, empty until expansion.
    pub edges: Vec<Edge>,
}

impl SearchNode {
    /// Make a fresh, unexpanded, unproven node for `key`.
    fn new(key: u64) -> SearchNode {
        SearchNode {
            key,
            state: NodeState::Unknown,
            end_in_ply: 0,
            visits: 0,
            value: 0.0,
            expanded: false,
            edges: Vec::new(),
        }
    }
}

/// A transposition table: an arena of search nodes plus a Zobrist-keyed
/// index into it.
pub struct TranspositionTable {
    /// The node arena.
    /// `NodeId`s index into this vector and stay valid until `clear`.
    nodes: Vec<SearchNode>,
    /// The Zobrist key -> arena slot index.
    /// Keys are Zobrist hashes and thus already uniformly distributed, so
    /// the hasher passes them through untouched.
    index: HashMap<u64, u32, BuildNoHashHasher<u64>>,
    /// The greatest number of nodes the arena may hold before it is
    /// considered for clearing, derived from the byte budget.
    node_budget: usize,
}

impl TranspositionTable {
    #[must_use]
    /// Create a table whose arena is sized to roughly `bytes` of node
    /// storage.
    pub fn with_byte_budget(bytes: usize) -> TranspositionTable {
        let node_budget = (bytes / std::mem::size_of::<SearchNode>()).max(MIN_BUCKETS);
        TranspositionTable {
            nodes: Vec::new(),
            index: HashMap::with_capacity_and_hasher(
                node_budget.max(MIN_BUCKETS),
                BuildNoHashHasher::default(),
            ),
            node_budget,
        }
    }

    #[must_use]
    /// The number of nodes currently in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    /// Whether the arena has consumed more than half of its budget.
    /// When it has, the next search clears the table before starting.
    pub fn over_half_full(&self) -> bool {
        self.nodes.len() * 2 > self.node_budget
    }

    /// Drop every node and index entry, keeping the allocations.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
    }

    /// Fetch the node for `key`, creating an empty one if the key is new.
    /// Returns the node's handle and whether it was just created.
    pub fn get_or_insert(&mut self, key: u64) -> (NodeId, bool) {
        if let Some(&slot) = self.index.get(&key) {
            return (NodeId(slot), false);
        }
        #[allow(clippy::cast_possible_truncation)]
        let slot = self.nodes.len() as u32;
        self.nodes.push(SearchNode::new(key));
        self.index.insert(key, slot);
        (NodeId(slot), true)
    }

    #[must_use]
    /// Get a node by handle.
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    /// Get a node by handle, mutably.
    pub fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }
}
