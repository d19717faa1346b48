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

//! The PUCT Monte-Carlo tree search.
//!
//! Each iteration selects a path from the root by the PUCT criterion,
//! expands the first unexpanded node it reaches, asks the evaluator for a
//! value and move priors there, and backs the value up the path with
//! alternating sign.
//! Proven results (wins, losses, and draws discovered at terminal leaves)
//! propagate exactly through the tree: a node all of whose children are
//! classified is classified itself.
//!
//! The search mutates a single live position with make/undo along the
//! selection path; no positions are cloned.

use super::{
    evaluate::Evaluator,
    limit::SearchLimit,
    time::get_search_time,
    transposition::{Edge, NodeId, NodeState, TranspositionTable, DEFAULT_ARENA_BYTES},
};
use crate::base::{legal_moves, Color, GameResult, Move, MoveList, Position};

use std::{
    cmp::Ordering,
    time::{Duration, Instant},
};

use arrayvec::ArrayVec;
use thiserror::Error;

/// The exploration constant multiplying the prior term of the PUCT score.
const C_PUCT: f32 = 1.0;

/// A small visit-count bonus that keeps unvisited edges from tying at zero.
const EXPLORATION_BONUS: f32 = 0.05;

/// The number of iterations run when the limits specify none: 2^12.
const DEFAULT_ITERATIONS: u64 = 1 << 12;

/// The deepest selection path the search will walk.
/// Kept comfortably below the position's 256-slot crush ring so that the
/// in-flight make/undo chain can never wrap it.
const MAX_SELECT_DEPTH: usize = 192;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
/// An error produced when a search cannot even start.
pub enum SearchError {
    #[error("search invoked on a terminal position")]
    NoLegalMoves,
}

#[derive(Clone, Copy, Debug, Default)]
/// The caller's bounds on one search: clock state, an explicit move time,
/// and iteration caps.
/// All fields are optional; an empty bag means the default iteration count.
pub struct SearchLimits {
    /// White's remaining clock, in milliseconds.
    pub wtime_ms: Option<u64>,
    /// Black's remaining clock, in milliseconds.
    pub btime_ms: Option<u64>,
    /// White's per-move increment, in milliseconds.
    pub winc_ms: Option<u64>,
    /// Black's per-move increment, in milliseconds.
    pub binc_ms: Option<u64>,
    /// A hard wall-clock cap for this one move, in milliseconds.
    pub movetime_ms: Option<u64>,
    /// An exponential iteration cap: `depth` is interpreted as
    /// `2^min(depth, 16)` iterations, not a tree depth.
    pub depth: Option<u8>,
    /// A direct cap on the number of iterations.
    pub nodes: Option<u64>,
}

impl SearchLimits {
    /// The iteration cap these limits imply.
    fn iteration_cap(&self) -> u64 {
        self.nodes
            .unwrap_or_else(|| self.depth.map_or(DEFAULT_ITERATIONS, |d| 1 << d.min(16)))
    }

    /// The wall-clock deadline these limits imply for `mover`, if any.
    fn deadline(&self, mover: Color) -> Option<Instant> {
        if let Some(movetime) = self.movetime_ms {
            return Some(Instant::now() + Duration::from_millis(movetime));
        }
        let (remaining, increment) = match mover {
            Color::White => (self.wtime_ms, self.winc_ms),
            Color::Black => (self.btime_ms, self.binc_ms),
        };
        remaining.map(|rem| {
            Instant::now() + Duration::from_millis(get_search_time(increment.unwrap_or(0), rem))
        })
    }
}

/// A reusable tree searcher.
/// Holds the transposition table across searches, so consecutive searches
/// of nearby positions reuse each other's work until the arena fills.
pub struct Searcher {
    /// The node arena and Zobrist index.
    table: TranspositionTable,
    /// Scratch storage for evaluator priors.
    priors: Vec<f32>,
}

impl Searcher {
    #[must_use]
    /// Create a searcher with the default arena budget.
    pub fn new() -> Searcher {
        Searcher::with_table_bytes(DEFAULT_ARENA_BYTES)
    }

    #[must_use]
    /// Create a searcher whose arena is sized to roughly `bytes`.
    pub fn with_table_bytes(bytes: usize) -> Searcher {
        Searcher {
            table: TranspositionTable::with_byte_budget(bytes),
            priors: Vec::new(),
        }
    }

    /// Search `pos` within `limits` and return the best move found.
    /// The position is mutated during the search but fully restored before
    /// returning.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` if `pos` is already decided, so
    /// that no move exists to return.
    pub fn search<E: Evaluator>(
        &mut self,
        pos: &mut Position,
        limits: &SearchLimits,
        evaluator: &E,
    ) -> Result<Move, SearchError> {
        let limit = SearchLimit::new(limits.iteration_cap(), limits.deadline(pos.to_move()));
        self.search_with_limit(pos, &limit, evaluator)
    }

    /// Search `pos` under an explicit limit.
    /// A frontend that wants an external stop signal owns the
    /// [`SearchLimit`] and sets its flag from wherever it pleases; the
    /// search polls it between iterations.
    ///
    /// # Errors
    ///
    /// This function will return an `Err` if `pos` is already decided, so
    /// that no move exists to return.
    pub fn search_with_limit<E: Evaluator>(
        &mut self,
        pos: &mut Position,
        limit: &SearchLimit,
        evaluator: &E,
    ) -> Result<Move, SearchError> {
        if pos.terminal() != GameResult::Ongoing {
            return Err(SearchError::NoLegalMoves);
        }

        if self.table.over_half_full() {
            self.table.clear();
        }
        let (root, _) = self.table.get_or_insert(pos.hash());

        // always run at least one iteration so the root is expanded
        let mut iterations = 0u64;
        loop {
            self.run_iteration(pos, root, evaluator);
            iterations += 1;
            if !matches!(self.table.node(root).state, NodeState::Unknown) {
                // the root is proven; no amount of further search changes it
                break;
            }
            if !limit.keep_going(iterations) {
                break;
            }
        }

        let best = self.best_root_move(root);
        log::debug!(
            "searched {iterations} iterations, {} nodes in table, best {best}",
            self.table.len(),
        );
        debug_assert!(pos.terminal() == GameResult::Ongoing);
        Ok(best)
    }

    /// Choose the move to return from a finished search: a proven immediate
    /// win if one exists, otherwise the most visited edge, ties broken by
    /// prior.
    fn best_root_move(&self, root: NodeId) -> Move {
        let node = self.table.node(root);
        if let Some(edge) = node
            .edges
            .iter()
            .find(|e| self.table.node(e.child).state == NodeState::Loss)
        {
            return edge.m;
        }
        node.edges
            .iter()
            .max_by(|a, b| {
                a.visits
                    .cmp(&b.visits)
                    .then(a.prior.partial_cmp(&b.prior).unwrap_or(Ordering::Equal))
            })
            .map(|e| e.m)
            .unwrap_or(Move::BAD_MOVE)
    }

    /// Run one iteration: select to a leaf, expand or evaluate it, and back
    /// the value up while unwinding the live position.
    fn run_iteration<E: Evaluator>(&mut self, pos: &mut Position, root: NodeId, evaluator: &E) {
        let mut trajectory: ArrayVec<(NodeId, usize), MAX_SELECT_DEPTH> = ArrayVec::new();

        // selection: descend while nodes are expanded and unproven
        let mut node_id = root;
        loop {
            let node = self.table.node(node_id);
            if !node.expanded || node.state != NodeState::Unknown || trajectory.is_full() {
                break;
            }
            let edge_idx = self.select_edge(node_id);
            let edge = &self.table.node(node_id).edges[edge_idx];
            let (m, child) = (edge.m, edge.child);
            pos.make_move(m);
            trajectory.push((node_id, edge_idx));
            node_id = child;
        }

        let leaf_value = self.expand(pos, node_id, evaluator);

        // backpropagation: negate at every step up, undoing as we go
        let mut value = leaf_value;
        for &(parent, edge_idx) in trajectory.iter().rev() {
            let m = self.table.node(parent).edges[edge_idx].m;
            pos.undo_move(m);
            value = -value;

            #[allow(clippy::cast_precision_loss)]
            {
                let node = self.table.node_mut(parent);
                let edge = &mut node.edges[edge_idx];
                edge.visits += 1;
                edge.total_value += value;
                node.visits += 1;
                node.value += (value - node.value) / node.visits as f32;
            }
            self.try_promote(parent);
        }
    }

    /// Pick the edge to descend from an expanded, unproven node.
    fn select_edge(&self, id: NodeId) -> usize {
        let node = self.table.node(id);

        // a child in a lost state is a win for us: take it on sight
        if let Some(winning) = node
            .edges
            .iter()
            .position(|e| self.table.node(e.child).state == NodeState::Loss)
        {
            return winning;
        }

        // skip proven-winning children (for the opponent) unless every move
        // is one, in which case the choice no longer matters
        let all_lost = node
            .edges
            .iter()
            .all(|e| self.table.node(e.child).state == NodeState::Win);

        #[allow(clippy::cast_precision_loss)]
        let sqrt_parent = (node.visits.max(1) as f32).sqrt();
        let mut best = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (i, edge) in node.edges.iter().enumerate() {
            if !all_lost && self.table.node(edge.child).state == NodeState::Win {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let denom = 1.0 + edge.visits as f32;
            let score =
                edge.mean() + C_PUCT * edge.prior * sqrt_parent / denom + EXPLORATION_BONUS / denom;
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        best
    }

    /// Expand or evaluate the leaf node for the current `pos`, returning its
    /// value from the perspective of the side to move there.
    fn expand<E: Evaluator>(&mut self, pos: &mut Position, id: NodeId, evaluator: &E) -> f32 {
        let (state, expanded, stored_value) = {
            let node = self.table.node(id);
            (node.state, node.expanded, node.value)
        };
        if state != NodeState::Unknown {
            // the leaf is already proven; its exact value backs up directly
            let value = state_value(state);
            self.record_visit(id, value);
            return value;
        }
        if expanded {
            // the selection depth cap stopped us inside the tree; fall back
            // to the node's running mean
            self.record_visit(id, stored_value);
            return stored_value;
        }

        let result = pos.terminal();
        if result != GameResult::Ongoing {
            let state = classify(result, pos.to_move());
            let node = self.table.node_mut(id);
            node.state = state;
            node.end_in_ply = 0;
            let value = state_value(state);
            self.record_visit(id, value);
            return value;
        }

        let mut moves = MoveList::new();
        legal_moves(pos, &mut moves);
        debug_assert!(!moves.is_empty());

        self.priors.clear();
        self.priors.resize(moves.len(), 0.0);
        let value = evaluator.evaluate(pos, &moves, &mut self.priors);

        // normalize the priors, falling back to uniform when the evaluator
        // offers nothing usable
        let sum: f32 = self.priors.iter().copied().filter(|p| *p > 0.0).sum();
        #[allow(clippy::cast_precision_loss)]
        if sum > 0.0 {
            for p in &mut self.priors {
                *p = p.max(0.0) / sum;
            }
        } else {
            let uniform = 1.0 / moves.len() as f32;
            for p in &mut self.priors {
                *p = uniform;
            }
        }

        let mut edges = Vec::with_capacity(moves.len());
        for (i, &m) in moves.iter().enumerate() {
            let prior = self.priors[i];
            pos.make_move(m);
            let (child, created) = self.table.get_or_insert(pos.hash());
            if created {
                // classify fresh terminal children immediately so selection
                // and proving can use them without another expansion
                let child_result = pos.terminal();
                if child_result != GameResult::Ongoing {
                    let child_node = self.table.node_mut(child);
                    child_node.state = classify(child_result, pos.to_move());
                    child_node.end_in_ply = 0;
                }
            }
            pos.undo_move(m);
            edges.push(Edge {
                m,
                prior,
                visits: 0,
                total_value: 0.0,
                child,
            });
        }

        let node = self.table.node_mut(id);
        node.edges = edges;
        node.expanded = true;
        self.record_visit(id, value);
        value
    }

    /// Count one visit against a node, folding `value` into its running
    /// mean.
    fn record_visit(&mut self, id: NodeId, value: f32) {
        let node = self.table.node_mut(id);
        node.visits += 1;
        #[allow(clippy::cast_precision_loss)]
        {
            node.value += (value - node.value) / node.visits as f32;
        }
    }

    /// Promote a node's proof state once every one of its children is
    /// classified.
    fn try_promote(&mut self, id: NodeId) {
        {
            let node = self.table.node(id);
            if !node.expanded || node.state != NodeState::Unknown {
                return;
            }
        }

        let mut nearest_win: Option<u16> = None;
        let mut any_draw = false;
        let mut deepest_end: u16 = 0;
        for i in 0..self.table.node(id).edges.len() {
            let child_id = self.table.node(id).edges[i].child;
            let child = self.table.node(child_id);
            match child.state {
                NodeState::Unknown => return,
                NodeState::Loss => {
                    // the opponent is lost after this move: a win for us
                    nearest_win =
                        Some(nearest_win.map_or(child.end_in_ply, |n| n.min(child.end_in_ply)));
                }
                NodeState::Draw => any_draw = true,
                NodeState::Win => {}
            }
            deepest_end = deepest_end.max(child.end_in_ply);
        }

        let node = self.table.node_mut(id);
        if let Some(end) = nearest_win {
            node.state = NodeState::Win;
            node.end_in_ply = end + 1;
        } else if any_draw {
            node.state = NodeState::Draw;
            node.end_in_ply = deepest_end + 1;
        } else {
            node.state = NodeState::Loss;
            node.end_in_ply = deepest_end + 1;
        }
    }
}

impl Default for Searcher {
    fn default() -> Searcher {
        Searcher::new()
    }
}

/// The backed-up value of a proven state, from the side to move.
fn state_value(state: NodeState) -> f32 {
    match state {
        NodeState::Win => 1.0,
        NodeState::Loss => -1.0,
        NodeState::Draw | NodeState::Unknown => 0.0,
    }
}

/// Convert a terminal game result into the proof state of the node where
/// `to_move` is on turn.
fn classify(result: GameResult, to_move: Color) -> NodeState {
    match result {
        GameResult::Ongoing => NodeState::Unknown,
        GameResult::Draw => NodeState::Draw,
        GameResult::RoadWin(winner) | GameResult::FlatWin(winner) => {
            if winner == to_move {
                NodeState::Win
            } else {
                NodeState::Loss
            }
        }
    }
}
