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

//! The evaluation seam between the search and its position-assessment
//! backend.
//!
//! The search is generic over anything implementing [`Evaluator`], so a
//! neural network binding, a handcrafted heuristic, and the uniform
//! fallback all plug into the same tree.

use crate::base::{Move, Position};

/// A source of value and policy estimates for positions.
pub trait Evaluator {
    /// Assess `pos`, whose legal moves are `moves`.
    ///
    /// Returns a scalar value in `[-1, 1]` from the perspective of the side
    /// to move, and writes one non-negative prior per move into `priors`
    /// (aligned with `moves`).
    /// The caller normalizes the priors; if they sum to zero or less, it
    /// falls back to a uniform distribution, so an implementation with no
    /// policy head can simply leave the buffer zeroed.
    fn evaluate(&self, pos: &Position, moves: &[Move], priors: &mut [f32]) -> f32;
}

/// An evaluator with no knowledge at all: every position is even and every
/// move is equally promising.
/// Reduces the search to vanilla UCT; useful as a baseline and in tests.
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _pos: &Position, _moves: &[Move], priors: &mut [f32]) -> f32 {
        priors.iter_mut().for_each(|p| *p = 1.0);
        0.0
    }
}
