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

//! Perft, the enumerative move-count test.
//!
//! Perft counts the leaves of the full game tree to a fixed depth; comparing
//! against known-good totals catches nearly any move generation or
//! make/undo defect.

use super::{legal_moves, GameResult, MoveList, Position};

use std::time::Instant;

#[allow(clippy::cast_precision_loss)]
/// Run a perft to the given depth from a TPS position and report its speed
/// through the logging facade.
///
/// # Panics
///
/// This function will panic if `tps` is not a legal TPS string.
#[must_use]
pub fn perft(tps: &str, depth: u8) -> u64 {
    let mut pos = Position::from_tps(tps).unwrap();
    let tic = Instant::now();
    let num_nodes = perft_search(&mut pos, depth);
    let time = tic.elapsed();
    let speed = num_nodes as f64 / time.as_secs_f64();
    log::debug!(
        "perft({depth}) = {num_nodes} in {:.2} secs: {speed:.0} nodes/sec",
        time.as_secs_f64()
    );

    num_nodes
}

/// The core search algorithm for perft.
/// Terminal positions are counted where they stand; the game tree does not
/// continue past a win.
fn perft_search(pos: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    if pos.terminal() != GameResult::Ongoing {
        return 1;
    }
    let mut moves = MoveList::new();
    legal_moves(pos, &mut moves);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut total = 0;
    for m in moves {
        #[cfg(debug_assertions)]
        let snapshot = pos.clone();

        pos.make_move(m);
        total += perft_search(pos, depth - 1);
        pos.undo_move(m);

        #[cfg(debug_assertions)]
        debug_assert_eq!(*pos, snapshot, "make/undo of {m} did not round-trip");
    }

    total
}
