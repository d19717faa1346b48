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

//! Time management heuristics.
//!
//! Under clock control the engine must decide for itself how much of its
//! remaining time one move deserves.
//! Haliax is not yet clever about position complexity; it rations time
//! indiscriminately, spending a fixed fraction of the remaining clock plus
//! most of the increment.

use std::cmp::min;

#[must_use]
#[allow(
    clippy::module_name_repetitions,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
/// Decide how many milliseconds to spend on one move, given the remaining
/// clock and the per-move increment, both in milliseconds.
pub fn get_search_time(increment: u64, remaining: u64) -> u64 {
    // a Tak game on 6x6 rarely runs past 60 plies per side; budget a
    // conservative slice and never eat too deep into the remaining clock
    let rem_float = remaining as f64;
    min(remaining / 30 + increment, (0.9 * rem_float) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_scales_with_clock() {
        assert_eq!(get_search_time(0, 60_000), 2_000);
        assert_eq!(get_search_time(2_000, 60_000), 4_000);
    }

    #[test]
    /// Test that the budget never consumes nearly the whole clock, even when
    /// the increment dwarfs it.
    fn budget_never_flags() {
        assert!(get_search_time(10_000, 100) <= 90);
    }
}
