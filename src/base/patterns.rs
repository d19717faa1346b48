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

//! Precomputed slide drop patterns.
//!
//! A drop pattern is read from its most significant set bit (the header)
//! downward: a `1` advances one square and drops the next stone of the carry,
//! a `0` drops another stone on the current square.
//! The header's bit index is one less than the number of stones picked up,
//! and the number of set bits is the number of squares traveled.
//!
//! The tables here are cumulative so that the move generator can emit an
//! entire square/direction with a single slice: the entry for
//! `(max_pickup, max_steps)` holds every pattern whose pickup is at most
//! `max_pickup` and whose travel is at most `max_steps`.

use once_cell::sync::Lazy;

/// The largest carry a stack can slide with, equal to the board size.
pub const MAX_PICKUP: u8 = 6;

/// Every nonzero drop pattern fits in the low six bits: a header above bit 5
/// would pick up more than [`MAX_PICKUP`] stones.
const PATTERN_LIMIT: u8 = (1 << MAX_PICKUP) - 1;

/// The precomputed pattern lists.
struct PatternTables {
    /// Patterns with pickup at most `k` and travel at most `s`, indexed by
    /// `[k - 1][s - 1]`.
    normal: [[Vec<u8>; 6]; 6],
    /// Patterns for a slide toward a wall `s + 1` squares away by a stack
    /// whose top is a capstone, indexed by `[k - 1][s]`: the normal patterns
    /// of travel at most `s`, followed by the crush patterns of travel
    /// exactly `s + 1` that end with a lone final drop.
    combined: [[Vec<u8>; 6]; 6],
}

/// The number of stones picked up by a pattern.
#[allow(clippy::cast_possible_truncation)]
const fn pickup_of(pattern: u8) -> u8 {
    8 - pattern.leading_zeros() as u8
}

/// The number of squares traveled by a pattern.
#[allow(clippy::cast_possible_truncation)]
const fn steps_of(pattern: u8) -> u8 {
    pattern.count_ones() as u8
}

static TABLES: Lazy<PatternTables> = Lazy::new(|| {
    let mut tables = PatternTables {
        normal: Default::default(),
        combined: Default::default(),
    };
    for k in 1..=MAX_PICKUP {
        for s in 1..=6u8 {
            let list: Vec<u8> = (1..=PATTERN_LIMIT)
                .filter(|&p| pickup_of(p) <= k && steps_of(p) <= s)
                .collect();
            tables.normal[(k - 1) as usize][(s - 1) as usize] = list;
        }
        for s in 0..=5u8 {
            // every legal non-crushing pattern, then every crush: travel
            // exactly s + 1 squares, final drop a single stone (the capstone
            // lands alone on the wall)
            let mut list = if s >= 1 {
                tables.normal[(k - 1) as usize][(s - 1) as usize].clone()
            } else {
                Vec::new()
            };
            list.extend(
                (1..=PATTERN_LIMIT)
                    .filter(|&p| pickup_of(p) <= k && steps_of(p) == s + 1 && p & 1 == 1),
            );
            tables.combined[(k - 1) as usize][s as usize] = list;
        }
    }
    tables
});

/// Get every drop pattern with pickup at most `max_pickup` and travel at most
/// `max_steps`.
///
/// # Panics
///
/// This function will panic if `max_pickup` is not in `1..=6` or `max_steps`
/// is not in `1..=6`.
#[must_use]
pub fn slide_patterns(max_pickup: u8, max_steps: u8) -> &'static [u8] {
    &TABLES.normal[(max_pickup - 1) as usize][(max_steps - 1) as usize]
}

/// Get every drop pattern for a slide with pickup at most `max_pickup` toward
/// a wall `free_steps + 1` squares away, including the crushing patterns.
///
/// # Panics
///
/// This function will panic if `max_pickup` is not in `1..=6` or `free_steps`
/// is not in `0..=5`.
#[must_use]
pub fn combined_patterns(max_pickup: u8, free_steps: u8) -> &'static [u8] {
    &TABLES.combined[(max_pickup - 1) as usize][free_steps as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The binomial coefficient `n` choose `r`.
    fn choose(n: u8, r: u8) -> usize {
        if r > n {
            return 0;
        }
        let mut result = 1usize;
        for i in 0..r {
            result = result * (n - i) as usize / (i + 1) as usize;
        }
        result
    }

    /// The number of patterns with pickup exactly `k` and travel at most `s`.
    fn stratum_size(k: u8, s: u8) -> usize {
        (0..=(k - 1).min(s - 1)).map(|j| choose(k - 1, j)).sum()
    }

    #[test]
    /// Test that the cumulative table sizes match the closed form summed over
    /// pickup counts.
    fn normal_table_sizes() {
        for k in 1..=6 {
            for s in 1..=6 {
                let expected: usize = (1..=k).map(|k2| stratum_size(k2, s)).sum();
                assert_eq!(
                    slide_patterns(k, s).len(),
                    expected,
                    "pickup {k} steps {s}"
                );
            }
        }
    }

    #[test]
    /// Test that the full table contains every expressible pattern exactly
    /// once.
    fn full_table_is_everything() {
        assert_eq!(slide_patterns(6, 6).len(), 63);
    }

    #[test]
    /// Test that a single stone can only step one square.
    fn single_stone_patterns() {
        for s in 1..=6 {
            assert_eq!(slide_patterns(1, s), &[0b1]);
        }
    }

    #[test]
    /// Test the exact pattern set used by a 2-stone stack with 2 free
    /// squares.
    fn two_stone_two_step_patterns() {
        assert_eq!(slide_patterns(2, 2), &[0b01, 0b10, 0b11]);
    }

    #[test]
    /// Test that every crush entry travels one past the free squares and
    /// drops a single final stone.
    fn combined_crush_entries() {
        for k in 1..=6u8 {
            for s in 0..=5u8 {
                let normal_len = if s >= 1 { slide_patterns(k, s).len() } else { 0 };
                for &p in &combined_patterns(k, s)[normal_len..] {
                    assert_eq!(steps_of(p), s + 1);
                    assert_eq!(p & 1, 1);
                    assert!(pickup_of(p) <= k);
                }
            }
        }
    }

    #[test]
    /// Test that an adjacent wall admits exactly the lone-capstone crush.
    fn adjacent_wall_crush() {
        for k in 1..=6 {
            assert_eq!(combined_patterns(k, 0), &[0b1]);
        }
    }
}
