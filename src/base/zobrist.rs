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

//! Hash key generation for positions.
//!
//! The hash of a position is the XOR of one key per visible piece: for each
//! square, the top [`HASH_DEPTH`] pieces of its stack contribute
//! `key(square, color, kind, depth)`, with depth 0 at the top.
//! Pieces buried deeper than the window do not contribute; positions whose
//! stacks agree in their top seven pieces everywhere hash equal.
//! This is a deliberate approximation for transposition caching, not an
//! identity on game states.

use super::{Color, Square, StoneKind};

/// The number of pieces per square that contribute to the hash, counted from
/// the top of the stack.
pub const HASH_DEPTH: u8 = 7;

/// The seed for the key table.
const KEY_SEED: u64 = 0x9192_4a35_07b7_aa35;

/// Advance a SplitMix64 state and produce its next output.
const fn splitmix64(state: u64) -> (u64, u64) {
    let state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    (state, z ^ (z >> 31))
}

/// The key table, indexed by square, color, kind, and depth from the top of
/// the stack.
static SQUARE_KEYS: [[[[u64; HASH_DEPTH as usize]; 3]; 2]; 36] = {
    let mut keys = [[[[0u64; HASH_DEPTH as usize]; 3]; 2]; 36];
    let mut state = KEY_SEED;
    let mut sq = 0;
    while sq < 36 {
        let mut color = 0;
        while color < 2 {
            let mut kind = 0;
            while kind < 3 {
                let mut depth = 0;
                while depth < HASH_DEPTH as usize {
                    let (next_state, key) = splitmix64(state);
                    state = next_state;
                    keys[sq][color][kind][depth] = key;
                    depth += 1;
                }
                kind += 1;
            }
            color += 1;
        }
        sq += 1;
    }
    keys
};

#[inline(always)]
#[must_use]
/// Get the Zobrist key for a piece of the given color and kind sitting
/// `depth` places below the top of the stack on `sq`.
/// `depth` must be less than [`HASH_DEPTH`].
pub fn piece_key(sq: Square, color: Color, kind: StoneKind, depth: u8) -> u64 {
    // Because sq, color, and kind are all enums with fixed ranges and depth
    // is bounded by the caller, we can perform an unchecked get on these
    // indices.
    debug_assert!(depth < HASH_DEPTH);
    unsafe {
        *SQUARE_KEYS
            .get_unchecked(sq as usize)
            .get_unchecked(color as usize)
            .get_unchecked(kind as usize)
            .get_unchecked(depth as usize)
    }
}
