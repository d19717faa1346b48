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

//! Magic bitboards, used for computing the squares a slide can reach.
//!
//! Walls and capstones block slides.  For each square, the set of squares a
//! slide could reach (the squares strictly before the first blocker along
//! each of the four rays) is a function of the blockers on that square's row
//! and column; hashing the masked blocker set with a per-square magic
//! multiplier indexes a packed table of precomputed reach sets.
//!
//! Unlike the rook tables of chess engines, the blocker mask includes the
//! outer edge squares: a Tak slide stops *before* a blocker rather than
//! capturing it, so a wall on the far edge changes the answer.
//!
//! The tables are constructed once at startup from a fixed-seed RNG, so
//! every run of the engine uses identical magics.

use super::{Bitboard, Direction, Square};

use once_cell::sync::Lazy;

/// Every square on a 6x6 board sees five row squares and five column
/// squares, so every blocker mask has exactly ten relevant bits.
const MASK_BITS: u8 = 10;

/// The number of random multipliers to try per square before giving up.
const NUM_MAGIC_TRIES: u32 = 1_000_000;

/// The seed for the magic search.
/// Fixed so that table construction is deterministic.
const MAGIC_SEED: u64 = 0x8e51_3e1f_30b0_a6e1;

/// A lookup table for computing slide reach from one square.
struct Magic {
    /// The mask for extracting out the relevant blockers on a board.
    mask: Bitboard,
    /// The magic multiply constant for converting blocker sets to indices.
    magic: u64,
    /// The packed table of reach sets, indexed by hashed blocker set.
    reach: Vec<Bitboard>,
}

/// The ray of squares leaving `sq` in each direction, indexed by
/// `[square][direction]`.
static RAYS: [[Bitboard; 4]; 36] = {
    let mut rays = [[Bitboard::EMPTY; 4]; 36];
    let mut i = 0u8;
    while i < 36 {
        let mut d = 0u8;
        while d < 4 {
            let dir = Direction::from_bits(d);
            let mut ray = Bitboard::EMPTY;
            // SAFETY: `i` is always in the range of a square index.
            let mut sq = unsafe { std::mem::transmute::<u8, Square>(i) };
            while let Some(next) = sq.next(dir) {
                ray = ray.with_square(next);
                sq = next;
            }
            rays[i as usize][d as usize] = ray;
            d += 1;
        }
        i += 1;
    }
    rays
};

static MAGICS: Lazy<[Magic; 36]> = Lazy::new(|| std::array::from_fn(make_magic));

#[must_use]
/// Get the ray of squares leaving `sq` in direction `dir`, not including
/// `sq` itself.
pub fn ray(sq: Square, dir: Direction) -> Bitboard {
    RAYS[sq as usize][dir as usize]
}

#[must_use]
/// Compute the set of squares that a slide starting at `sq` can reach when
/// the walls and capstones of the board are `blockers`: the union over the
/// four rays of the squares strictly before the first blocker.
///
/// # Examples
///
/// ```
/// use haliax::base::{magic::slide_reach, Bitboard, Square};
///
/// // with no blockers, a slide from a1 can reach its whole row and column
/// assert_eq!(slide_reach(Square::A1, Bitboard::EMPTY).len(), 10);
/// ```
pub fn slide_reach(sq: Square, blockers: Bitboard) -> Bitboard {
    let magic = &MAGICS[sq as usize];
    let key = magic_key(blockers & magic.mask, magic.magic);
    // The key is always in bounds: it is a 10-bit hash of a 10-bit mask.
    magic.reach[key]
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
/// Compute the number of squares a slide from `sq` in direction `dir` can
/// travel before hitting a blocker or the board edge.
pub fn num_steps(sq: Square, dir: Direction, blockers: Bitboard) -> u8 {
    (slide_reach(sq, blockers) & ray(sq, dir)).len()
}

/// Use magic hashing to get the index to look up reach sets.
#[allow(clippy::cast_possible_truncation)]
fn magic_key(blockers: Bitboard, magic: u64) -> usize {
    (blockers.as_u64().wrapping_mul(magic) >> (64 - MASK_BITS)) as usize
}

/// Compute the reach of a slide the slow way, by walking each ray until a
/// blocker or the board edge.
/// Used to seed the packed tables and as a reference in tests.
fn directional_reach(sq: Square, blockers: Bitboard) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    for dir in Direction::ALL {
        let mut cur = sq;
        while let Some(next) = cur.next(dir) {
            if blockers.contains(next) {
                break;
            }
            result.insert(next);
            cur = next;
        }
    }
    result
}

/// Given some mask, create the blocker `Bitboard` according to this index.
///
/// `index` must be less than 2 ^ (number of ones in `mask`).
/// Each bit of `index` selects whether the corresponding mask square (in
/// ascending order) holds a blocker.
fn index_to_blockers(index: usize, mask: Bitboard) -> Bitboard {
    let mut result = 0u64;
    let mut editable_mask = mask.as_u64();
    let mut i = 0;
    while editable_mask != 0 {
        let occupier = 1 << editable_mask.trailing_zeros();
        editable_mask &= !occupier;
        if index & (1 << i) != 0 {
            result |= occupier;
        }
        i += 1;
    }
    Bitboard::new(result)
}

/// Search for a working magic for one square and fill its packed table.
///
/// # Panics
///
/// This function will panic if no collision-free multiplier is found within
/// [`NUM_MAGIC_TRIES`] attempts; with a fixed seed this either always
/// happens or never does.
fn make_magic(sq_idx: usize) -> Magic {
    let sq = Square::try_from(sq_idx as u8).unwrap();
    let mask = ray(sq, Direction::North)
        | ray(sq, Direction::South)
        | ray(sq, Direction::East)
        | ray(sq, Direction::West);
    debug_assert_eq!(mask.len(), MASK_BITS);

    // enumerate every blocker arrangement and its reach up front
    let num_arrangements = 1usize << MASK_BITS;
    let mut blocker_sets = vec![Bitboard::EMPTY; num_arrangements];
    let mut reaches = vec![Bitboard::EMPTY; num_arrangements];
    for i in 0..num_arrangements {
        blocker_sets[i] = index_to_blockers(i, mask);
        reaches[i] = directional_reach(sq, blocker_sets[i]);
    }

    // every square derives its trial sequence from the same fixed seed
    let rng = fastrand::Rng::with_seed(MAGIC_SEED.wrapping_add(sq_idx as u64));
    let mut table = vec![Bitboard::EMPTY; num_arrangements];
    let mut used = vec![false; num_arrangements];
    for _ in 0..NUM_MAGIC_TRIES {
        // sparse multipliers hash low-entropy masks much better
        let magic = rng.u64(..) & rng.u64(..) & rng.u64(..);

        used.iter_mut().for_each(|u| *u = false);
        let mut collided = false;
        for i in 0..num_arrangements {
            let key = magic_key(blocker_sets[i], magic);
            if !used[key] {
                used[key] = true;
                table[key] = reaches[i];
            } else if table[key] != reaches[i] {
                collided = true;
                break;
            }
        }

        if !collided {
            // rebuild the table cleanly: the failed trials left stale entries
            for i in 0..num_arrangements {
                table[magic_key(blocker_sets[i], magic)] = reaches[i];
            }
            return Magic {
                mask,
                magic,
                reach: table,
            };
        }
    }
    panic!("failed to find a magic multiplier for square {sq}");
}
