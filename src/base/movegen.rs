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

//! Generation of legal moves.

use super::{
    magic::{ray, slide_reach},
    patterns::{combined_patterns, slide_patterns},
    Bitboard, Direction, Move, Position, Square, StoneKind,
};

use arrayvec::ArrayVec;

/// The capacity of a move buffer.
/// The board cannot hold enough stones for the theoretical per-square
/// maximum on every square at once, so this bound is never reached.
pub const MOVE_BUFFER_LEN: usize = 4096;

/// A fixed-capacity buffer of moves, filled by [`legal_moves`].
pub type MoveList = ArrayVec<Move, MOVE_BUFFER_LEN>;

/// Enumerate every legal move in `pos`, appending them to `moves`.
///
/// The generator performs no allocation; callers are expected to reuse the
/// buffer across calls.
///
/// # Examples
///
/// ```
/// use haliax::base::{legal_moves, MoveList, Position};
///
/// let pos = Position::new();
/// let mut moves = MoveList::new();
/// legal_moves(&pos, &mut moves);
/// // the first ply can only place a flat on each of the 36 squares
/// assert_eq!(moves.len(), 36);
/// ```
pub fn legal_moves(pos: &Position, moves: &mut MoveList) {
    if pos.half_moves() < 2 {
        // the opening swap: only flat placements, of the opponent's color
        for sq in pos.empty_squares() {
            moves.push(Move::place(sq, StoneKind::Flat));
        }
        return;
    }

    let mover = pos.to_move();
    let has_flats = pos.flat_reserve(mover) > 0;
    let has_capstone = pos.capstone_reserve(mover) > 0;
    for sq in pos.empty_squares() {
        if has_flats {
            moves.push(Move::place(sq, StoneKind::Flat));
            moves.push(Move::place(sq, StoneKind::Standing));
        }
        if has_capstone {
            moves.push(Move::place(sq, StoneKind::Capstone));
        }
    }

    let blockers = pos.standing_stones() | pos.capstone_squares();
    for sq in pos.control(mover) {
        let max_pickup = pos.stack(sq).len().min(6);
        let can_crush = pos.capstone_squares().contains(sq);
        let reach = slide_reach(sq, blockers);

        for dir in Direction::ALL {
            let free = num_steps_cached(reach, sq, dir);
            let max_steps = free.min(max_pickup);

            let wall_next = max_steps < 6
                && sq
                    .nth(dir, max_steps + 1)
                    .is_some_and(|beyond| pos.standing_stones().contains(beyond));
            let patterns = if can_crush && wall_next {
                combined_patterns(max_pickup, max_steps)
            } else if max_steps >= 1 {
                slide_patterns(max_pickup, max_steps)
            } else {
                continue;
            };
            for &pattern in patterns {
                moves.push(Move::slide(sq, dir, pattern));
            }
        }
    }
}

/// Count the steps available along one direction of an already computed
/// reach set.
fn num_steps_cached(reach: Bitboard, sq: Square, dir: Direction) -> u8 {
    (reach & ray(sq, dir)).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{tps, Square};

    /// Generate the legal moves of a TPS position into a fresh buffer.
    fn moves_of(tps: &str) -> MoveList {
        let pos = Position::from_tps(tps).unwrap();
        let mut moves = MoveList::new();
        legal_moves(&pos, &mut moves);
        moves
    }

    #[test]
    /// Test that the starting position admits exactly the 36 flat
    /// placements.
    fn initial_position() {
        let moves = moves_of(tps::START_TPS);
        assert_eq!(moves.len(), 36);
        assert!(moves.iter().all(|m| m.is_place() && m.kind() == StoneKind::Flat));
    }

    #[test]
    /// Test the wall-locked position from the reference suite: 15
    /// placements plus 3 eastward slides, per scenario 1.
    fn wall_locked_position() {
        let moves = moves_of(tps::WALL_LOCKED_TPS);
        assert_eq!(moves.len(), 18);

        let slides: Vec<Move> = moves.iter().copied().filter(|m| !m.is_place()).collect();
        assert_eq!(slides.len(), 3);
        assert!(slides
            .iter()
            .all(|m| m.square() == Square::A1 && m.direction() == Direction::East));
    }

    #[test]
    /// Test that every generated move passes the checked make path and that
    /// no legal move is missed, by cross-checking against a brute-force scan
    /// of the whole move space.
    fn generator_matches_checked_path() {
        for tps in [
            tps::WALL_LOCKED_TPS,
            tps::CRUSH_READY_TPS,
            tps::TALL_STACK_TPS,
            "[TPS x6/x6/2,1,x4/x2,21S,1C,x2/x6/x6 2 7]",
        ] {
            let pos = Position::from_tps(tps).unwrap();
            let mut moves = MoveList::new();
            legal_moves(&pos, &mut moves);

            // every generated move must validate and round-trip
            for &m in &moves {
                let mut scratch = pos.clone();
                scratch
                    .try_make_move(m)
                    .unwrap_or_else(|e| panic!("{tps}: generated illegal {m}: {e}"));
                scratch.undo_move(m);
                assert_eq!(scratch, pos);
            }

            // every encodable move that validates must have been generated
            let mut count = 0usize;
            for raw in 0..=u16::MAX {
                let m = Move::from_val(raw);
                if (m.square() as u16) != raw & 0x3F {
                    continue; // square field was out of range
                }
                if m.is_place() {
                    if (raw >> 6) & 3 > 2 {
                        continue; // kind field was out of range
                    }
                } else if m.pickup() > 6 {
                    continue;
                }
                let mut scratch = pos.clone();
                if scratch.try_make_move(m).is_ok() {
                    count += 1;
                    assert!(moves.contains(&m), "{tps}: generator missed {m}");
                }
            }
            assert_eq!(moves.len(), count, "{tps}: generator over-produced");
        }
    }

    #[test]
    /// Test that a capstone next to a wall is offered the crushing slide.
    fn crush_is_generated() {
        let moves = moves_of(tps::CRUSH_READY_TPS);
        let crush = Move::from_ptn("1a1+").unwrap();
        assert!(moves.contains(&crush));
    }

    #[test]
    /// Test that placements stop when a reserve empties.
    fn exhausted_reserves_limit_placements() {
        // White's flat reserve is empty; only the capstone may be placed
        let mut all_white = String::new();
        for rank in 0..6 {
            if rank > 0 {
                all_white.push('/');
            }
            all_white.push_str(if rank < 5 { "1,1,1,1,1,1" } else { "1,1,1,1,1,x" });
        }
        let tps = format!("[TPS {} 1 16]", &all_white);
        let moves = moves_of(&tps);
        assert!(moves
            .iter()
            .filter(|m| m.is_place())
            .all(|m| m.kind() == StoneKind::Capstone));
    }
}
