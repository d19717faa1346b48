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

//! The four cardinal directions that a stack can slide in.

use std::mem::transmute;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// A direction of travel on the board.
/// North is toward rank 6, east is toward file f.
///
/// The discriminant doubles as the 2-bit direction field of a slide
/// [`Move`](super::Move).
pub enum Direction {
    North = 0,
    South = 1,
    East = 2,
    West = 3,
}

impl Direction {
    /// All four directions, in discriminant order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[must_use]
    /// Reconstruct a direction from its 2-bit encoding.
    /// Only the low two bits of `bits` are used.
    pub const fn from_bits(bits: u8) -> Direction {
        // SAFETY: Masking to two bits keeps the value in the range of the
        // four discriminants.
        unsafe { transmute::<u8, Direction>(bits & 3) }
    }

    #[must_use]
    /// Get the PTN character for this direction (`+`, `-`, `>`, or `<`).
    pub const fn ptn_char(self) -> char {
        match self {
            Direction::North => '+',
            Direction::South => '-',
            Direction::East => '>',
            Direction::West => '<',
        }
    }

    #[must_use]
    /// Get the direction denoted by a PTN character, if there is one.
    pub const fn from_ptn_char(c: char) -> Option<Direction> {
        match c {
            '+' => Some(Direction::North),
            '-' => Some(Direction::South),
            '>' => Some(Direction::East),
            '<' => Some(Direction::West),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_bits(dir as u8), dir);
        }
    }

    #[test]
    fn ptn_chars_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_ptn_char(dir.ptn_char()), Some(dir));
        }
        assert_eq!(Direction::from_ptn_char('x'), None);
    }
}
