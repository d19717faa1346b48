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

//! Squares, which identify one of the 36 locations on the board.

use super::Direction;

use std::{
    fmt::{Display, Formatter},
    mem::transmute,
};

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// A square: one of 36 spots on the board that a stack can occupy.
//  Internally, `Square`s are represented as a single integer equal to
//  `rank * 6 + file`, with file a at 0 and rank 1 at 0.
pub enum Square {
    A1 = 0,
    B1 = 1,
    C1 = 2,
    D1 = 3,
    E1 = 4,
    F1 = 5,
    A2 = 6,
    B2 = 7,
    C2 = 8,
    D2 = 9,
    E2 = 10,
    F2 = 11,
    A3 = 12,
    B3 = 13,
    C3 = 14,
    D3 = 15,
    E3 = 16,
    F3 = 17,
    A4 = 18,
    B4 = 19,
    C4 = 20,
    D4 = 21,
    E4 = 22,
    F4 = 23,
    A5 = 24,
    B5 = 25,
    C5 = 26,
    D5 = 27,
    E5 = 28,
    F5 = 29,
    A6 = 30,
    B6 = 31,
    C6 = 32,
    D6 = 33,
    E6 = 34,
    F6 = 35,
}

impl Square {
    #[must_use]
    /// Get the integer representing the rank (0 -> 1, ...) of this square.
    pub const fn rank(self) -> u8 {
        self as u8 / 6
    }

    #[must_use]
    /// Get the integer representing the file (0 -> a, ...) of this square.
    pub const fn file(self) -> u8 {
        self as u8 % 6
    }

    #[must_use]
    /// Construct a square from a rank and file, both in the range `0..6`.
    /// Returns `None` if either coordinate is out of bounds.
    pub const fn new(rank: u8, file: u8) -> Option<Square> {
        if rank >= 6 || file >= 6 {
            return None;
        }
        // SAFETY: The index is in the range 0..36, which is how a square is
        // represented.
        Some(unsafe { transmute::<u8, Square>(rank * 6 + file) })
    }

    #[must_use]
    /// Get the neighboring square one step in direction `dir`, or `None` if
    /// that step leaves the board.
    ///
    /// # Examples
    ///
    /// ```
    /// use haliax::base::{Direction, Square};
    ///
    /// assert_eq!(Square::A1.next(Direction::North), Some(Square::A2));
    /// assert_eq!(Square::F1.next(Direction::East), None);
    /// ```
    pub const fn next(self, dir: Direction) -> Option<Square> {
        let idx = self as u8;
        match dir {
            Direction::North => {
                if idx >= 30 {
                    None
                } else {
                    Some(unsafe { transmute::<u8, Square>(idx + 6) })
                }
            }
            Direction::South => {
                if idx < 6 {
                    None
                } else {
                    Some(unsafe { transmute::<u8, Square>(idx - 6) })
                }
            }
            Direction::East => {
                if idx % 6 == 5 {
                    None
                } else {
                    Some(unsafe { transmute::<u8, Square>(idx + 1) })
                }
            }
            Direction::West => {
                if idx % 6 == 0 {
                    None
                } else {
                    Some(unsafe { transmute::<u8, Square>(idx - 1) })
                }
            }
        }
    }

    #[must_use]
    /// Get the square `n` steps in direction `dir` from this one, or `None`
    /// if any step leaves the board.
    pub const fn nth(self, dir: Direction, n: u8) -> Option<Square> {
        let mut sq = self;
        let mut i = 0;
        while i < n {
            sq = match sq.next(dir) {
                Some(s) => s,
                None => return None,
            };
            i += 1;
        }
        Some(sq)
    }

    #[must_use]
    /// Get the name of this square's file (`'a'` through `'f'`).
    pub const fn file_name(self) -> char {
        (b'a' + self.file()) as char
    }
}

impl TryFrom<u8> for Square {
    type Error = ();

    fn try_from(value: u8) -> Result<Square, Self::Error> {
        if value < 36 {
            // SAFETY: We checked that the value is in the range 0..36.
            Ok(unsafe { transmute::<u8, Square>(value) })
        } else {
            Err(())
        }
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_name(), self.rank() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names() {
        assert_eq!(Square::A1.to_string(), "a1");
        assert_eq!(Square::F6.to_string(), "f6");
        assert_eq!(Square::C4.to_string(), "c4");
    }

    #[test]
    /// Test that stepping off any edge of the board returns `None`.
    fn edges_are_closed() {
        for file in 0..6 {
            let bottom = Square::new(0, file).unwrap();
            let top = Square::new(5, file).unwrap();
            assert_eq!(bottom.next(Direction::South), None);
            assert_eq!(top.next(Direction::North), None);
        }
        for rank in 0..6 {
            let west = Square::new(rank, 0).unwrap();
            let east = Square::new(rank, 5).unwrap();
            assert_eq!(west.next(Direction::West), None);
            assert_eq!(east.next(Direction::East), None);
        }
    }

    #[test]
    fn nth_walks_a_rank() {
        assert_eq!(Square::A1.nth(Direction::East, 5), Some(Square::F1));
        assert_eq!(Square::A1.nth(Direction::East, 6), None);
        assert_eq!(Square::A1.nth(Direction::North, 0), Some(Square::A1));
    }
}
