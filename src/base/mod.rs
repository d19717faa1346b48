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

//! Shared data types and basic board definitions found across the entire
//! Haliax engine.

// Many module elements are re-exported to make names more ergonomic to access.

mod bitboard;
pub use bitboard::Bitboard;

mod color;
pub use color::Color;

mod direction;
pub use direction::Direction;

mod error;
pub use error::{MoveError, ParseError};

pub mod magic;

mod moves;
pub use moves::Move;

pub mod movegen;
pub use movegen::{legal_moves, MoveList};

pub mod patterns;

mod piece;
pub use piece::{Piece, Stack, StoneKind};

pub mod perft;

mod position;
pub use position::{GameResult, Position};

mod square;
pub use square::Square;

pub mod tps;

pub mod zobrist;

/// The number of squares along one edge of the board.
pub const BOARD_SIZE: usize = 6;

/// The number of squares on the board.
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
