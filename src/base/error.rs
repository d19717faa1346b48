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

//! Errors surfaced by the parsers and by the checked move paths.
//!
//! The hot paths (`make_move`, `undo_move`, `legal_moves`) are infallible on
//! legal input and never construct these; only the notation parsers and the
//! checked `try_` variants do.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
/// An error produced while parsing a TPS position or a PTN move token.
pub enum ParseError {
    #[error("expected 6 rows in TPS board, got {0}")]
    BadRowCount(usize),
    #[error("expected 6 squares in TPS row, got {0}")]
    BadColumnCount(usize),
    #[error("unrecognized character {0:?} in TPS stack")]
    BadPieceToken(char),
    #[error("TPS stack modifier must follow a stone and end the cell")]
    BadStackModifier,
    #[error("unrecognized player to move {0:?}")]
    BadTurn(String),
    #[error("could not parse move number {0:?}")]
    BadMoveNumber(String),
    #[error("missing field in TPS string")]
    MissingField,
    #[error("unrecognized square name {0:?}")]
    BadSquare(String),
    #[error("unrecognized slide direction {0:?}")]
    BadDirection(char),
    #[error("drop counts {drops:?} do not sum to pickup count {count}")]
    BadDropCounts { count: u8, drops: String },
    #[error("empty or malformed move token {0:?}")]
    BadMoveToken(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
/// An error produced by the checked make/undo path.
/// The unchecked path treats all of these conditions as programmer errors.
pub enum MoveError {
    #[error("move is not applicable at its origin square")]
    InvalidPosition,
    #[error("stone kind cannot be placed")]
    InvalidStone,
    #[error("wrong color attempting to move")]
    InvalidColor,
    #[error("malformed slide pattern")]
    InvalidPattern,
    #[error("slide picks up more stones than available")]
    InvalidCount,
    #[error("slide ends on a wall without a legal crush")]
    InvalidCrush,
    #[error("slide passes through a blocking stone or leaves the board")]
    InvalidSlide,
}
