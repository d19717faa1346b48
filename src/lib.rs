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

#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

//! Haliax is an engine for the board game Tak, played on a 6x6 board.
//!
//! The crate is split into two halves: [`base`], which contains the board
//! representation, move generation, terminal detection, and notation I/O; and
//! [`engine`], which contains the Monte-Carlo tree search built on top of the
//! board core.
//!
//! Haliax is a library.
//! Frontends (such as a TEI driver or a self-play generator) are expected to
//! live in their own crates and consume the operations re-exported here.

pub mod base;
pub mod engine;
