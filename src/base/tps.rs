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

//! A collection of TPS strings for benchmark and testing purposes.

/// The TPS of the empty starting position.
pub const START_TPS: &str = "[TPS x6/x6/x6/x6/x6/x6 1 1]";

/// A position where walls lock down nearly the whole board: White's only
/// moves are five placements in three flavors and three slides of the a1
/// stack eastward, 18 moves in all.
pub const WALL_LOCKED_TPS: &str =
    "[TPS 2S,2S,2S,2S,2S,2S/1S,1S,1S,1S,1S,1S/2S,2S,2S,2S,2S,2S/1S,1S,1S,1S,1S,1S/2S,2S,2S,2S,2S,2S/11,x5 1 3]";

/// A completed black road down the a-file.
pub const BLACK_ROAD_TPS: &str = "[TPS 2,x5/2,x5/2,x5/2,x5/2,x5/2,x5 2 2]";

/// A board covered entirely in white flats; a flat win for White at any
/// komi.
pub const WHITE_FLAT_WIN_TPS: &str =
    "[TPS 1,1,1,1,1,1/1,1,1,1,1,1/1,1,1,1,1,1/1,1,1,1,1,1/1,1,1,1,1,1/1,1,1,1,1,1 1 1]";

/// A full board of mostly walls where White leads the flat count 5 to 1.
pub const WHITE_FLAT_COUNT_TPS: &str =
    "[TPS 2S,2S,2S,2S,2S,2S/1S,1S,1S,1S,1S,1S/2S,2S,2S,2S,2S,2S/1S,1S,1S,1S,1S,1S/2S,2S,2S,2S,2S,2S/11,2,1,1,1,1 2 6]";

/// A white capstone on a1 below a black wall on a2, set up for the crushing
/// slide `1a1+*`.
pub const CRUSH_READY_TPS: &str = "[TPS x6/x6/x6/x6/2S,x5/1C,x5 1 3]";

/// A tall mixed stack on c3 with room to spread in every direction.
pub const TALL_STACK_TPS: &str = "[TPS x6/x6/x6/x2,12211C,x3/x6/x6 1 9]";

/// White threatens to finish a road across rank 1 by a single placement on
/// e1.
pub const WHITE_ROAD_IN_ONE_TPS: &str = "[TPS x6/x6/x6/x6/x6/1,1,1,1,x,1 1 9]";
