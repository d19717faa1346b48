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

//! The tree search: a single-threaded PUCT Monte-Carlo tree search with a
//! transposition table and terminal proving.

mod evaluate;
pub use evaluate::{Evaluator, UniformEvaluator};

mod limit;
pub use limit::SearchLimit;

mod search;
pub use search::{SearchError, SearchLimits, Searcher};

mod time;

mod transposition;
