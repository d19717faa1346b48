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

//! Search limiting.
//!
//! The search itself is single-threaded and run-to-completion; the only
//! cross-thread communication is the stop flag, which a frontend may set
//! from another thread to interrupt a search at the next iteration
//! boundary.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
/// A limit on how long a search runs: an iteration cap, an optional
/// wall-clock deadline, and an externally settable stop flag.
/// Polled between iterations, never inside one.
pub struct SearchLimit {
    /// Whether the search has been told to stop.
    /// The only field a collaborator may touch from another thread.
    over: AtomicBool,
    /// The maximum number of PUCT iterations to run.
    iteration_cap: u64,
    /// The time at which the search must return, if it is timed.
    deadline: Option<Instant>,
}

impl SearchLimit {
    #[must_use]
    /// Create a limit which allows `iteration_cap` iterations and, if
    /// `deadline` is given, stops at that instant regardless.
    pub fn new(iteration_cap: u64, deadline: Option<Instant>) -> SearchLimit {
        SearchLimit {
            over: AtomicBool::new(false),
            iteration_cap,
            deadline,
        }
    }

    #[must_use]
    /// Create a limit which only caps iterations.
    pub fn iterations(iteration_cap: u64) -> SearchLimit {
        SearchLimit::new(iteration_cap, None)
    }

    #[must_use]
    /// Get the iteration cap.
    pub const fn iteration_cap(&self) -> u64 {
        self.iteration_cap
    }

    /// Immediately mark this search as over.
    /// Safe to call from another thread.
    pub fn stop(&self) {
        self.over.store(true, Ordering::Relaxed);
    }

    /// Poll whether the search should keep going after `iterations_done`
    /// iterations.
    pub fn keep_going(&self, iterations_done: u64) -> bool {
        if self.over.load(Ordering::Relaxed) {
            return false;
        }
        if iterations_done >= self.iteration_cap {
            return false;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn iteration_cap_stops() {
        let limit = SearchLimit::iterations(10);
        assert!(limit.keep_going(9));
        assert!(!limit.keep_going(10));
    }

    #[test]
    fn stop_flag_stops() {
        let limit = SearchLimit::iterations(u64::MAX);
        assert!(limit.keep_going(0));
        limit.stop();
        assert!(!limit.keep_going(0));
    }

    #[test]
    fn past_deadline_stops() {
        let limit = SearchLimit::new(u64::MAX, Some(Instant::now() - Duration::from_millis(1)));
        assert!(!limit.keep_going(0));
    }
}
