//! Search termination: wall clock and iteration count.
//!
//! The deadline is a hard bound. Construction and every neighbourhood scan
//! poll [`Budget::expired`] once per outer step and stop with what they have.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Budget {
    deadline: Option<Instant>,
    max_iterations: Option<u64>,
}

impl Budget {
    /// A time limit too large to represent means no deadline.
    pub(crate) fn new(time_limit: Duration, max_iterations: Option<u64>) -> Self {
        Self {
            deadline: Instant::now().checked_add(time_limit),
            max_iterations,
        }
    }

    /// Iteration cap reached or deadline passed.
    pub(crate) fn exhausted(&self, iterations: u64) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max) || self.expired()
    }

    /// Deadline passed; iterations are not considered.
    #[inline]
    pub(crate) fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
