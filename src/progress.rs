//! Progress events emitted while building matrices and searching.
//!
//! Observers are injected into [`CostMatrixBuilder`](crate::distance::CostMatrixBuilder)
//! and [`RoutingEngine`](crate::engine::RoutingEngine); nothing is global.
//! Any `Fn(&ProgressEvent) + Send + Sync` closure is an observer.

/// A progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// One matrix block finished.
    MatrixBlock {
        /// Blocks finished so far.
        completed: usize,
        /// Total number of blocks.
        total: usize,
    },
    /// The engine found a new best assignment.
    Improved {
        /// Iteration at which it was found.
        iteration: u64,
        /// Objective including penalties and fixed costs.
        cost: i64,
        /// Stops currently left out.
        unassigned: usize,
    },
}

/// Receives [`ProgressEvent`]s.
pub trait ProgressObserver: Send + Sync {
    /// Called for every event, possibly from a worker thread.
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |e: &ProgressEvent| {
            if let Ok(mut guard) = seen.lock() {
                guard.push(e.clone());
            }
        };
        observer.on_event(&ProgressEvent::MatrixBlock {
            completed: 1,
            total: 4,
        });
        let events = seen.lock().expect("not poisoned");
        assert_eq!(events.len(), 1);
    }
}
