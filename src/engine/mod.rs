//! Routing engine: parallel cheapest-arc construction and guided local
//! search over insert, relocate, exchange, 2-opt, 2-opt* and drop moves.
//!
//! - [`RoutingEngine`] — solves a [`RoutingProblem`](crate::models::RoutingProblem)
//! - [`Assignment`] — per-vehicle stop sequences and unassigned stops

mod budget;
mod construction;
mod guided;
mod moves;
mod plan;
mod search;

pub use plan::Assignment;
pub use search::RoutingEngine;
