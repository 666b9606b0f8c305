//! Domain model types for multi-depot vehicle routing.
//!
//! Provides depots and stops, the fleet, the validated problem handed to the
//! engine, and the routes and solutions it produces.

mod location;
mod node;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use location::LocationSet;
pub use node::{Coordinates, Node, NodeKind};
pub use problem::{RoutingProblem, DEFAULT_PENALTY};
pub use route::{Route, Visit};
pub use solution::{Solution, UnassignedStop};
pub use vehicle::{validate_fleet, OperatingWindow, Vehicle};
