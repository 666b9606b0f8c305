//! # fleet-routing
//!
//! Multi-depot capacitated vehicle routing for delivery fleets: cost
//! matrices from great-circle distances or road-network services, selectable
//! objectives, a guided local search engine, and per-vehicle itineraries.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (Node, LocationSet, Vehicle, RoutingProblem, Route, Solution)
//! - [`distance`] — Cost matrices, haversine math, distance providers and the matrix builder
//! - [`objective`] — Goals, reporting units, and per-vehicle arc costs
//! - [`engine`] — Parallel cheapest-arc construction and guided local search
//! - [`extraction`] — Itineraries, utilisation, and unassigned stops
//! - [`solver`] — [`solve`] and the [`Optimizer`] facade
//! - [`config`] — JSON-overridable settings
//! - [`progress`] — Injected progress observers
//! - [`error`] — Error types
//!
//! ## Features
//!
//! - `road-network` — HTTP providers for the Google Distance Matrix API and
//!   the OSRM table service (`reqwest` + `tokio`).

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod extraction;
pub mod models;
pub mod objective;
pub mod progress;
pub mod solver;

pub use error::{InputError, ProviderError, RoutingError};
pub use solver::{solve, Optimizer};
