//! Distance and travel time matrices.
//!
//! Straight-line matrices come from haversine distances; road-network
//! matrices come from a chain of [`DistanceProvider`]s with per-cell
//! straight-line fallback.

mod builder;
mod great_circle;
mod matrix;
mod provider;

#[cfg(feature = "road-network")]
pub mod http;

pub use builder::{CellSource, CostMatrixBuilder, TravelMatrices};
pub use great_circle::{haversine_km, haversine_m, seconds_at_speed, EARTH_RADIUS_KM};
pub use matrix::CostMatrix;
pub use provider::{
    Departure, DistanceProvider, Element, ElementStatus, StraightLineProvider, TrafficModel,
    TrafficOptions,
};
