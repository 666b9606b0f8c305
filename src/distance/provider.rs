//! Distance provider abstraction and the straight-line provider.
//!
//! A [`DistanceProvider`] answers one origin × destination block per call.
//! The [`CostMatrixBuilder`](super::CostMatrixBuilder) splits the full matrix
//! into blocks no larger than [`DistanceProvider::max_locations_per_side`]
//! and walks an ordered chain of providers until one serves each block.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::Coordinates;

use super::great_circle::{haversine_m, seconds_at_speed};

/// Per-cell outcome reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementStatus {
    /// Distance and duration are usable.
    Ok,
    /// The pair could not be routed; the message is provider specific.
    Failed(String),
}

/// Distance and duration for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Whether the values below are usable.
    pub status: ElementStatus,
    /// Travel distance in metres.
    pub distance_m: i64,
    /// Free-flow travel time in seconds.
    pub duration_s: i64,
    /// Traffic-adjusted travel time in seconds, when requested and available.
    pub duration_in_traffic_s: Option<i64>,
}

impl Element {
    /// A successful cell without traffic information.
    pub fn ok(distance_m: i64, duration_s: i64) -> Self {
        Self {
            status: ElementStatus::Ok,
            distance_m,
            duration_s,
            duration_in_traffic_s: None,
        }
    }

    /// A failed cell.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ElementStatus::Failed(reason.into()),
            distance_m: 0,
            duration_s: 0,
            duration_in_traffic_s: None,
        }
    }

    /// Attaches a traffic-adjusted duration.
    pub fn with_traffic(mut self, duration_in_traffic_s: i64) -> Self {
        self.duration_in_traffic_s = Some(duration_in_traffic_s);
        self
    }

    /// Returns `true` when the cell is usable.
    pub fn is_ok(&self) -> bool {
        self.status == ElementStatus::Ok
    }

    /// Duration to store: the traffic value when present, else free flow.
    pub fn effective_duration_s(&self) -> i64 {
        self.duration_in_traffic_s.unwrap_or(self.duration_s)
    }
}

/// Traffic prediction model for a future departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficModel {
    /// Best estimate from historical and live data.
    #[default]
    BestGuess,
    /// Travel time usually shorter than the estimate.
    Optimistic,
    /// Travel time usually longer than the estimate.
    Pessimistic,
}

impl TrafficModel {
    /// Wire name used by road-network APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestGuess => "best_guess",
            Self::Optimistic => "optimistic",
            Self::Pessimistic => "pessimistic",
        }
    }
}

/// When the routes depart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Departure {
    /// Current traffic conditions.
    #[default]
    Now,
    /// Predicted conditions at a future instant.
    At(SystemTime),
}

/// Options for traffic-aware durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrafficOptions {
    /// Departure instant.
    pub departure: Departure,
    /// Prediction model; only meaningful for [`Departure::At`].
    pub model: TrafficModel,
}

impl TrafficOptions {
    /// Traffic as it is right now.
    pub fn now() -> Self {
        Self::default()
    }

    /// Predicted traffic at `departure` using `model`.
    pub fn predicted(departure: SystemTime, model: TrafficModel) -> Self {
        Self {
            departure: Departure::At(departure),
            model,
        }
    }
}

/// Source of pairwise road distances and durations.
///
/// Implementations answer one block per call. The returned grid must have
/// `origins.len()` rows of `destinations.len()` elements. A whole-block
/// failure is an `Err`; a failure for a single pair is an element with
/// [`ElementStatus::Failed`].
pub trait DistanceProvider: Send + Sync {
    /// Name recorded in the per-cell provenance.
    fn name(&self) -> &str;

    /// Largest number of origins (and of destinations) accepted per call.
    fn max_locations_per_side(&self) -> usize {
        25
    }

    /// Fetches the distance/duration block for `origins` × `destinations`.
    fn distance_and_duration(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        traffic: Option<&TrafficOptions>,
    ) -> Result<Vec<Vec<Element>>, ProviderError>;
}

/// Great-circle provider; never fails and ignores traffic.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::{DistanceProvider, StraightLineProvider};
/// use fleet_routing::models::Coordinates;
///
/// let provider = StraightLineProvider::new(40.0);
/// let a = Coordinates::new(0.0, 0.0);
/// let b = Coordinates::new(0.0, 0.1);
/// let block = provider.distance_and_duration(&[a], &[a, b], None).unwrap();
/// assert_eq!(block[0][0].distance_m, 0);
/// assert!(block[0][1].distance_m > 11_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineProvider {
    average_speed_kmh: f64,
}

impl StraightLineProvider {
    /// Creates a provider that derives durations at `average_speed_kmh`.
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    /// The straight-line element for one pair.
    pub fn element(&self, from: Coordinates, to: Coordinates) -> Element {
        let distance_m = haversine_m(from, to);
        Element::ok(distance_m, seconds_at_speed(distance_m, self.average_speed_kmh))
    }
}

impl DistanceProvider for StraightLineProvider {
    fn name(&self) -> &str {
        "straight_line"
    }

    fn max_locations_per_side(&self) -> usize {
        usize::MAX
    }

    fn distance_and_duration(
        &self,
        origins: &[Coordinates],
        destinations: &[Coordinates],
        _traffic: Option<&TrafficOptions>,
    ) -> Result<Vec<Vec<Element>>, ProviderError> {
        Ok(origins
            .iter()
            .map(|&o| destinations.iter().map(|&d| self.element(o, d)).collect())
            .collect())
    }
}
