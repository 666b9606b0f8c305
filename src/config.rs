//! Configuration for matrix construction, objectives, and the search.
//!
//! Every struct implements [`Default`] with the values the delivery planner
//! ships with and can be partially overridden from JSON:
//!
//! ```
//! use fleet_routing::config::OptimizerConfig;
//! use fleet_routing::objective::Goal;
//!
//! let config = OptimizerConfig::from_json(
//!     r#"{ "goal": "tiempo", "calculation": { "average_speed_kmh": 30.0 } }"#,
//! )?;
//! assert_eq!(config.goal, Goal::Time);
//! assert_eq!(config.calculation.average_speed_kmh, 30.0);
//! assert_eq!(config.calculation.service_time_min, 10.0);
//! # Ok::<(), fleet_routing::config::ConfigError>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::TrafficOptions;
use crate::objective::Goal;

/// Failure to read a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document is malformed or has wrongly typed fields.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Constants used to derive time, money, and blended costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Average road speed used when no real durations exist.
    pub average_speed_kmh: f64,
    /// Dwell time added per stop when reporting route durations.
    pub service_time_min: f64,
    /// Rate applied to vehicles that do not specify one.
    pub default_cost_per_km: f64,
    /// Cost charged once per used vehicle by the fleet-size goal.
    pub vehicle_fixed_cost: i64,
    /// Weight of normalised distance in the balanced goal.
    pub balanced_distance_weight: f64,
    /// Weight of normalised time in the balanced goal.
    pub balanced_time_weight: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            service_time_min: 10.0,
            default_cost_per_km: 2.5,
            vehicle_fixed_cost: 5_000_000,
            balanced_distance_weight: 0.6,
            balanced_time_weight: 0.4,
        }
    }
}

impl CalculationConfig {
    /// Sets the average speed.
    pub fn with_average_speed_kmh(mut self, speed: f64) -> Self {
        self.average_speed_kmh = speed;
        self
    }

    /// Sets the per-stop service time.
    pub fn with_service_time_min(mut self, minutes: f64) -> Self {
        self.service_time_min = minutes;
        self
    }

    /// Sets the default per-kilometre rate.
    pub fn with_default_cost_per_km(mut self, rate: f64) -> Self {
        self.default_cost_per_km = rate;
        self
    }

    /// Sets the fleet-size fixed cost.
    pub fn with_vehicle_fixed_cost(mut self, cost: i64) -> Self {
        self.vehicle_fixed_cost = cost;
        self
    }

    /// Sets the balanced-goal weights.
    pub fn with_balanced_weights(mut self, distance: f64, time: f64) -> Self {
        self.balanced_distance_weight = distance;
        self.balanced_time_weight = time;
        self
    }

    /// Service time in whole seconds.
    pub fn service_time_s(&self) -> i64 {
        (self.service_time_min * 60.0).round() as i64
    }
}

/// Parameters of the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cost of leaving a stop unassigned.
    pub penalty: i64,
    /// Escalate arc penalties at local optima instead of stopping there.
    pub guided: bool,
    /// Scale of the guided-search penalty term.
    pub lambda_coefficient: f64,
    /// Upper bound on applied moves plus penalisation rounds.
    pub max_iterations: Option<u64>,
    /// Stop after this many consecutive local optima without a new best.
    pub stall_limit: Option<u64>,
    /// Shuffles the stop scan order; `None` keeps index order.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            penalty: 1_000_000,
            guided: true,
            lambda_coefficient: 0.1,
            max_iterations: None,
            stall_limit: Some(50),
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Sets the unassigned-stop penalty.
    pub fn with_penalty(mut self, penalty: i64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Enables or disables guided local search.
    pub fn with_guided(mut self, guided: bool) -> Self {
        self.guided = guided;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Sets or clears the stall limit.
    pub fn with_stall_limit(mut self, limit: Option<u64>) -> Self {
        self.stall_limit = limit;
        self
    }

    /// Sets the scan-order seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// How pairwise distances are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMethod {
    /// Haversine great-circle distance.
    #[default]
    StraightLine,
    /// The configured chain of road-network providers.
    RoadNetwork,
}

/// Parameters of the cost matrix builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Straight line or road network.
    pub method: DistanceMethod,
    /// Origins (and destinations) per provider call.
    pub batch_size: usize,
    /// Traffic-aware durations for road-network mode.
    #[serde(skip)]
    pub traffic: Option<TrafficOptions>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            method: DistanceMethod::StraightLine,
            batch_size: 25,
            traffic: None,
        }
    }
}

impl MatrixConfig {
    /// Road-network matrix with the default batch size.
    pub fn road_network() -> Self {
        Self {
            method: DistanceMethod::RoadNetwork,
            ..Self::default()
        }
    }

    /// Sets the batch size (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Requests traffic-aware durations.
    pub fn with_traffic(mut self, traffic: TrafficOptions) -> Self {
        self.traffic = Some(traffic);
        self
    }
}

/// Everything the [`Optimizer`](crate::solver::Optimizer) needs besides data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// What to minimise.
    pub goal: Goal,
    /// Wall-clock budget of the search, in seconds.
    pub time_limit_secs: u64,
    /// Matrix construction.
    pub matrix: MatrixConfig,
    /// Cost derivation constants.
    pub calculation: CalculationConfig,
    /// Engine parameters.
    pub search: SearchConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            goal: Goal::Distance,
            time_limit_secs: 60,
            matrix: MatrixConfig::default(),
            calculation: CalculationConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the goal.
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = goal;
        self
    }

    /// Sets the search time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = limit.as_secs();
        self
    }

    /// Search time limit as a [`Duration`].
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }
}
