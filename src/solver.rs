//! End-to-end solving.
//!
//! [`solve`] runs the engine and the extractor on a ready
//! [`RoutingProblem`]. [`Optimizer`] goes from raw locations and a fleet to
//! a [`Solution`]: matrices, objective, problem, search, extraction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::config::{OptimizerConfig, SearchConfig};
use crate::distance::{CostMatrixBuilder, DistanceProvider};
use crate::engine::RoutingEngine;
use crate::error::RoutingError;
use crate::extraction::SolutionExtractor;
use crate::models::{validate_fleet, LocationSet, RoutingProblem, Solution, Vehicle};
use crate::objective::ObjectiveModel;
use crate::progress::ProgressObserver;

/// Solves `problem` with default search settings within `time_limit`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fleet_routing::config::CalculationConfig;
/// use fleet_routing::distance::CostMatrixBuilder;
/// use fleet_routing::models::{LocationSet, Node, RoutingProblem, Vehicle};
/// use fleet_routing::objective::{Goal, ObjectiveModel};
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D1", "Depot", 0.0, 0.0), Node::depot("D2", "Spare", 1.0, 1.0)],
///     Vec::new(),
/// );
/// let fleet = vec![Vehicle::new("V1", 10, "D1")];
/// let matrices = CostMatrixBuilder::straight_line().build(&locations)?;
/// let calc = CalculationConfig::default();
/// let objective = ObjectiveModel::new(calc.clone()).build(Goal::Distance, &matrices, &fleet);
/// let problem = RoutingProblem::new(locations, fleet, &matrices, objective, &calc)?;
///
/// let solution = fleet_routing::solve(&problem, Duration::from_secs(1))?;
/// assert_eq!(solution.num_routes(), 0);
/// assert_eq!(solution.total_objective(), 0.0);
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
pub fn solve(
    problem: &RoutingProblem,
    time_limit: Duration,
) -> Result<Solution, RoutingError> {
    let assignment = RoutingEngine::new(SearchConfig::default()).solve(problem, time_limit)?;
    Ok(SolutionExtractor::new().extract(problem, &assignment))
}

/// Locations and fleet in, itineraries out.
///
/// # Examples
///
/// ```
/// use fleet_routing::config::OptimizerConfig;
/// use fleet_routing::models::{LocationSet, Node, Vehicle};
/// use fleet_routing::objective::Goal;
/// use fleet_routing::Optimizer;
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D", "Depot", 40.0, -3.70)],
///     vec![
///         Node::stop("S1", "Market", 40.01, -3.70, 20),
///         Node::stop("S2", "Bakery", 40.02, -3.70, 30),
///     ],
/// );
/// let fleet = vec![Vehicle::new("V1", 100, "D")];
///
/// let mut config = OptimizerConfig::default().with_goal(Goal::Distance);
/// config.search.max_iterations = Some(200);
/// let solution = Optimizer::new(config).optimize(locations, fleet)?;
/// assert_eq!(solution.num_served(), 2);
/// assert_eq!(solution.routes()[0].load(), 50);
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
pub struct Optimizer {
    config: OptimizerConfig,
    matrices: CostMatrixBuilder,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl fmt::Debug for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizer")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    /// Creates an optimizer with no road-network providers and no observer.
    ///
    /// Straight-line fallback cells are driven at the calculation speed.
    pub fn new(config: OptimizerConfig) -> Self {
        let matrices = CostMatrixBuilder::new(config.matrix.clone())
            .with_average_speed_kmh(config.calculation.average_speed_kmh);
        Self {
            config,
            matrices,
            observer: None,
        }
    }

    /// Appends a road-network provider to the fallback chain.
    pub fn with_provider(mut self, provider: impl DistanceProvider + 'static) -> Self {
        self.matrices = self.matrices.with_provider(provider);
        self
    }

    /// Receives matrix and search progress.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.matrices = self.matrices.with_observer(Arc::clone(&observer));
        self.observer = Some(observer);
        self
    }

    /// Settings in use.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Builds the problem for `locations` and `fleet` and solves it.
    ///
    /// Invalid input fails before any matrix is requested.
    pub fn optimize(
        &self,
        locations: LocationSet,
        fleet: Vec<Vehicle>,
    ) -> Result<Solution, RoutingError> {
        locations.validate()?;
        validate_fleet(&fleet, &locations)?;

        let calculation = &self.config.calculation;
        let matrices = self.matrices.build(&locations)?;
        let objective =
            ObjectiveModel::new(calculation.clone()).build(self.config.goal, &matrices, &fleet);
        let problem = RoutingProblem::new(locations, fleet, &matrices, objective, calculation)?
            .with_penalty(self.config.search.penalty);

        let mut engine = RoutingEngine::new(self.config.search.clone());
        if let Some(observer) = &self.observer {
            engine = engine.with_observer(Arc::clone(observer));
        }
        let assignment = engine.solve(&problem, self.config.time_limit())?;
        let solution = SolutionExtractor::new().extract(&problem, &assignment);
        info!(
            "{} route(s), {} unassigned, total {:.2} {}",
            solution.num_routes(),
            solution.num_unassigned(),
            solution.total_objective(),
            solution.unit().label()
        );
        Ok(solution)
    }
}
