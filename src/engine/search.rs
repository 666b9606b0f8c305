//! The routing engine: construction followed by guided local search.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::SearchConfig;
use crate::error::RoutingError;
use crate::models::RoutingProblem;
use crate::progress::{ProgressEvent, ProgressObserver};

use super::budget::Budget;
use super::construction::parallel_cheapest_arc;
use super::guided::{self, PenaltyMatrix, Pricing};
use super::moves::find_improving;
use super::plan::{Assignment, Plan};

/// Multi-depot CVRP solver with optional stops.
///
/// Builds a first plan with parallel cheapest-arc construction, then
/// improves it by local search. With guided search enabled, each local
/// optimum penalises its costliest arcs and the search carries on under
/// the augmented cost; the best real-cost plan seen is returned.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fleet_routing::config::{CalculationConfig, SearchConfig};
/// use fleet_routing::distance::CostMatrixBuilder;
/// use fleet_routing::engine::RoutingEngine;
/// use fleet_routing::models::{LocationSet, Node, RoutingProblem, Vehicle};
/// use fleet_routing::objective::{Goal, ObjectiveModel};
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D", "Depot", 0.0, 0.0)],
///     vec![
///         Node::stop("S1", "North", 0.01, 0.0, 10),
///         Node::stop("S2", "East", 0.0, 0.01, 10),
///     ],
/// );
/// let fleet = vec![Vehicle::new("V1", 50, "D")];
/// let matrices = CostMatrixBuilder::straight_line().build(&locations)?;
/// let calc = CalculationConfig::default();
/// let objective = ObjectiveModel::new(calc.clone()).build(Goal::Distance, &matrices, &fleet);
/// let problem = RoutingProblem::new(locations, fleet, &matrices, objective, &calc)?;
///
/// let engine = RoutingEngine::new(SearchConfig::default().with_max_iterations(100));
/// let assignment = engine.solve(&problem, Duration::from_secs(5))?;
/// assert!(assignment.unassigned().is_empty());
/// assert_eq!(assignment.route(0).len(), 2);
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
#[derive(Clone, Default)]
pub struct RoutingEngine {
    config: SearchConfig,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl fmt::Debug for RoutingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingEngine")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RoutingEngine {
    /// Creates an engine with the given search parameters and no observer.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Receives an [`ProgressEvent::Improved`] for every new best plan.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Search parameters.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Solves `problem` within `time_limit`.
    ///
    /// Stops that cannot be served profitably are left unassigned; that is
    /// a normal outcome. The only failure is a problem where stops exist
    /// but none fits any vehicle. `time_limit` bounds construction as well
    /// as improvement: stops still unrouted when it runs out stay
    /// unassigned.
    pub fn solve(
        &self,
        problem: &RoutingProblem,
        time_limit: Duration,
    ) -> Result<Assignment, RoutingError> {
        check_feasible(problem)?;
        if problem.num_stops() == 0 {
            let idle = vec![Vec::new(); problem.num_vehicles()];
            return Ok(Assignment::from_routes(problem, idle));
        }

        info!(
            "routing {} stop(s) with {} vehicle(s) across {} depot(s), goal {}",
            problem.num_stops(),
            problem.num_vehicles(),
            problem.locations().num_depots(),
            problem.objective().goal()
        );

        let mut order: Vec<usize> = problem.locations().stop_indices().collect();
        if let Some(seed) = self.config.seed {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        let budget = Budget::new(time_limit, self.config.max_iterations);
        let real = Pricing::real(problem);

        let mut plan = parallel_cheapest_arc(&real, &order, &budget);
        let mut best = plan.clone();
        let mut best_cost = plan.cost(problem, &real);
        let mut iterations = 0u64;
        self.report(problem, &best, best_cost, iterations);

        let mut penalties = PenaltyMatrix::new(problem.num_nodes());
        let mut lambda: Option<i64> = None;
        let mut stall = 0u64;
        let mut improved = true;

        while !budget.exhausted(iterations) {
            let pricing = match lambda {
                Some(l) => Pricing::augmented(problem, &penalties, l),
                None => real,
            };
            if let Some(candidate) = find_improving(&plan, &pricing, &order, &budget) {
                candidate.mv.apply(problem, &mut plan);
                iterations += 1;
                let cost = plan.cost(problem, &real);
                if cost < best_cost {
                    best = plan.clone();
                    best_cost = cost;
                    improved = true;
                    self.report(problem, &best, best_cost, iterations);
                }
                continue;
            }

            // an interrupted scan proves nothing about optimality
            if budget.expired() {
                break;
            }
            // local optimum under the current pricing
            if !self.config.guided {
                debug!("descent reached a local optimum after {iterations} iteration(s)");
                break;
            }
            stall = if improved { 0 } else { stall + 1 };
            improved = false;
            if self.config.stall_limit.is_some_and(|limit| stall >= limit) {
                debug!("no new best in {stall} local optima");
                break;
            }
            if lambda.is_none() {
                lambda = guided::lambda(problem, plan.routes(), self.config.lambda_coefficient);
                match lambda {
                    Some(l) => debug!("guided search lambda = {l}"),
                    None => break,
                }
            }
            if penalties.penalise(problem, plan.routes()) == 0 {
                break;
            }
            iterations += 1;
        }

        let assignment = best.to_assignment(problem).with_iterations(iterations);
        info!(
            "search finished after {iterations} iteration(s): cost {best_cost}, \
             {} vehicle(s) used, {} unassigned",
            assignment.vehicles_used(),
            assignment.unassigned().len()
        );
        Ok(assignment)
    }

    fn report(&self, problem: &RoutingProblem, plan: &Plan, cost: i64, iteration: u64) {
        if let Some(observer) = &self.observer {
            observer.on_event(&ProgressEvent::Improved {
                iteration,
                cost,
                unassigned: plan.num_unassigned(problem),
            });
        }
    }
}

/// Fails when stops exist but none of them fits any vehicle.
fn check_feasible(problem: &RoutingProblem) -> Result<(), RoutingError> {
    if problem.num_stops() == 0 {
        return Ok(());
    }
    let largest = (0..problem.num_vehicles()).map(|v| problem.capacity(v)).max();
    let fits = largest.is_some_and(|cap| {
        problem
            .locations()
            .stop_indices()
            .any(|s| problem.demand(s) <= cap)
    });
    if fits {
        Ok(())
    } else {
        Err(RoutingError::NoFeasibleSolution {
            stops: problem.num_stops(),
            vehicles: problem.num_vehicles(),
        })
    }
}
