//! Solution types.

use serde::Serialize;

use crate::objective::{Goal, ReportUnit};

use super::Route;

/// A stop no vehicle serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignedStop {
    /// Node index in the location set.
    pub node_index: usize,
    /// Stop identifier.
    pub id: String,
    /// Stop display name.
    pub name: String,
    /// Stop demand.
    pub demand: i32,
}

/// Routes of the used vehicles plus the stops left out.
///
/// Totals are fixed at construction and exclude fixed vehicle costs and
/// unassigned-stop penalties.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::Solution;
/// use fleet_routing::objective::Goal;
///
/// let sol = Solution::new(Goal::Time, Vec::new(), Vec::new());
/// assert_eq!(sol.num_routes(), 0);
/// assert_eq!(sol.total_objective(), 0.0);
/// assert!(!sol.is_partial());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    goal: Goal,
    unit: ReportUnit,
    total_cost: i64,
    total_objective: f64,
    routes: Vec<Route>,
    unassigned: Vec<UnassignedStop>,
}

impl Solution {
    /// Assembles a solution and computes its totals.
    pub fn new(goal: Goal, routes: Vec<Route>, unassigned: Vec<UnassignedStop>) -> Self {
        let unit = goal.report_unit();
        let total_cost = routes.iter().map(Route::cost).sum();
        Self {
            goal,
            unit,
            total_cost,
            total_objective: unit.convert(total_cost),
            routes,
            unassigned,
        }
    }

    /// The goal that was minimised.
    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Reporting unit of [`total_objective`](Self::total_objective).
    pub fn unit(&self) -> ReportUnit {
        self.unit
    }

    /// Sum of route costs in native units.
    pub fn total_cost(&self) -> i64 {
        self.total_cost
    }

    /// Sum of route costs in the reporting unit.
    pub fn total_objective(&self) -> f64 {
        self.total_objective
    }

    /// Routes of vehicles that serve at least one stop.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Stops left out, in node-index order.
    pub fn unassigned(&self) -> &[UnassignedStop] {
        &self.unassigned
    }

    /// Number of stops left out.
    pub fn num_unassigned(&self) -> usize {
        self.unassigned.len()
    }

    /// Returns `true` when some stop is not served.
    pub fn is_partial(&self) -> bool {
        !self.unassigned.is_empty()
    }

    /// Number of stops served across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::num_stops).sum()
    }

    /// Kilometres driven across all routes.
    pub fn total_distance_km(&self) -> f64 {
        self.routes.iter().map(Route::distance_m).sum::<i64>() as f64 / 1000.0
    }

    /// Minutes across all routes, service time included.
    pub fn total_duration_min(&self) -> f64 {
        self.routes.iter().map(Route::duration_s).sum::<i64>() as f64 / 60.0
    }

    /// Load delivered across all routes.
    pub fn total_load(&self) -> i64 {
        self.routes.iter().map(|r| i64::from(r.load())).sum()
    }
}
