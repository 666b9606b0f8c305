//! Mutable search state and the assignment it produces.

use serde::Serialize;

use crate::models::RoutingProblem;

use super::guided::Pricing;

/// Stop sequences per vehicle plus the stops left out.
///
/// `routes()[v]` lists node indices in visiting order, excluding the
/// vehicle's depot at either end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    routes: Vec<Vec<usize>>,
    unassigned: Vec<usize>,
    iterations: u64,
}

impl Assignment {
    /// Builds an assignment from per-vehicle sequences; every stop of
    /// `problem` that appears in no sequence is unassigned.
    pub fn from_routes(problem: &RoutingProblem, routes: Vec<Vec<usize>>) -> Self {
        let mut seen = vec![false; problem.num_nodes()];
        for &node in routes.iter().flatten() {
            if let Some(flag) = seen.get_mut(node) {
                *flag = true;
            }
        }
        let unassigned = problem
            .locations()
            .stop_indices()
            .filter(|&s| !seen[s])
            .collect();
        Self {
            routes,
            unassigned,
            iterations: 0,
        }
    }

    pub(crate) fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sequences per vehicle, including empty ones.
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// Stop sequence of vehicle `v`.
    pub fn route(&self, v: usize) -> &[usize] {
        &self.routes[v]
    }

    /// Unserved stops in node-index order.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Number of vehicles with at least one stop.
    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    /// Moves plus penalisation rounds spent by the search.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Full objective: transit, fixed vehicle costs, and unassigned penalties.
    pub fn cost(&self, problem: &RoutingProblem) -> i64 {
        let pricing = Pricing::real(problem);
        let transit: i64 = self
            .routes
            .iter()
            .enumerate()
            .map(|(v, r)| pricing.route_cost(v, r))
            .sum();
        transit + problem.penalty() * self.unassigned.len() as i64
    }
}

/// Search state: sequences, loads, and which vehicle holds each node.
#[derive(Debug, Clone)]
pub(crate) struct Plan {
    routes: Vec<Vec<usize>>,
    loads: Vec<i64>,
    owner: Vec<Option<usize>>,
}

impl Plan {
    pub(crate) fn empty(problem: &RoutingProblem) -> Self {
        Self {
            routes: vec![Vec::new(); problem.num_vehicles()],
            loads: vec![0; problem.num_vehicles()],
            owner: vec![None; problem.num_nodes()],
        }
    }

    pub(crate) fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    pub(crate) fn route(&self, v: usize) -> &[usize] {
        &self.routes[v]
    }

    /// Load of vehicle `v`, widened so sums of large demands cannot wrap.
    pub(crate) fn load(&self, v: usize) -> i64 {
        self.loads[v]
    }

    /// Whether vehicle `v` can take `added` more units (negative to unload).
    #[inline]
    pub(crate) fn fits(&self, problem: &RoutingProblem, v: usize, added: i64) -> bool {
        self.loads[v] + added <= i64::from(problem.capacity(v))
    }

    pub(crate) fn is_assigned(&self, node: usize) -> bool {
        self.owner[node].is_some()
    }

    pub(crate) fn num_unassigned(&self, problem: &RoutingProblem) -> usize {
        problem
            .locations()
            .stop_indices()
            .filter(|&s| self.owner[s].is_none())
            .count()
    }

    /// Appends `node` to vehicle `v`.
    pub(crate) fn push(&mut self, problem: &RoutingProblem, v: usize, node: usize) {
        self.routes[v].push(node);
        self.loads[v] += i64::from(problem.demand(node));
        self.owner[node] = Some(v);
    }

    /// Replaces the sequence of vehicle `v`.
    ///
    /// When several routes change, nodes moving between them end up owned
    /// by whichever route was set last to contain them.
    pub(crate) fn set_route(&mut self, problem: &RoutingProblem, v: usize, sequence: Vec<usize>) {
        for &node in &self.routes[v] {
            if self.owner[node] == Some(v) {
                self.owner[node] = None;
            }
        }
        for &node in &sequence {
            self.owner[node] = Some(v);
        }
        self.loads[v] = sequence.iter().map(|&n| i64::from(problem.demand(n))).sum();
        self.routes[v] = sequence;
    }

    /// Objective under `pricing`, unassigned penalties included.
    pub(crate) fn cost(&self, problem: &RoutingProblem, pricing: &Pricing<'_>) -> i64 {
        let transit: i64 = self
            .routes
            .iter()
            .enumerate()
            .map(|(v, r)| pricing.route_cost(v, r))
            .sum();
        transit + problem.penalty() * self.num_unassigned(problem) as i64
    }

    pub(crate) fn to_assignment(&self, problem: &RoutingProblem) -> Assignment {
        Assignment::from_routes(problem, self.routes.clone())
    }
}
