//! Neighbourhoods explored by the improvement phase.
//!
//! Each neighbourhood scans all of its moves under the current [`Pricing`]
//! and returns the one with the most negative delta; among equal deltas the
//! first one found wins. [`find_improving`] tries the neighbourhoods in a
//! fixed order and stops at the first that improves. The quadratic scans
//! poll the deadline once per outer step and, once it has passed, return
//! the best move seen so far.

mod cross;
mod drop;
mod exchange;
mod insert;
mod relocate;
mod two_opt;

use crate::models::RoutingProblem;

use super::budget::Budget;
use super::guided::Pricing;
use super::plan::Plan;

/// A change to a [`Plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Serve an unassigned stop.
    Insert { node: usize, vehicle: usize, pos: usize },
    /// Move one stop, within a route or to another vehicle.
    Relocate { from: usize, from_pos: usize, to: usize, to_pos: usize },
    /// Swap two stops.
    Exchange { v1: usize, p1: usize, v2: usize, p2: usize },
    /// Reverse `route[i..=j]`.
    TwoOpt { vehicle: usize, i: usize, j: usize },
    /// Swap tails: `r1[cut1..]` and `r2[cut2..]`.
    Cross { v1: usize, cut1: usize, v2: usize, cut2: usize },
    /// Leave a stop unserved.
    Drop { vehicle: usize, pos: usize },
}

impl Move {
    /// Applies the move. The move must have been generated for `plan`.
    pub(crate) fn apply(&self, problem: &RoutingProblem, plan: &mut Plan) {
        match *self {
            Move::Insert { node, vehicle, pos } => {
                let mut route = plan.route(vehicle).to_vec();
                route.insert(pos, node);
                plan.set_route(problem, vehicle, route);
            }
            Move::Relocate {
                from,
                from_pos,
                to,
                to_pos,
            } => {
                let mut source = plan.route(from).to_vec();
                let node = source.remove(from_pos);
                if from == to {
                    source.insert(to_pos, node);
                    plan.set_route(problem, from, source);
                } else {
                    let mut target = plan.route(to).to_vec();
                    target.insert(to_pos, node);
                    plan.set_route(problem, from, source);
                    plan.set_route(problem, to, target);
                }
            }
            Move::Exchange { v1, p1, v2, p2 } => {
                if v1 == v2 {
                    let mut route = plan.route(v1).to_vec();
                    route.swap(p1, p2);
                    plan.set_route(problem, v1, route);
                } else {
                    let mut r1 = plan.route(v1).to_vec();
                    let mut r2 = plan.route(v2).to_vec();
                    std::mem::swap(&mut r1[p1], &mut r2[p2]);
                    plan.set_route(problem, v1, r1);
                    plan.set_route(problem, v2, r2);
                }
            }
            Move::TwoOpt { vehicle, i, j } => {
                let mut route = plan.route(vehicle).to_vec();
                route[i..=j].reverse();
                plan.set_route(problem, vehicle, route);
            }
            Move::Cross { v1, cut1, v2, cut2 } => {
                let r1 = plan.route(v1);
                let r2 = plan.route(v2);
                let new1: Vec<usize> = r1[..cut1].iter().chain(&r2[cut2..]).copied().collect();
                let new2: Vec<usize> = r2[..cut2].iter().chain(&r1[cut1..]).copied().collect();
                plan.set_route(problem, v1, new1);
                plan.set_route(problem, v2, new2);
            }
            Move::Drop { vehicle, pos } => {
                let mut route = plan.route(vehicle).to_vec();
                route.remove(pos);
                plan.set_route(problem, vehicle, route);
            }
        }
    }
}

/// A move and its change in objective under the pricing that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub mv: Move,
    pub delta: i64,
}

/// Keeps `mv` if it improves and beats the current best strictly.
#[inline]
fn consider(best: &mut Option<Candidate>, mv: Move, delta: i64) {
    if delta < 0 && best.map_or(true, |b| delta < b.delta) {
        *best = Some(Candidate { mv, delta });
    }
}

/// Best move of the first neighbourhood that improves, scanning insert,
/// relocate, exchange, two-opt, cross, and drop in that order.
pub(crate) fn find_improving(
    plan: &Plan,
    pricing: &Pricing<'_>,
    order: &[usize],
    budget: &Budget,
) -> Option<Candidate> {
    insert::best(plan, pricing, order, budget)
        .or_else(|| relocate::best(plan, pricing, budget))
        .or_else(|| exchange::best(plan, pricing, budget))
        .or_else(|| two_opt::best(plan, pricing, budget))
        .or_else(|| cross::best(plan, pricing, budget))
        .or_else(|| drop::best(plan, pricing))
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A line of stops along the equator, one depot per end.

    use std::time::Duration;

    use crate::config::CalculationConfig;
    use crate::distance::{CostMatrix, TravelMatrices};
    use crate::engine::budget::Budget;
    use crate::models::{LocationSet, Node, RoutingProblem, Vehicle};
    use crate::objective::{Goal, ObjectiveModel};

    /// A budget no unit test runs into.
    pub(crate) fn unlimited() -> Budget {
        Budget::new(Duration::from_secs(3600), None)
    }

    /// `distance(i, j) = 1000 * |x_i - x_j|` for the given positions.
    pub(crate) fn line_problem(
        depots: &[i64],
        stops: &[(i64, i32)],
        fleet: Vec<Vehicle>,
    ) -> RoutingProblem {
        let xs: Vec<i64> = depots.iter().copied().chain(stops.iter().map(|s| s.0)).collect();
        let demands: Vec<i32> = stops.iter().map(|s| s.1).collect();
        matrix_problem(depots.len(), &demands, fleet, |i, j| 1000 * (xs[i] - xs[j]).abs())
    }

    /// Arbitrary, possibly asymmetric, distances over `depots` depots
    /// followed by one stop per demand.
    pub(crate) fn matrix_problem(
        depots: usize,
        demands: &[i32],
        fleet: Vec<Vehicle>,
        distance: impl Fn(usize, usize) -> i64,
    ) -> RoutingProblem {
        let depot_nodes = (0..depots)
            .map(|i| Node::depot(format!("D{i}"), format!("Depot {i}"), 0.0, 0.0))
            .collect();
        let stop_nodes = demands
            .iter()
            .enumerate()
            .map(|(i, &demand)| {
                Node::stop(format!("S{i}"), format!("Stop {i}"), 0.0, 0.0, demand)
            })
            .collect();
        let size = depots + demands.len();
        let matrices = TravelMatrices::from_distance(CostMatrix::from_fn(size, distance));
        let calc = CalculationConfig::default();
        let locations = LocationSet::new(depot_nodes, stop_nodes);
        let objective = ObjectiveModel::new(calc.clone()).build(Goal::Distance, &matrices, &fleet);
        match RoutingProblem::new(locations, fleet, &matrices, objective, &calc) {
            Ok(problem) => problem,
            Err(err) => panic!("invalid test problem: {err}"),
        }
    }
}
