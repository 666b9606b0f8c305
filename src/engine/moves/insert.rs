//! Insertion of unassigned stops.
//!
//! # Algorithm
//!
//! For every unserved stop, in scan order, tries every vehicle with spare
//! capacity and every position. The delta is the insertion cost (plus the
//! fixed cost when the vehicle was idle) minus the penalty saved.
//!
//! # Complexity
//!
//! O(u × n) per pass, where u = unassigned stops and n = assigned stops.

use crate::engine::budget::Budget;
use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::{consider, Candidate, Move};

pub(crate) fn best(
    plan: &Plan,
    pricing: &Pricing<'_>,
    order: &[usize],
    budget: &Budget,
) -> Option<Candidate> {
    let problem = pricing.problem();
    let mut best = None;

    for &node in order.iter().filter(|&&n| !plan.is_assigned(n)) {
        if budget.expired() {
            return best;
        }
        let demand = i64::from(problem.demand(node));
        for v in 0..problem.num_vehicles() {
            if !plan.fits(problem, v, demand) {
                continue;
            }
            let route = plan.route(v);
            if route.is_empty() {
                let depot = problem.start(v);
                let delta = pricing.fixed()
                    + pricing.arc(v, depot, node)
                    + pricing.arc(v, node, depot)
                    - problem.penalty();
                consider(&mut best, Move::Insert { node, vehicle: v, pos: 0 }, delta);
                continue;
            }
            for pos in 0..=route.len() {
                let prev = pricing.prev(v, route, pos);
                let next = pricing.at(v, route, pos);
                let delta = pricing.arc(v, prev, node) + pricing.arc(v, node, next)
                    - pricing.arc(v, prev, next)
                    - problem.penalty();
                consider(&mut best, Move::Insert { node, vehicle: v, pos }, delta);
            }
        }
    }

    best
}
