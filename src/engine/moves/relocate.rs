//! Stop relocation within and between routes.
//!
//! # Algorithm
//!
//! Removes each stop from its route and tries every position in the same
//! route and in every other vehicle with spare capacity, including idle
//! vehicles based at other depots. Costs are priced per vehicle, so moving a
//! stop to a vehicle with a different rate is valued correctly.
//!
//! # Complexity
//!
//! O(n² × V) per pass, where n = assigned stops and V = vehicles.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use crate::engine::budget::Budget;
use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::{consider, Candidate, Move};

/// Change in cost of vehicle `v` when the stop at `pos` leaves its route.
pub(super) fn removal_delta(
    pricing: &Pricing<'_>,
    v: usize,
    route: &[usize],
    pos: usize,
) -> i64 {
    if route.len() == 1 {
        return -pricing.route_cost(v, route);
    }
    let node = route[pos];
    let prev = pricing.prev(v, route, pos);
    let next = pricing.at(v, route, pos + 1);
    pricing.arc(v, prev, next) - pricing.arc(v, prev, node) - pricing.arc(v, node, next)
}

pub(crate) fn best(plan: &Plan, pricing: &Pricing<'_>, budget: &Budget) -> Option<Candidate> {
    let problem = pricing.problem();
    let vehicles = problem.num_vehicles();
    let mut best = None;

    for from in 0..vehicles {
        let source = plan.route(from);
        for from_pos in 0..source.len() {
            if budget.expired() {
                return best;
            }
            let node = source[from_pos];
            let demand = i64::from(problem.demand(node));
            let removal = removal_delta(pricing, from, source, from_pos);

            for to in 0..vehicles {
                if to == from {
                    intra(pricing, from, source, from_pos, removal, &mut best);
                    continue;
                }
                if !plan.fits(problem, to, demand) {
                    continue;
                }
                let target = plan.route(to);
                if target.is_empty() {
                    let depot = problem.start(to);
                    let delta = removal
                        + pricing.fixed()
                        + pricing.arc(to, depot, node)
                        + pricing.arc(to, node, depot);
                    let mv = Move::Relocate {
                        from,
                        from_pos,
                        to,
                        to_pos: 0,
                    };
                    consider(&mut best, mv, delta);
                    continue;
                }
                for to_pos in 0..=target.len() {
                    let prev = pricing.prev(to, target, to_pos);
                    let next = pricing.at(to, target, to_pos);
                    let delta = removal + pricing.arc(to, prev, node) + pricing.arc(to, node, next)
                        - pricing.arc(to, prev, next);
                    let mv = Move::Relocate {
                        from,
                        from_pos,
                        to,
                        to_pos,
                    };
                    consider(&mut best, mv, delta);
                }
            }
        }
    }

    best
}

/// Reinsertion into the same route at every other position of the route
/// without the stop.
fn intra(
    pricing: &Pricing<'_>,
    v: usize,
    route: &[usize],
    from_pos: usize,
    removal: i64,
    best: &mut Option<Candidate>,
) {
    let len = route.len();
    if len < 2 {
        return;
    }
    let node = route[from_pos];
    let depot = pricing.problem().start(v);
    // Position k of the route once `node` is taken out.
    let reduced = |k: usize| -> usize {
        if k >= len - 1 {
            depot
        } else if k < from_pos {
            route[k]
        } else {
            route[k + 1]
        }
    };
    for to_pos in 0..len {
        if to_pos == from_pos {
            continue;
        }
        let prev = if to_pos == 0 { depot } else { reduced(to_pos - 1) };
        let next = reduced(to_pos);
        let delta = removal + pricing.arc(v, prev, node) + pricing.arc(v, node, next)
            - pricing.arc(v, prev, next);
        let mv = Move::Relocate {
            from: v,
            from_pos,
            to: v,
            to_pos,
        };
        consider(best, mv, delta);
    }
}
