//! Pairwise stop exchange.
//!
//! # Algorithm
//!
//! Swaps two stops, either inside one route or across two routes when both
//! vehicles can carry the swapped loads. Adjacent stops in one route are
//! handled as a single three-arc change.
//!
//! # Complexity
//!
//! O(n²) per pass, where n = assigned stops.

use crate::engine::budget::Budget;
use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::{consider, Candidate, Move};

pub(crate) fn best(plan: &Plan, pricing: &Pricing<'_>, budget: &Budget) -> Option<Candidate> {
    let problem = pricing.problem();
    let vehicles = problem.num_vehicles();
    let mut best = None;

    for v1 in 0..vehicles {
        let r1 = plan.route(v1);
        for p1 in 0..r1.len() {
            if budget.expired() {
                return best;
            }
            let a = r1[p1];
            let prev_a = pricing.prev(v1, r1, p1);
            let next_a = pricing.at(v1, r1, p1 + 1);

            for p2 in (p1 + 1)..r1.len() {
                let b = r1[p2];
                let prev_b = r1[p2 - 1];
                let next_b = pricing.at(v1, r1, p2 + 1);
                let delta = if p2 == p1 + 1 {
                    pricing.arc(v1, prev_a, b)
                        + pricing.arc(v1, b, a)
                        + pricing.arc(v1, a, next_b)
                        - pricing.arc(v1, prev_a, a)
                        - pricing.arc(v1, a, b)
                        - pricing.arc(v1, b, next_b)
                } else {
                    pricing.arc(v1, prev_a, b)
                        + pricing.arc(v1, b, next_a)
                        + pricing.arc(v1, prev_b, a)
                        + pricing.arc(v1, a, next_b)
                        - pricing.arc(v1, prev_a, a)
                        - pricing.arc(v1, a, next_a)
                        - pricing.arc(v1, prev_b, b)
                        - pricing.arc(v1, b, next_b)
                };
                consider(&mut best, Move::Exchange { v1, p1, v2: v1, p2 }, delta);
            }

            for v2 in (v1 + 1)..vehicles {
                let r2 = plan.route(v2);
                for p2 in 0..r2.len() {
                    let b = r2[p2];
                    let shift = i64::from(problem.demand(b)) - i64::from(problem.demand(a));
                    if !plan.fits(problem, v1, shift) || !plan.fits(problem, v2, -shift) {
                        continue;
                    }
                    let prev_b = pricing.prev(v2, r2, p2);
                    let next_b = pricing.at(v2, r2, p2 + 1);
                    let delta = pricing.arc(v1, prev_a, b) + pricing.arc(v1, b, next_a)
                        - pricing.arc(v1, prev_a, a)
                        - pricing.arc(v1, a, next_a)
                        + pricing.arc(v2, prev_b, a)
                        + pricing.arc(v2, a, next_b)
                        - pricing.arc(v2, prev_b, b)
                        - pricing.arc(v2, b, next_b);
                    consider(&mut best, Move::Exchange { v1, p1, v2, p2 }, delta);
                }
            }
        }
    }

    best
}
