//! Intra-route 2-opt.
//!
//! # Algorithm
//!
//! Reverses a segment `route[i..=j]`. Road matrices are asymmetric, so the
//! reversed segment is repriced arc by arc: the forward and backward costs
//! of the segment grow incrementally as `j` advances.
//!
//! # Complexity
//!
//! O(n²) per route.
//!
//! # Reference
//!
//! Croes, G. A. (1958). "A Method for Solving Traveling-Salesman Problems",
//! *Operations Research* 6(6), 791-812.

use crate::engine::budget::Budget;
use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::{consider, Candidate, Move};

pub(crate) fn best(plan: &Plan, pricing: &Pricing<'_>, budget: &Budget) -> Option<Candidate> {
    let mut best = None;

    for v in 0..pricing.problem().num_vehicles() {
        let route = plan.route(v);
        let n = route.len();
        for i in 0..n.saturating_sub(1) {
            if budget.expired() {
                return best;
            }
            let prev = pricing.prev(v, route, i);
            let mut forward = 0;
            let mut backward = 0;
            for j in (i + 1)..n {
                forward += pricing.arc(v, route[j - 1], route[j]);
                backward += pricing.arc(v, route[j], route[j - 1]);
                let next = pricing.at(v, route, j + 1);
                let delta = pricing.arc(v, prev, route[j])
                    + backward
                    + pricing.arc(v, route[i], next)
                    - pricing.arc(v, prev, route[i])
                    - forward
                    - pricing.arc(v, route[j], next);
                consider(&mut best, Move::TwoOpt { vehicle: v, i, j }, delta);
            }
        }
    }

    best
}
