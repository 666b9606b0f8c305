//! Parallel cheapest-arc construction.
//!
//! All vehicles grow their routes at the same time: each step picks, over
//! every vehicle, the cheapest arc from the vehicle's current tail to an
//! unrouted stop that still fits. Opening an idle vehicle also pays its
//! fixed cost. An extension is only taken when its marginal cost (the new
//! arc plus the way home, minus the old way home) is below the penalty of
//! leaving the stop out.
//!
//! The deadline is polled before every step. Past it, construction stops
//! and the stops not yet routed stay unassigned.
//!
//! # Complexity
//!
//! O(n² × V) where n = stops and V = vehicles.
//!
//! # Reference
//!
//! The "parallel cheapest arc" first-solution strategy of constraint-based
//! routing solvers; see also Christofides, Mingozzi & Toth (1979), "The
//! vehicle routing problem", in *Combinatorial Optimization*, Wiley.

use log::debug;

use super::budget::Budget;
use super::guided::Pricing;
use super::plan::Plan;

/// Builds a first plan, scanning stops in `order`. Ties are broken by
/// vehicle index, then by position in `order`.
pub(crate) fn parallel_cheapest_arc(
    pricing: &Pricing<'_>,
    order: &[usize],
    budget: &Budget,
) -> Plan {
    let problem = pricing.problem();
    let mut plan = Plan::empty(problem);

    loop {
        if budget.expired() {
            debug!("construction stopped at the deadline");
            break;
        }
        let mut best: Option<(i64, usize, usize)> = None;
        for v in 0..problem.num_vehicles() {
            let depot = problem.start(v);
            let route = plan.route(v);
            let tail = route.last().copied().unwrap_or(depot);
            let opening = if route.is_empty() { pricing.fixed() } else { 0 };
            for &node in order {
                let demand = i64::from(problem.demand(node));
                if plan.is_assigned(node) || !plan.fits(problem, v, demand) {
                    continue;
                }
                let key = pricing.arc(v, tail, node) + opening;
                let marginal = key + pricing.arc(v, node, depot) - pricing.arc(v, tail, depot);
                if marginal >= problem.penalty() {
                    continue;
                }
                if best.map_or(true, |(k, _, _)| key < k) {
                    best = Some((key, v, node));
                }
            }
        }
        match best {
            Some((_, v, node)) => plan.push(problem, v, node),
            None => break,
        }
    }

    debug!(
        "construction routed {} of {} stop(s)",
        problem.num_stops() - plan.num_unassigned(problem),
        problem.num_stops()
    );
    plan
}
