//! Leaving a stop unserved.
//!
//! The delta is the unserved-stop penalty minus the saving from removing
//! the stop, so a drop only wins when serving the stop costs more than the
//! penalty.

use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::relocate::removal_delta;
use super::{consider, Candidate, Move};

pub(crate) fn best(plan: &Plan, pricing: &Pricing<'_>) -> Option<Candidate> {
    let penalty = pricing.problem().penalty();
    let mut best = None;

    for vehicle in 0..pricing.problem().num_vehicles() {
        let route = plan.route(vehicle);
        for pos in 0..route.len() {
            let delta = penalty + removal_delta(pricing, vehicle, route, pos);
            consider(&mut best, Move::Drop { vehicle, pos }, delta);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moves::test_support::line_problem;
    use crate::models::Vehicle;

    #[test]
    fn test_drops_stop_dearer_than_penalty() {
        let problem = line_problem(&[0], &[(1, 1), (50, 1)], vec![Vehicle::new("A", 5, "D0")])
            .with_penalty(1_000);
        let mut plan = Plan::empty(&problem);
        plan.push(&problem, 0, 1);
        plan.push(&problem, 0, 2);
        let pricing = Pricing::real(&problem);
        let found = best(&plan, &pricing).expect("improving drop");
        assert_eq!(found.mv, Move::Drop { vehicle: 0, pos: 1 });
        // 0-1-50-0 = 100 km becomes 0-1-0 = 2 km, plus the penalty
        assert_eq!(found.delta, -97_000);
    }

    #[test]
    fn test_keeps_stops_under_default_penalty() {
        let problem = line_problem(&[0], &[(1, 1), (50, 1)], vec![Vehicle::new("A", 5, "D0")]);
        let mut plan = Plan::empty(&problem);
        plan.push(&problem, 0, 1);
        plan.push(&problem, 0, 2);
        assert!(best(&plan, &Pricing::real(&problem)).is_none());
    }
}
