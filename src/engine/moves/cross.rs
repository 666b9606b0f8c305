//! Inter-route tail exchange (2-opt*).
//!
//! # Algorithm
//!
//! For two vehicles, cuts each route and swaps the tails:
//! `r1[..c1] + r2[c2..]` and `r2[..c2] + r1[c1..]`. A cut at 0 hands the
//! whole route over, which is how a route moves to a vehicle at another
//! depot. Head costs (under the owning vehicle) and tail costs (under the
//! receiving vehicle, back to its depot) are precomputed so each cut pair
//! is priced in O(1).
//!
//! # Complexity
//!
//! O(n1 × n2) per vehicle pair.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An exchange heuristic for
//! routing problems with time windows", *Journal of the Operational
//! Research Society* 46(12), 1433-1446.

use crate::engine::budget::Budget;
use crate::engine::guided::Pricing;
use crate::engine::plan::Plan;

use super::{consider, Candidate, Move};

/// `heads[k]`: vehicle `v` driving from its depot through `route[..k]`.
fn heads(pricing: &Pricing<'_>, v: usize, route: &[usize]) -> Vec<i64> {
    let mut out = Vec::with_capacity(route.len() + 1);
    let mut prev = pricing.problem().start(v);
    let mut acc = 0;
    out.push(0);
    for &node in route {
        acc += pricing.arc(v, prev, node);
        out.push(acc);
        prev = node;
    }
    out
}

/// `tails[k]`: vehicle `v` driving `route[k..]` and back to its depot.
fn tails(pricing: &Pricing<'_>, v: usize, route: &[usize]) -> Vec<i64> {
    let n = route.len();
    let depot = pricing.problem().start(v);
    let mut out = vec![0; n + 1];
    let mut next = depot;
    for k in (0..n).rev() {
        out[k] = out[k + 1] + pricing.arc(v, route[k], next);
        next = route[k];
    }
    out
}

fn prefix_loads(pricing: &Pricing<'_>, route: &[usize]) -> Vec<i64> {
    let problem = pricing.problem();
    let mut out = Vec::with_capacity(route.len() + 1);
    let mut acc = 0;
    out.push(0);
    for &node in route {
        acc += i64::from(problem.demand(node));
        out.push(acc);
    }
    out
}

pub(crate) fn best(plan: &Plan, pricing: &Pricing<'_>, budget: &Budget) -> Option<Candidate> {
    let problem = pricing.problem();
    let vehicles = problem.num_vehicles();
    let mut best = None;

    for v1 in 0..vehicles {
        let r1 = plan.route(v1);
        let n1 = r1.len();
        let heads1 = heads(pricing, v1, r1);
        let loads1 = prefix_loads(pricing, r1);
        let before1 = pricing.route_cost(v1, r1);

        for v2 in (v1 + 1)..vehicles {
            let r2 = plan.route(v2);
            let n2 = r2.len();
            if n1 == 0 && n2 == 0 {
                continue;
            }
            if budget.expired() {
                return best;
            }
            let heads2 = heads(pricing, v2, r2);
            let loads2 = prefix_loads(pricing, r2);
            // r1's tail is driven by v2, r2's tail by v1
            let tails1 = tails(pricing, v2, r1);
            let tails2 = tails(pricing, v1, r2);
            let before = before1 + pricing.route_cost(v2, r2);

            for cut1 in 0..=n1 {
                for cut2 in 0..=n2 {
                    if cut1 == n1 && cut2 == n2 {
                        continue;
                    }
                    let load1 = loads1[cut1] + loads2[n2] - loads2[cut2];
                    let load2 = loads2[cut2] + loads1[n1] - loads1[cut1];
                    if load1 > i64::from(problem.capacity(v1))
                        || load2 > i64::from(problem.capacity(v2))
                    {
                        continue;
                    }

                    // `at` past the end of a route yields the driving vehicle's depot
                    let after1 = if cut1 + (n2 - cut2) == 0 {
                        0
                    } else {
                        let join =
                            pricing.arc(v1, pricing.prev(v1, r1, cut1), pricing.at(v1, r2, cut2));
                        heads1[cut1] + join + tails2[cut2] + pricing.fixed()
                    };
                    let after2 = if cut2 + (n1 - cut1) == 0 {
                        0
                    } else {
                        let join =
                            pricing.arc(v2, pricing.prev(v2, r2, cut2), pricing.at(v2, r1, cut1));
                        heads2[cut2] + join + tails1[cut1] + pricing.fixed()
                    };

                    let mv = Move::Cross { v1, cut1, v2, cut2 };
                    consider(&mut best, mv, after1 + after2 - before);
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moves::test_support::{line_problem, unlimited};
    use crate::models::Vehicle;

    #[test]
    fn test_swaps_tails_between_depots() {
        // A at 0 drives 1 then 9; B at 10 drives 8 then 2
        let problem = line_problem(
            &[0, 10],
            &[(1, 1), (9, 1), (8, 1), (2, 1)],
            vec![Vehicle::new("A", 2, "D0"), Vehicle::new("B", 2, "D1")],
        );
        let mut plan = Plan::empty(&problem);
        plan.push(&problem, 0, 2);
        plan.push(&problem, 0, 3);
        plan.push(&problem, 1, 4);
        plan.push(&problem, 1, 5);
        let pricing = Pricing::real(&problem);
        let found = best(&plan, &pricing, &unlimited()).expect("improving cross");
        assert_eq!(
            found.mv,
            Move::Cross {
                v1: 0,
                cut1: 1,
                v2: 1,
                cut2: 1
            }
        );
        // 18 + 16 km becomes 4 + 4 km
        assert_eq!(found.delta, -26_000);
        found.mv.apply(&problem, &mut plan);
        assert_eq!(plan.route(0), &[2, 5]);
        assert_eq!(plan.route(1), &[4, 3]);
    }

    #[test]
    fn test_hands_whole_route_to_idle_vehicle() {
        let problem = line_problem(
            &[0, 10],
            &[(9, 1), (8, 1)],
            vec![Vehicle::new("A", 5, "D0"), Vehicle::new("B", 5, "D1")],
        );
        let mut plan = Plan::empty(&problem);
        plan.push(&problem, 0, 2);
        plan.push(&problem, 0, 3);
        let pricing = Pricing::real(&problem);
        let found = best(&plan, &pricing, &unlimited()).expect("improving cross");
        assert_eq!(
            found.mv,
            Move::Cross {
                v1: 0,
                cut1: 0,
                v2: 1,
                cut2: 0
            }
        );
        assert_eq!(found.delta, -14_000);
    }

    #[test]
    fn test_delta_matches_recomputation() {
        let problem = line_problem(
            &[0, 6],
            &[(5, 1), (1, 1), (4, 1), (2, 1), (7, 1)],
            vec![Vehicle::new("A", 3, "D0"), Vehicle::new("B", 3, "D1")],
        );
        let mut plan = Plan::empty(&problem);
        for node in [2, 3, 4] {
            plan.push(&problem, 0, node);
        }
        for node in [5, 6] {
            plan.push(&problem, 1, node);
        }
        let pricing = Pricing::real(&problem);
        let found = best(&plan, &pricing, &unlimited()).expect("improving cross");
        let before = plan.cost(&problem, &pricing);
        found.mv.apply(&problem, &mut plan);
        assert_eq!(plan.cost(&problem, &pricing) - before, found.delta);
    }
}
