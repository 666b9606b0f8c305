//! Reconstruction of itineraries from an engine assignment.

use log::debug;

use crate::engine::Assignment;
use crate::models::{Route, RoutingProblem, Solution, UnassignedStop, Visit};

/// Turns an [`Assignment`] into a reportable [`Solution`].
///
/// Each used vehicle's sequence is walked depot → stops → depot. Costs use
/// the same arc prices as the search; distances come from the metre matrix
/// and times from the duration matrix plus service time at every stop.
/// Idle vehicles produce no route.
///
/// # Examples
///
/// ```
/// use fleet_routing::config::CalculationConfig;
/// use fleet_routing::distance::{CostMatrix, TravelMatrices};
/// use fleet_routing::engine::Assignment;
/// use fleet_routing::extraction::SolutionExtractor;
/// use fleet_routing::models::{LocationSet, Node, RoutingProblem, Vehicle};
/// use fleet_routing::objective::{Goal, ObjectiveModel};
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D", "Depot", 0.0, 0.0)],
///     vec![Node::stop("S1", "Shop", 0.0, 0.0, 30), Node::stop("S2", "Bar", 0.0, 0.0, 90)],
/// );
/// let fleet = vec![Vehicle::new("V1", 100, "D")];
/// let matrices = TravelMatrices::from_distance(CostMatrix::from_fn(3, |_, _| 2_000));
/// let calc = CalculationConfig::default();
/// let objective = ObjectiveModel::new(calc.clone()).build(Goal::Distance, &matrices, &fleet);
/// let problem = RoutingProblem::new(locations, fleet, &matrices, objective, &calc)?;
///
/// let assignment = Assignment::from_routes(&problem, vec![vec![1]]);
/// let solution = SolutionExtractor::new().extract(&problem, &assignment);
/// assert_eq!(solution.num_routes(), 1);
/// assert_eq!(solution.total_objective(), 4.0);
/// assert_eq!(solution.unassigned()[0].id, "S2");
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionExtractor;

impl SolutionExtractor {
    /// Creates an extractor.
    pub fn new() -> Self {
        Self
    }

    /// Walks every used vehicle's sequence and lists the unassigned stops.
    pub fn extract(&self, problem: &RoutingProblem, assignment: &Assignment) -> Solution {
        let unit = problem.objective().unit();
        let nodes = problem.locations().nodes();
        let service = problem.service_time_s();

        let mut routes = Vec::new();
        for (v, sequence) in assignment.routes().iter().enumerate() {
            if sequence.is_empty() {
                continue;
            }
            let depot = problem.start(v);
            let mut route = Route::new(v, &problem.fleet()[v], &nodes[depot], unit);
            route.push_visit(Visit {
                node_index: depot,
                node_id: nodes[depot].id().to_owned(),
                name: nodes[depot].name().to_owned(),
                load_after: 0,
                cumulative_cost: 0,
                cumulative_distance_m: 0,
                arrival_s: 0,
                departure_s: 0,
            });

            let mut prev = depot;
            let mut load = 0;
            let mut cost = 0;
            let mut distance = 0;
            let mut clock = 0;
            for &node in sequence.iter().chain(std::iter::once(&depot)) {
                cost += problem.arc_cost(v, prev, node);
                distance += problem.distance().get(prev, node);
                clock += problem.duration().get(prev, node);
                let arrival = clock;
                if node != depot {
                    load = problem.demand(node).saturating_add(load);
                    clock += service;
                }
                route.push_visit(Visit {
                    node_index: node,
                    node_id: nodes[node].id().to_owned(),
                    name: nodes[node].name().to_owned(),
                    load_after: load,
                    cumulative_cost: cost,
                    cumulative_distance_m: distance,
                    arrival_s: arrival,
                    departure_s: clock,
                });
                prev = node;
            }
            debug!(
                "vehicle {} serves {} stop(s), load {}/{}",
                route.vehicle_id(),
                route.num_stops(),
                route.load(),
                route.capacity()
            );
            routes.push(route);
        }

        let unassigned = assignment
            .unassigned()
            .iter()
            .map(|&s| UnassignedStop {
                node_index: s,
                id: nodes[s].id().to_owned(),
                name: nodes[s].name().to_owned(),
                demand: nodes[s].demand(),
            })
            .collect();

        Solution::new(problem.objective().goal(), routes, unassigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CalculationConfig;
    use crate::distance::{CostMatrix, TravelMatrices};
    use crate::models::{LocationSet, Node, Vehicle};
    use crate::objective::{Goal, ObjectiveModel, ReportUnit};

    /// Depots D and E, stops A to C at nodes 2..=4; every arc is 1 km and 90 s.
    fn problem(goal: Goal, fleet: Vec<Vehicle>) -> RoutingProblem {
        let locations = LocationSet::new(
            vec![Node::depot("D", "Depot", 0.0, 0.0), Node::depot("E", "East", 0.0, 1.0)],
            vec![
                Node::stop("A", "Alpha", 0.0, 0.0, 10),
                Node::stop("B", "Bravo", 0.0, 0.0, 20),
                Node::stop("C", "Charlie", 0.0, 0.0, 30),
            ],
        );
        let matrices = TravelMatrices::from_distance(CostMatrix::from_fn(5, |_, _| 1_000))
            .with_duration(CostMatrix::from_fn(5, |_, _| 90));
        let calc = CalculationConfig::default();
        let objective = ObjectiveModel::new(calc.clone()).build(goal, &matrices, &fleet);
        RoutingProblem::new(locations, fleet, &matrices, objective, &calc).expect("valid")
    }

    #[test]
    fn test_walks_depot_to_depot() {
        let p = problem(Goal::Distance, vec![Vehicle::new("V1", 100, "D").with_type("van")]);
        let assignment = Assignment::from_routes(&p, vec![vec![3, 2]]);
        let sol = SolutionExtractor::new().extract(&p, &assignment);
        let route = &sol.routes()[0];
        assert_eq!(route.vehicle_type(), Some("van"));
        assert_eq!(route.stop_ids(), vec!["B", "A"]);
        let visits = route.visits();
        assert_eq!(visits.len(), 4);
        assert_eq!(visits[0].node_id, "D");
        assert_eq!(visits[3].node_id, "D");
        assert_eq!(visits[1].load_after, 20);
        assert_eq!(visits[2].load_after, 30);
        assert_eq!(route.load(), 30);
        assert!((route.utilization() - 30.0).abs() < 1e-9);
        assert_eq!(route.distance_m(), 3_000);
        assert_eq!(route.cost(), 3_000);
        assert_eq!(sol.total_objective(), 3.0);
    }

    #[test]
    fn test_service_time_in_duration() {
        let p = problem(Goal::Time, vec![Vehicle::new("V1", 100, "D")]);
        let assignment = Assignment::from_routes(&p, vec![vec![2, 3]]);
        let sol = SolutionExtractor::new().extract(&p, &assignment);
        let route = &sol.routes()[0];
        let visits = route.visits();
        assert_eq!(visits[1].arrival_s, 90);
        assert_eq!(visits[1].departure_s, 690);
        assert_eq!(visits[2].arrival_s, 780);
        // three arcs plus two services
        assert_eq!(route.duration_s(), 3 * 90 + 2 * 600);
        // time goal reports travel only
        assert_eq!(route.cost(), 270);
        assert_eq!(sol.unit(), ReportUnit::Minutes);
        assert_eq!(sol.total_objective(), 4.5);
    }

    #[test]
    fn test_drops_idle_vehicles_and_lists_unassigned() {
        let p = problem(
            Goal::Distance,
            vec![Vehicle::new("V1", 100, "D"), Vehicle::new("V2", 100, "E")],
        );
        let assignment = Assignment::from_routes(&p, vec![vec![], vec![4]]);
        let sol = SolutionExtractor::new().extract(&p, &assignment);
        assert_eq!(sol.num_routes(), 1);
        assert_eq!(sol.routes()[0].vehicle_id(), "V2");
        assert_eq!(sol.routes()[0].depot_name(), "East");
        let ids: Vec<&str> = sol.unassigned().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(sol.unassigned()[1].demand, 20);
        assert!(sol.is_partial());
    }

    #[test]
    fn test_fleet_size_excludes_fixed_cost() {
        let p = problem(Goal::FleetSize, vec![Vehicle::new("V1", 100, "D")]);
        let sol = SolutionExtractor::new().extract(&p, &Assignment::from_routes(&p, vec![vec![2]]));
        assert_eq!(sol.total_cost(), 2_000);
    }
}
