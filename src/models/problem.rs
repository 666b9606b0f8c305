//! The immutable routing problem handed to the engine.

use crate::config::CalculationConfig;
use crate::distance::{CostMatrix, TravelMatrices};
use crate::error::{InputError, RoutingError};
use crate::objective::{Objective, ObjectiveModel};

use super::location::LocationSet;
use super::vehicle::{validate_fleet, Vehicle};

/// Default cost of leaving a stop unserved, in native objective units.
pub const DEFAULT_PENALTY: i64 = 1_000_000;

/// A validated multi-depot CVRP instance.
///
/// Node indices follow the [`LocationSet`]: depots first, then stops. Each
/// vehicle starts and ends at its own depot. The distance and duration
/// matrices are kept for reporting; the search prices arcs through the
/// [`Objective`].
///
/// # Examples
///
/// ```
/// use fleet_routing::config::CalculationConfig;
/// use fleet_routing::distance::CostMatrixBuilder;
/// use fleet_routing::models::{LocationSet, Node, RoutingProblem, Vehicle};
/// use fleet_routing::objective::{Goal, ObjectiveModel};
///
/// let locations = LocationSet::new(
///     vec![Node::depot("D", "Depot", 0.0, 0.0)],
///     vec![Node::stop("S1", "Shop", 0.0, 0.01, 5)],
/// );
/// let fleet = vec![Vehicle::new("V1", 10, "D")];
/// let matrices = CostMatrixBuilder::straight_line().build(&locations)?;
/// let calc = CalculationConfig::default();
/// let objective = ObjectiveModel::new(calc.clone()).build(Goal::Distance, &matrices, &fleet);
///
/// let problem = RoutingProblem::new(locations, fleet, &matrices, objective, &calc)?;
/// assert_eq!(problem.start(0), 0);
/// assert_eq!(problem.num_stops(), 1);
/// # Ok::<(), fleet_routing::RoutingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    locations: LocationSet,
    fleet: Vec<Vehicle>,
    starts: Vec<usize>,
    capacities: Vec<i32>,
    distance: CostMatrix,
    duration: CostMatrix,
    objective: Objective,
    penalty: i64,
    service_time_s: i64,
}

impl RoutingProblem {
    /// Validates the inputs and assembles the problem.
    ///
    /// Without a real duration matrix, durations are derived from distance at
    /// the configured average speed.
    pub fn new(
        locations: LocationSet,
        fleet: Vec<Vehicle>,
        matrices: &TravelMatrices,
        objective: Objective,
        calculation: &CalculationConfig,
    ) -> Result<Self, RoutingError> {
        locations.validate()?;
        validate_fleet(&fleet, &locations)?;

        let expected = locations.len();
        for size in [matrices.size(), objective.arc().size()] {
            if size != expected {
                return Err(InputError::MatrixSizeMismatch {
                    expected,
                    actual: size,
                }
                .into());
            }
        }
        check_cells("distance", matrices.distance())?;
        if let Some(duration) = matrices.duration() {
            check_cells("duration", duration)?;
        }
        for arc in objective.arc().matrices() {
            check_cells("cost", arc)?;
        }
        if let Some(priced) = objective.arc().num_vehicles() {
            if priced != fleet.len() {
                return Err(InputError::FleetMismatch {
                    expected: fleet.len(),
                    actual: priced,
                }
                .into());
            }
        }

        let starts = fleet
            .iter()
            .map(|v| {
                locations
                    .depot_index(v.depot_id())
                    .ok_or_else(|| InputError::MissingDepot {
                        vehicle: v.id().to_owned(),
                        depot: v.depot_id().to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let capacities = fleet.iter().map(Vehicle::capacity).collect();
        let duration = ObjectiveModel::new(calculation.clone()).durations(matrices);

        Ok(Self {
            locations,
            fleet,
            starts,
            capacities,
            distance: matrices.distance().clone(),
            duration,
            objective,
            penalty: DEFAULT_PENALTY,
            service_time_s: calculation.service_time_s(),
        })
    }

    /// Sets the cost of leaving a stop unserved.
    pub fn with_penalty(mut self, penalty: i64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Depots and stops.
    pub fn locations(&self) -> &LocationSet {
        &self.locations
    }

    /// The fleet, indexed by vehicle.
    pub fn fleet(&self) -> &[Vehicle] {
        &self.fleet
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.fleet.len()
    }

    /// Number of nodes (depots and stops).
    pub fn num_nodes(&self) -> usize {
        self.locations.len()
    }

    /// Number of stops.
    pub fn num_stops(&self) -> usize {
        self.locations.num_stops()
    }

    /// Start and end node of vehicle `v`.
    pub fn start(&self, v: usize) -> usize {
        self.starts[v]
    }

    /// Capacity of vehicle `v`.
    pub fn capacity(&self, v: usize) -> i32 {
        self.capacities[v]
    }

    /// Demand of a node; zero for depots.
    pub fn demand(&self, node: usize) -> i32 {
        self.locations.nodes()[node].demand()
    }

    /// Native cost for vehicle `v` to traverse `from -> to`.
    #[inline]
    pub fn arc_cost(&self, v: usize, from: usize, to: usize) -> i64 {
        self.objective.arc_cost(v, from, to)
    }

    /// The objective being minimised.
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Cost of leaving one stop unserved.
    ///
    /// Includes the objective's fixed vehicle cost, so a stop that a fresh
    /// vehicle could serve for less than the base penalty is never dropped
    /// just to avoid opening that vehicle.
    pub fn penalty(&self) -> i64 {
        self.penalty.saturating_add(self.objective.fixed_vehicle_cost())
    }

    /// Distance matrix in metres.
    pub fn distance(&self) -> &CostMatrix {
        &self.distance
    }

    /// Duration matrix in seconds.
    pub fn duration(&self) -> &CostMatrix {
        &self.duration
    }

    /// Dwell time per stop in seconds.
    pub fn service_time_s(&self) -> i64 {
        self.service_time_s
    }
}

/// Transit costs must be non-negative with a zero diagonal.
fn check_cells(matrix: &'static str, m: &CostMatrix) -> Result<(), InputError> {
    match m.invalid_cell() {
        Some((from, to, value)) => Err(InputError::InvalidMatrixCell {
            matrix,
            from,
            to,
            value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::CostMatrixBuilder;
    use crate::models::Node;
    use crate::objective::Goal;

    fn locations() -> LocationSet {
        LocationSet::new(
            vec![
                Node::depot("A", "North", 1.0, 0.0),
                Node::depot("B", "South", -1.0, 0.0),
            ],
            vec![
                Node::stop("S1", "One", 0.9, 0.0, 3),
                Node::stop("S2", "Two", -0.9, 0.0, 4),
            ],
        )
    }

    fn build(fleet: Vec<Vehicle>, goal: Goal) -> Result<RoutingProblem, RoutingError> {
        let locations = locations();
        let calc = CalculationConfig::default();
        let matrices = CostMatrixBuilder::straight_line()
            .build(&locations)
            .expect("valid locations");
        let objective = ObjectiveModel::new(calc.clone()).build(goal, &matrices, &fleet);
        RoutingProblem::new(locations, fleet, &matrices, objective, &calc)
    }

    #[test]
    fn test_vehicles_start_at_their_depots() {
        let problem = build(
            vec![Vehicle::new("V1", 10, "B"), Vehicle::new("V2", 10, "A")],
            Goal::Distance,
        )
        .expect("valid");
        assert_eq!(problem.start(0), 1);
        assert_eq!(problem.start(1), 0);
        assert_eq!(problem.capacity(0), 10);
        assert_eq!(problem.demand(3), 4);
        assert_eq!(problem.demand(0), 0);
        assert_eq!(problem.penalty(), DEFAULT_PENALTY);
        assert_eq!(problem.service_time_s(), 600);
        assert!(problem.duration().get(0, 2) > 0);
    }

    #[test]
    fn test_rejects_unknown_depot() {
        let err = build(vec![Vehicle::new("V1", 10, "Z")], Goal::Distance);
        assert!(matches!(
            err,
            Err(RoutingError::InvalidInput(InputError::MissingDepot { .. }))
        ));
    }

    #[test]
    fn test_rejects_mismatched_matrix() {
        let locs = locations();
        let fleet = vec![Vehicle::new("V1", 10, "A")];
        let calc = CalculationConfig::default();
        let small = TravelMatrices::from_distance(CostMatrix::new(2));
        let objective = ObjectiveModel::default().build(Goal::Distance, &small, &fleet);
        let err = RoutingProblem::new(locs, fleet, &small, objective, &calc);
        assert_eq!(
            err.err(),
            Some(RoutingError::InvalidInput(InputError::MatrixSizeMismatch {
                expected: 4,
                actual: 2
            }))
        );
    }

    #[test]
    fn test_rejects_objective_for_other_fleet() {
        let locs = locations();
        let calc = CalculationConfig::default();
        let matrices = CostMatrixBuilder::straight_line().build(&locs).expect("valid");
        let two = vec![Vehicle::new("V1", 10, "A"), Vehicle::new("V2", 10, "B")];
        let objective = ObjectiveModel::default().build(Goal::Cost, &matrices, &two);
        let one = vec![Vehicle::new("V1", 10, "A")];
        let err = RoutingProblem::new(locs, one, &matrices, objective, &calc);
        assert!(matches!(
            err,
            Err(RoutingError::InvalidInput(InputError::FleetMismatch { expected: 1, actual: 2 }))
        ));
    }

    fn with_distance(distance: CostMatrix) -> Result<RoutingProblem, RoutingError> {
        let fleet = vec![Vehicle::new("V1", 10, "A")];
        let calc = CalculationConfig::default();
        let matrices = TravelMatrices::from_distance(distance);
        let objective = ObjectiveModel::default().build(Goal::Distance, &matrices, &fleet);
        RoutingProblem::new(locations(), fleet, &matrices, objective, &calc)
    }

    #[test]
    fn test_rejects_negative_cost() {
        let mut distance = CostMatrix::from_fn(4, |_, _| 1_000);
        distance.set(0, 2, -5_000);
        assert_eq!(
            with_distance(distance).err(),
            Some(RoutingError::InvalidInput(InputError::InvalidMatrixCell {
                matrix: "distance",
                from: 0,
                to: 2,
                value: -5_000
            }))
        );
    }

    #[test]
    fn test_rejects_nonzero_diagonal() {
        let mut distance = CostMatrix::from_fn(4, |_, _| 1_000);
        distance.set(1, 1, 7);
        assert!(matches!(
            with_distance(distance),
            Err(RoutingError::InvalidInput(InputError::InvalidMatrixCell {
                from: 1,
                to: 1,
                value: 7,
                ..
            }))
        ));
    }

    #[test]
    fn test_rejects_negative_duration() {
        let fleet = vec![Vehicle::new("V1", 10, "A")];
        let calc = CalculationConfig::default();
        let mut duration = CostMatrix::from_fn(4, |_, _| 60);
        duration.set(3, 0, -1);
        let matrices = TravelMatrices::from_distance(CostMatrix::from_fn(4, |_, _| 1_000))
            .with_duration(duration);
        let objective = ObjectiveModel::default().build(Goal::Distance, &matrices, &fleet);
        let err = RoutingProblem::new(locations(), fleet, &matrices, objective, &calc);
        assert!(matches!(
            err,
            Err(RoutingError::InvalidInput(InputError::InvalidMatrixCell {
                matrix: "duration",
                ..
            }))
        ));
    }

    #[test]
    fn test_fleet_size_penalty_covers_fixed_cost() {
        let problem = build(vec![Vehicle::new("V1", 10, "A")], Goal::FleetSize)
            .expect("valid")
            .with_penalty(1_000);
        assert_eq!(problem.penalty(), 1_000 + 5_000_000);
    }
}
