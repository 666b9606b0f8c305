//! Arc costs derived from travel matrices for a goal.

use log::debug;

use crate::config::CalculationConfig;
use crate::distance::{seconds_at_speed, CostMatrix, TravelMatrices};
use crate::models::Vehicle;

use super::goal::{Goal, ReportUnit};

/// Transit cost per arc, either shared by the fleet or per vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcCost {
    /// Every vehicle pays the same.
    Shared(CostMatrix),
    /// `matrices[by_vehicle[v]]` prices vehicle `v`. Vehicles with the same
    /// rate share a matrix.
    PerVehicle {
        /// Distinct cost matrices.
        matrices: Vec<CostMatrix>,
        /// Matrix index for each vehicle.
        by_vehicle: Vec<usize>,
    },
}

impl ArcCost {
    /// Cost for `vehicle` to go from node `from` to node `to`.
    #[inline]
    pub fn cost(&self, vehicle: usize, from: usize, to: usize) -> i64 {
        match self {
            Self::Shared(m) => m.get(from, to),
            Self::PerVehicle {
                matrices,
                by_vehicle,
            } => matrices[by_vehicle[vehicle]].get(from, to),
        }
    }

    /// Number of nodes the matrices cover.
    pub fn size(&self) -> usize {
        match self {
            Self::Shared(m) => m.size(),
            Self::PerVehicle { matrices, .. } => matrices.first().map_or(0, CostMatrix::size),
        }
    }

    /// Every distinct matrix, the shared one or one per rate.
    pub fn matrices(&self) -> &[CostMatrix] {
        match self {
            Self::Shared(m) => std::slice::from_ref(m),
            Self::PerVehicle { matrices, .. } => matrices,
        }
    }

    /// Number of vehicles priced individually, `None` when shared.
    pub fn num_vehicles(&self) -> Option<usize> {
        match self {
            Self::Shared(_) => None,
            Self::PerVehicle { by_vehicle, .. } => Some(by_vehicle.len()),
        }
    }
}

/// A goal turned into integer arc costs plus a fixed cost per used vehicle.
///
/// The fixed cost only steers the search; reported totals exclude it.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    goal: Goal,
    arc: ArcCost,
    fixed_vehicle_cost: i64,
}

impl Objective {
    /// Assembles an objective from its parts.
    pub fn new(goal: Goal, arc: ArcCost, fixed_vehicle_cost: i64) -> Self {
        Self {
            goal,
            arc,
            fixed_vehicle_cost,
        }
    }

    /// The goal this objective encodes.
    pub fn goal(&self) -> Goal {
        self.goal
    }

    /// Reporting unit of the goal.
    pub fn unit(&self) -> ReportUnit {
        self.goal.report_unit()
    }

    /// Arc costs.
    pub fn arc(&self) -> &ArcCost {
        &self.arc
    }

    /// Cost for `vehicle` to traverse `from -> to`.
    #[inline]
    pub fn arc_cost(&self, vehicle: usize, from: usize, to: usize) -> i64 {
        self.arc.cost(vehicle, from, to)
    }

    /// Cost charged once for every vehicle that leaves its depot.
    pub fn fixed_vehicle_cost(&self) -> i64 {
        self.fixed_vehicle_cost
    }
}

/// Derives [`Objective`]s from travel matrices.
///
/// # Examples
///
/// ```
/// use fleet_routing::config::CalculationConfig;
/// use fleet_routing::distance::{CostMatrix, TravelMatrices};
/// use fleet_routing::models::Vehicle;
/// use fleet_routing::objective::{Goal, ObjectiveModel};
///
/// let mut distance = CostMatrix::new(2);
/// distance.set(0, 1, 4_000);
/// distance.set(1, 0, 4_000);
/// let matrices = TravelMatrices::from_distance(distance);
/// let fleet = vec![Vehicle::new("V1", 10, "D").with_cost_per_km(3.0)];
///
/// let model = ObjectiveModel::new(CalculationConfig::default());
/// let objective = model.build(Goal::Cost, &matrices, &fleet);
/// // 4 km at 3.0 per km, in cents
/// assert_eq!(objective.arc_cost(0, 0, 1), 1_200);
///
/// let time = model.build(Goal::Time, &matrices, &fleet);
/// // 4 km at 40 km/h
/// assert_eq!(time.arc_cost(0, 0, 1), 360);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectiveModel {
    config: CalculationConfig,
}

impl ObjectiveModel {
    /// Creates a model with the given constants.
    pub fn new(config: CalculationConfig) -> Self {
        Self { config }
    }

    /// Constants in use.
    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    /// Builds the objective for `goal`. The input matrices are not modified.
    pub fn build(&self, goal: Goal, matrices: &TravelMatrices, fleet: &[Vehicle]) -> Objective {
        debug!("deriving {goal} arc costs for {} vehicle(s)", fleet.len());
        let distance = matrices.distance();
        match goal {
            Goal::Distance => Objective::new(goal, ArcCost::Shared(distance.clone()), 0),
            Goal::Time => Objective::new(goal, ArcCost::Shared(self.durations(matrices)), 0),
            Goal::Cost => Objective::new(goal, self.money(distance, fleet), 0),
            Goal::FleetSize => Objective::new(
                goal,
                ArcCost::Shared(distance.clone()),
                self.config.vehicle_fixed_cost,
            ),
            Goal::Balanced => {
                let durations = self.durations(matrices);
                let w_d = self.config.balanced_distance_weight;
                let w_t = self.config.balanced_time_weight;
                let blended = CostMatrix::from_fn(distance.size(), |i, j| {
                    let metres = distance.get(i, j) as f64;
                    let minutes_scaled = durations.get(i, j) as f64 * 1000.0 / 60.0;
                    (w_d * metres + w_t * minutes_scaled).round() as i64
                });
                Objective::new(goal, ArcCost::Shared(blended), 0)
            }
        }
    }

    /// Real durations when present, otherwise distance at the average speed.
    pub fn durations(&self, matrices: &TravelMatrices) -> CostMatrix {
        match matrices.duration() {
            Some(d) => d.clone(),
            None => {
                let speed = self.config.average_speed_kmh;
                matrices.distance().map(|m| seconds_at_speed(m, speed))
            }
        }
    }

    fn money(&self, distance: &CostMatrix, fleet: &[Vehicle]) -> ArcCost {
        let mut rates: Vec<f64> = Vec::new();
        let mut by_vehicle = Vec::with_capacity(fleet.len());
        for vehicle in fleet {
            let rate = vehicle
                .cost_per_km()
                .unwrap_or(self.config.default_cost_per_km);
            let index = match rates.iter().position(|r| *r == rate) {
                Some(index) => index,
                None => {
                    rates.push(rate);
                    rates.len() - 1
                }
            };
            by_vehicle.push(index);
        }
        let matrices = rates
            .iter()
            .map(|rate| distance.map(|m| (m as f64 / 1000.0 * rate * 100.0).round() as i64))
            .collect();
        ArcCost::PerVehicle {
            matrices,
            by_vehicle,
        }
    }
}
