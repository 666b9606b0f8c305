//! Route and visit types.

use serde::Serialize;

use crate::objective::ReportUnit;

use super::node::Node;
use super::vehicle::Vehicle;

/// One stop on an itinerary, or the depot at either end.
///
/// Cumulative fields count from the moment the vehicle leaves its depot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    /// Node index in the location set.
    pub node_index: usize,
    /// Node identifier.
    pub node_id: String,
    /// Node display name.
    pub name: String,
    /// Load delivered so far, after this visit.
    pub load_after: i32,
    /// Native objective cost of the arcs driven so far.
    pub cumulative_cost: i64,
    /// Metres driven so far.
    pub cumulative_distance_m: i64,
    /// Seconds since departure when the vehicle arrives.
    pub arrival_s: i64,
    /// Seconds since departure when the vehicle leaves (arrival + service).
    pub departure_s: i64,
}

/// The itinerary of one vehicle: its depot, the stops in order, its depot.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{Node, Route, Vehicle, Visit};
/// use fleet_routing::objective::ReportUnit;
///
/// let vehicle = Vehicle::new("V1", 100, "D");
/// let depot = Node::depot("D", "Depot", 0.0, 0.0);
/// let mut route = Route::new(0, &vehicle, &depot, ReportUnit::Kilometers);
/// route.push_visit(Visit {
///     node_index: 1,
///     node_id: "S1".into(),
///     name: "Shop".into(),
///     load_after: 25,
///     cumulative_cost: 1_500,
///     cumulative_distance_m: 1_500,
///     arrival_s: 135,
///     departure_s: 735,
/// });
/// assert_eq!(route.load(), 25);
/// assert_eq!(route.utilization(), 25.0);
/// assert_eq!(route.objective_value(), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    vehicle_index: usize,
    vehicle_id: String,
    vehicle_type: Option<String>,
    depot_id: String,
    depot_name: String,
    capacity: i32,
    unit: ReportUnit,
    visits: Vec<Visit>,
}

impl Route {
    /// Creates an empty route for `vehicle` based at `depot`.
    pub fn new(vehicle_index: usize, vehicle: &Vehicle, depot: &Node, unit: ReportUnit) -> Self {
        Self {
            vehicle_index,
            vehicle_id: vehicle.id().to_owned(),
            vehicle_type: vehicle.vehicle_type().map(str::to_owned),
            depot_id: depot.id().to_owned(),
            depot_name: depot.name().to_owned(),
            capacity: vehicle.capacity(),
            unit,
            visits: Vec::new(),
        }
    }

    /// Appends a visit.
    pub fn push_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Index of the vehicle in the fleet.
    pub fn vehicle_index(&self) -> usize {
        self.vehicle_index
    }

    /// Vehicle identifier.
    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Vehicle type label, if any.
    pub fn vehicle_type(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    /// Depot identifier.
    pub fn depot_id(&self) -> &str {
        &self.depot_id
    }

    /// Depot display name.
    pub fn depot_name(&self) -> &str {
        &self.depot_name
    }

    /// All visits, depot to depot.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Visits excluding the depot at either end.
    pub fn stops(&self) -> &[Visit] {
        let n = self.visits.len();
        if n < 2 {
            return &[];
        }
        &self.visits[1..n - 1]
    }

    /// Number of stops served.
    pub fn num_stops(&self) -> usize {
        self.stops().len()
    }

    /// Stop identifiers in visiting order.
    pub fn stop_ids(&self) -> Vec<&str> {
        self.stops().iter().map(|v| v.node_id.as_str()).collect()
    }

    /// Returns `true` if no stop is served.
    pub fn is_empty(&self) -> bool {
        self.num_stops() == 0
    }

    /// Total load carried.
    pub fn load(&self) -> i32 {
        self.visits.last().map_or(0, |v| v.load_after)
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Load as a percentage of capacity; 0 for a zero capacity.
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        f64::from(self.load()) / f64::from(self.capacity) * 100.0
    }

    /// Native transit cost, without any fixed vehicle cost.
    pub fn cost(&self) -> i64 {
        self.visits.last().map_or(0, |v| v.cumulative_cost)
    }

    /// Transit cost in the reporting unit.
    pub fn objective_value(&self) -> f64 {
        self.unit.convert(self.cost())
    }

    /// Metres driven.
    pub fn distance_m(&self) -> i64 {
        self.visits.last().map_or(0, |v| v.cumulative_distance_m)
    }

    /// Kilometres driven.
    pub fn distance_km(&self) -> f64 {
        self.distance_m() as f64 / 1000.0
    }

    /// Seconds from departure to return, service time included.
    pub fn duration_s(&self) -> i64 {
        self.visits.last().map_or(0, |v| v.arrival_s)
    }

    /// Minutes from departure to return, service time included.
    pub fn duration_min(&self) -> f64 {
        self.duration_s() as f64 / 60.0
    }
}
