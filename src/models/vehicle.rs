//! Vehicle type with capacity, home depot, and cost parameters.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

use super::LocationSet;

/// Daily operating window in minutes after midnight.
///
/// Carried through for collaborators; the engine does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingWindow {
    /// Shift start, minutes after midnight.
    pub start_min: u32,
    /// Shift end, minutes after midnight.
    pub end_min: u32,
}

/// A vehicle that starts and ends its route at its assigned depot.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::Vehicle;
///
/// let v = Vehicle::new("V1", 200, "D1").with_cost_per_km(3.0);
/// assert_eq!(v.id(), "V1");
/// assert_eq!(v.capacity(), 200);
/// assert_eq!(v.depot_id(), "D1");
/// assert_eq!(v.cost_per_km(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: String,
    capacity: i32,
    depot_id: String,
    cost_per_km: Option<f64>,
    vehicle_type: Option<String>,
    operating_window: Option<OperatingWindow>,
}

impl Vehicle {
    /// Creates a vehicle with the given ID, capacity, and home depot.
    ///
    /// Default: no per-kilometre rate (the configured default applies),
    /// no type label, no operating window.
    pub fn new(id: impl Into<String>, capacity: i32, depot_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capacity,
            depot_id: depot_id.into(),
            cost_per_km: None,
            vehicle_type: None,
            operating_window: None,
        }
    }

    /// Sets the monetary cost per kilometre.
    pub fn with_cost_per_km(mut self, cost: f64) -> Self {
        self.cost_per_km = Some(cost);
        self
    }

    /// Sets a free-form type label ("van", "truck", ...).
    pub fn with_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = Some(vehicle_type.into());
        self
    }

    /// Sets the operating window.
    pub fn with_operating_window(mut self, window: OperatingWindow) -> Self {
        self.operating_window = Some(window);
        self
    }

    /// Vehicle ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maximum load capacity.
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    /// Identifier of the depot where the route starts and ends.
    pub fn depot_id(&self) -> &str {
        &self.depot_id
    }

    /// Cost per kilometre, if specified.
    pub fn cost_per_km(&self) -> Option<f64> {
        self.cost_per_km
    }

    /// Type label, if any.
    pub fn vehicle_type(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    /// Operating window, if any.
    pub fn operating_window(&self) -> Option<OperatingWindow> {
        self.operating_window
    }
}

/// Checks capacities, depot references, and identifier uniqueness.
pub fn validate_fleet(fleet: &[Vehicle], locations: &LocationSet) -> Result<(), InputError> {
    for (i, vehicle) in fleet.iter().enumerate() {
        if vehicle.capacity() <= 0 {
            return Err(InputError::NonPositiveCapacity {
                vehicle: vehicle.id().to_owned(),
                capacity: vehicle.capacity(),
            });
        }
        if locations.depot_index(vehicle.depot_id()).is_none() {
            return Err(InputError::MissingDepot {
                vehicle: vehicle.id().to_owned(),
                depot: vehicle.depot_id().to_owned(),
            });
        }
        if fleet[..i].iter().any(|other| other.id() == vehicle.id()) {
            return Err(InputError::DuplicateId(vehicle.id().to_owned()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;

    #[test]
    fn test_vehicle_new() {
        let v = Vehicle::new("V0", 200, "D");
        assert_eq!(v.id(), "V0");
        assert_eq!(v.capacity(), 200);
        assert_eq!(v.depot_id(), "D");
        assert!(v.cost_per_km().is_none());
        assert!(v.vehicle_type().is_none());
        assert!(v.operating_window().is_none());
    }

    #[test]
    fn test_vehicle_builder() {
        let window = OperatingWindow {
            start_min: 480,
            end_min: 1080,
        };
        let v = Vehicle::new("V1", 100, "D2")
            .with_cost_per_km(1.5)
            .with_type("van")
            .with_operating_window(window);
        assert_eq!(v.cost_per_km(), Some(1.5));
        assert_eq!(v.vehicle_type(), Some("van"));
        assert_eq!(v.operating_window(), Some(window));
    }

    #[test]
    fn test_validate_fleet() {
        let set = LocationSet::new(vec![Node::depot("D", "Depot", 0.0, 0.0)], Vec::new());
        assert!(validate_fleet(&[Vehicle::new("V1", 10, "D")], &set).is_ok());
        assert_eq!(
            validate_fleet(&[Vehicle::new("V1", 10, "X")], &set),
            Err(InputError::MissingDepot {
                vehicle: "V1".into(),
                depot: "X".into()
            })
        );
        assert!(matches!(
            validate_fleet(&[Vehicle::new("V1", 0, "D")], &set),
            Err(InputError::NonPositiveCapacity { capacity: 0, .. })
        ));
        assert_eq!(
            validate_fleet(
                &[Vehicle::new("V1", 10, "D"), Vehicle::new("V1", 20, "D")],
                &set
            ),
            Err(InputError::DuplicateId("V1".into()))
        );
    }
}
