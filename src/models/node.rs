//! Depot and stop nodes.

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::Coordinates;
///
/// let bogota = Coordinates::new(4.711, -74.072);
/// assert!(bogota.is_valid());
/// assert!(!Coordinates::new(91.0, 0.0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, −90..=90.
    pub latitude: f64,
    /// Longitude in degrees, −180..=180.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair. Range checking happens in [`is_valid`](Self::is_valid).
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Whether a node is a depot or a delivery stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Start and end location for one or more vehicles.
    Depot,
    /// A delivery location with positive demand.
    Stop,
}

/// A depot or a stop.
///
/// # Examples
///
/// ```
/// use fleet_routing::models::{Node, NodeKind};
///
/// let depot = Node::depot("D1", "Central warehouse", 4.60, -74.08);
/// assert_eq!(depot.kind(), NodeKind::Depot);
/// assert_eq!(depot.demand(), 0);
///
/// let stop = Node::stop("S1", "Corner shop", 4.65, -74.05, 30)
///     .with_address("Cra 7 # 45-10", "Bogota", "Colombia");
/// assert_eq!(stop.demand(), 30);
/// assert_eq!(stop.city(), Some("Bogota"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    name: String,
    kind: NodeKind,
    coordinates: Coordinates,
    demand: i32,
    address: Option<String>,
    city: Option<String>,
    country: Option<String>,
}

impl Node {
    /// Creates a depot (demand 0).
    pub fn depot(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Depot,
            coordinates: Coordinates::new(latitude, longitude),
            demand: 0,
            address: None,
            city: None,
            country: None,
        }
    }

    /// Creates a stop with the given demand.
    pub fn stop(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        demand: i32,
    ) -> Self {
        Self {
            kind: NodeKind::Stop,
            demand,
            ..Self::depot(id, name, latitude, longitude)
        }
    }

    /// Attaches the postal address used by road-network lookups.
    pub fn with_address(
        mut self,
        address: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        self.address = Some(address.into());
        self.city = Some(city.into());
        self.country = Some(country.into());
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Depot or stop.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns `true` for depots.
    pub fn is_depot(&self) -> bool {
        self.kind == NodeKind::Depot
    }

    /// Position of this node.
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Units to deliver (0 for depots).
    pub fn demand(&self) -> i32 {
        self.demand
    }

    /// Street address, if known.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// City, if known.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Country, if known.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(90.0, 180.0).is_valid());
        assert!(Coordinates::new(-90.0, -180.0).is_valid());
        assert!(!Coordinates::new(-90.1, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, 180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_depot_has_no_demand() {
        let d = Node::depot("D1", "North", 1.0, 2.0);
        assert!(d.is_depot());
        assert_eq!(d.demand(), 0);
        assert_eq!(d.coordinates(), Coordinates::new(1.0, 2.0));
        assert!(d.city().is_none());
    }

    #[test]
    fn test_stop_with_address() {
        let s = Node::stop("S9", "Bakery", 1.0, 2.0, 12).with_address("Main 1", "Cali", "CO");
        assert_eq!(s.kind(), NodeKind::Stop);
        assert_eq!(s.id(), "S9");
        assert_eq!(s.name(), "Bakery");
        assert_eq!(s.address(), Some("Main 1"));
        assert_eq!(s.country(), Some("CO"));
    }
}
