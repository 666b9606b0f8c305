//! Great-circle distance on a spherical earth.

use crate::models::Coordinates;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
///
/// # Examples
///
/// ```
/// use fleet_routing::distance::haversine_km;
/// use fleet_routing::models::Coordinates;
///
/// let a = Coordinates::new(0.0, 0.0);
/// let b = Coordinates::new(0.0, 1.0);
/// assert!((haversine_km(a, b) - 111.19).abs() < 0.01);
/// ```
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Haversine distance rounded to whole metres.
pub fn haversine_m(a: Coordinates, b: Coordinates) -> i64 {
    (haversine_km(a, b) * 1000.0).round() as i64
}

/// Travel seconds for `metres` at `speed_kmh`, rounded.
///
/// Returns 0 for a non-positive speed.
pub fn seconds_at_speed(metres: i64, speed_kmh: f64) -> i64 {
    if speed_kmh <= 0.0 {
        return 0;
    }
    (metres as f64 / 1000.0 / speed_kmh * 3600.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = Coordinates::new(4.6, -74.1);
        assert_eq!(haversine_m(p, p), 0);
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinates::new(4.6, -74.1);
        let b = Coordinates::new(6.2, -75.6);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Bogota -> Medellin, roughly 240 km as the crow flies
        let bogota = Coordinates::new(4.711, -74.0721);
        let medellin = Coordinates::new(6.2442, -75.5812);
        let d = haversine_km(bogota, medellin);
        assert!(d > 230.0 && d < 250.0, "got {d}");
    }

    #[test]
    fn test_seconds_at_speed() {
        // 40 km at 40 km/h is one hour
        assert_eq!(seconds_at_speed(40_000, 40.0), 3600);
        assert_eq!(seconds_at_speed(1_000, 0.0), 0);
    }
}
