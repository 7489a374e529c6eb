//! Small geodesy helpers shared by the path sources and timing.

use crate::model::GeoPoint;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rough length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Calculates the haversine distance between two points in meters.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a polyline in meters.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Moves a point by the given east/north displacement in meters.
///
/// Uses the flat-earth approximation, which is fine at running scale.
pub fn offset_meters(origin: GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    let lat_delta = north_m / METERS_PER_DEGREE;
    let lon_delta = east_m / (METERS_PER_DEGREE * origin.lat.to_radians().cos().max(1e-6));
    GeoPoint::new(origin.lng + lon_delta, origin.lat + lat_delta)
}

/// Converts a distance in meters to degrees of latitude.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Linear interpolation between two points in coordinate space.
pub fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lng + (b.lng - a.lng) * t, a.lat + (b.lat - a.lat) * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine() {
        // Known distance: ~111km for 1 degree of latitude
        let dist = haversine_distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
        assert!((dist - 111_000.0).abs() < 1000.0);
    }

    #[test]
    fn test_haversine_zero() {
        let p = GeoPoint::new(120.523568, 30.647431);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_offset_roundtrip_distance() {
        let origin = GeoPoint::new(120.523568, 30.647431);
        let moved = offset_meters(origin, 300.0, 400.0);
        let dist = haversine_distance(origin, moved);
        assert!((dist - 500.0).abs() < 5.0, "got {dist}");
    }

    #[test]
    fn test_path_length() {
        let a = GeoPoint::new(120.0, 30.0);
        let b = offset_meters(a, 0.0, 100.0);
        let c = offset_meters(b, 0.0, 100.0);
        assert!((path_length(&[a, b, c]) - 200.0).abs() < 2.0);
        assert_eq!(path_length(&[a]), 0.0);
    }
}
