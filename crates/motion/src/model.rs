//! Core data model: coordinates, checkpoints, and trajectory points.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate. Longitude first, matching the wire order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// True when both components are finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lng, point.lat)
    }
}

/// A server-defined waypoint that the trajectory must pass through exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub position: GeoPoint,
    pub passed: bool,
    /// Pass time in ms since epoch, set once the pass is acknowledged.
    pub pass_time_ms: Option<i64>,
}

impl Checkpoint {
    pub fn new(id: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            position,
            passed: false,
            pass_time_ms: None,
        }
    }

    pub fn mark_passed(&mut self, at_ms: i64) {
        self.passed = true;
        self.pass_time_ms = Some(at_ms);
    }
}

/// Where a trajectory point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointSource {
    /// Exactly a checkpoint's coordinates; holds the checkpoint's position in the input list.
    Checkpoint(usize),
    /// Taken from a caller-supplied trajectory.
    Recorded,
    /// Produced by a route lookup or procedural synthesis.
    Interpolated,
}

impl PointSource {
    pub fn is_checkpoint(&self) -> bool {
        matches!(self, PointSource::Checkpoint(_))
    }
}

/// An untimed point of a synthesized path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: GeoPoint,
    pub source: PointSource,
}

impl PathPoint {
    pub const fn interpolated(position: GeoPoint) -> Self {
        Self {
            position,
            source: PointSource::Interpolated,
        }
    }

    pub const fn recorded(position: GeoPoint) -> Self {
        Self {
            position,
            source: PointSource::Recorded,
        }
    }

    pub const fn checkpoint(position: GeoPoint, ordinal: usize) -> Self {
        Self {
            position,
            source: PointSource::Checkpoint(ordinal),
        }
    }
}

/// A timed GPS fix ready for upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub position: GeoPoint,
    /// Fix time in ms since epoch.
    pub timestamp_ms: i64,
    /// Reported horizontal accuracy in meters.
    pub accuracy_m: f64,
    /// Instantaneous speed in m/s.
    pub speed_mps: f64,
    /// Sequence index, strictly increasing along the trajectory.
    pub index: u32,
    pub source: PointSource,
}

/// Declared totals of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub distance_m: u32,
    pub duration_s: u32,
    pub steps: u32,
}

impl SessionTotals {
    pub const fn new(distance_m: u32, duration_s: u32, steps: u32) -> Self {
        Self {
            distance_m,
            duration_s,
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(120.5, 30.6).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 30.6).is_valid());
        assert!(!GeoPoint::new(120.5, 95.0).is_valid());
        assert!(!GeoPoint::new(200.0, 30.0).is_valid());
    }

    #[test]
    fn test_checkpoint_mark_passed() {
        let mut cp = Checkpoint::new("23001", GeoPoint::new(120.5, 30.6));
        assert!(!cp.passed);
        cp.mark_passed(1_700_000_000_000);
        assert!(cp.passed);
        assert_eq!(cp.pass_time_ms, Some(1_700_000_000_000));
    }

    #[test]
    fn test_geo_point_conversion() {
        let p = GeoPoint::new(120.5, 30.6);
        let g: geo::Point<f64> = p.into();
        assert_eq!(g.x(), 120.5);
        assert_eq!(GeoPoint::from(g), p);
    }
}
