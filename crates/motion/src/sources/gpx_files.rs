//! GPX file loading and export.

use std::path::Path;

use gpx::{Gpx, read};
use thiserror::Error;

use crate::model::{GeoPoint, TrajectoryPoint};
use crate::sources::RecordedTrajectory;

#[derive(Debug, Error)]
pub enum GpxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("GPX parse error: {0}")]
    Parse(#[from] gpx::errors::GpxError),
    #[error("No tracks found in GPX file")]
    NoTracks,
    #[error("No track segments found")]
    NoSegments,
}

/// Loads recorded trajectories from GPX files and exports synthesized ones.
pub struct GpxLoader;

impl GpxLoader {
    /// Loads a recorded trajectory from a GPX file.
    ///
    /// All points from all tracks and segments are flattened in file order.
    pub fn load_file(path: impl AsRef<Path>) -> Result<RecordedTrajectory, GpxError> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let gpx: Gpx = read(reader)?;

        Self::extract_points(&gpx)
    }

    /// Loads a recorded trajectory from GPX data in memory.
    pub fn load_bytes(data: &[u8]) -> Result<RecordedTrajectory, GpxError> {
        let reader = std::io::Cursor::new(data);
        let gpx: Gpx = read(reader)?;

        Self::extract_points(&gpx)
    }

    fn extract_points(gpx: &Gpx) -> Result<RecordedTrajectory, GpxError> {
        if gpx.tracks.is_empty() {
            return Err(GpxError::NoTracks);
        }

        let points: Vec<GeoPoint> = gpx
            .tracks
            .iter()
            .flat_map(|track| &track.segments)
            .flat_map(|segment| &segment.points)
            .map(|waypoint| GeoPoint::from(waypoint.point()))
            .collect();

        if points.is_empty() {
            return Err(GpxError::NoSegments);
        }

        Ok(RecordedTrajectory::from_points(points))
    }

    /// Writes a timed trajectory to a GPX file for inspection in other tools.
    pub fn write_file(
        path: impl AsRef<Path>,
        points: &[TrajectoryPoint],
        name: Option<&str>,
    ) -> Result<(), GpxError> {
        use gpx::{GpxVersion, Track, TrackSegment, Waypoint};

        let waypoints: Vec<Waypoint> = points
            .iter()
            .map(|p| {
                let mut wp = Waypoint::new(p.position.into());
                wp.time = time::OffsetDateTime::from_unix_timestamp(p.timestamp_ms / 1000)
                    .ok()
                    .map(gpx::Time::from);
                wp.speed = Some(p.speed_mps);
                wp.hdop = Some(p.accuracy_m);
                wp
            })
            .collect();

        let mut track = Track::new();
        track.name = name.map(String::from);
        track.segments = vec![TrackSegment { points: waypoints }];

        let gpx = Gpx {
            version: GpxVersion::Gpx11,
            tracks: vec![track],
            ..Default::default()
        };

        let file = std::fs::File::create(path)?;
        gpx::write(&gpx, file)?;

        Ok(())
    }
}
