//! Caller-supplied real trajectories.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::model::GeoPoint;

#[derive(Debug, Error)]
pub enum RecordedError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Trajectory must be a JSON array, got {0}")]
    NotAnArray(&'static str),
}

/// A real trajectory as supplied by the caller, normalized for reuse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedTrajectory {
    points: Vec<GeoPoint>,
}

impl RecordedTrajectory {
    /// Builds a trajectory from raw coordinates, dropping invalid ones.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Self {
        let mut normalized: Vec<GeoPoint> = Vec::new();
        let mut dropped = 0usize;

        for point in points {
            if !point.is_valid() {
                dropped += 1;
                continue;
            }
            // Consecutive duplicates carry no movement.
            if normalized.last() == Some(&point) {
                continue;
            }
            normalized.push(point);
        }

        if dropped > 0 {
            warn!("Dropped {dropped} invalid recorded trajectory points");
        }

        Self { points: normalized }
    }

    /// Parses a trajectory from JSON.
    ///
    /// Accepts `[[lng, lat], ...]`, `[{"lng": .., "lat": ..}, ...]`, or a JSON
    /// string containing either. Entries in any other shape are skipped.
    pub fn from_json(value: &Value) -> Result<Self, RecordedError> {
        match value {
            Value::String(s) if s.trim().is_empty() => Ok(Self::default()),
            Value::String(s) => {
                let inner: Value = serde_json::from_str(s)?;
                Self::from_json(&inner)
            }
            Value::Array(items) => Ok(Self::from_points(items.iter().filter_map(parse_entry))),
            Value::Null => Ok(Self::default()),
            Value::Bool(_) => Err(RecordedError::NotAnArray("bool")),
            Value::Number(_) => Err(RecordedError::NotAnArray("number")),
            Value::Object(_) => Err(RecordedError::NotAnArray("object")),
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A trajectory needs at least two points to describe movement.
    pub fn is_usable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn first(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }
}

fn parse_entry(entry: &Value) -> Option<GeoPoint> {
    match entry {
        Value::Array(pair) if pair.len() >= 2 => {
            Some(GeoPoint::new(pair[0].as_f64()?, pair[1].as_f64()?))
        }
        Value::Object(map) => Some(GeoPoint::new(
            map.get("lng")?.as_f64()?,
            map.get("lat")?.as_f64()?,
        )),
        _ => None,
    }
}
