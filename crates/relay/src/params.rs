//! Per-run parameters handed over by the orchestrator as one JSON object.
//!
//! ```json
//! {"order_number": "A1", "auth_token": "...", "satoken": "...", "device_id": "...",
//!  "distance": 3000, "duration": 786, "total_step": 1894,
//!  "mode": "plan", "semester_code": "2024-2025-1", "trajectory_points": [[120.5, 30.6]]}
//! ```
//!
//! Numbers may arrive as JSON numbers or numeric strings. Unknown keys are ignored.

use motion::model::{GeoPoint, SessionTotals};
use std::path::PathBuf;

use motion::sources::{GpxLoader, RecordedTrajectory};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::Credentials;
use crate::discovery::PlanSelection;
use crate::errors::ParamsError;

const DEFAULT_DISTANCE_M: u32 = 3000;
const DEFAULT_DURATION_S: u32 = 786;
const DEFAULT_STEPS: u32 = 1894;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeParam {
    Free,
    #[default]
    Plan,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunParams {
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub satoken: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default = "default_distance", deserialize_with = "lenient_u32")]
    pub distance: u32,
    #[serde(default = "default_duration", deserialize_with = "lenient_u32")]
    pub duration: u32,
    #[serde(default = "default_steps", deserialize_with = "lenient_u32")]
    pub total_step: u32,
    #[serde(default)]
    pub trajectory_points: Value,
    /// GPX file to replay; used when `trajectory_points` is empty.
    #[serde(default)]
    pub trajectory_gpx: Option<PathBuf>,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub mode: ModeParam,
    #[serde(default, deserialize_with = "lenient_text")]
    pub run_plan_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fence_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub semester_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub school_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity_code: Option<String>,
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    /// Reference to a liveness proof uploaded elsewhere.
    #[serde(default)]
    pub proof_reference: Option<String>,
}

fn default_distance() -> u32 {
    DEFAULT_DISTANCE_M
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_S
}

fn default_steps() -> u32 {
    DEFAULT_STEPS
}

impl RunParams {
    pub fn from_json_str(raw: &str) -> Result<Self, ParamsError> {
        let params: RunParams = serde_json::from_str(raw)?;
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ParamsError> {
        if self.duration == 0 {
            return Err(ParamsError::Invalid {
                field: "duration",
                reason: "must be positive".to_string(),
            });
        }
        if self.distance == 0 {
            return Err(ParamsError::Invalid {
                field: "distance",
                reason: "must be positive".to_string(),
            });
        }
        if let Some(origin) = self.origin {
            if !origin.is_valid() {
                return Err(ParamsError::Invalid {
                    field: "origin",
                    reason: format!("{}, {} is not a WGS84 coordinate", origin.lng, origin.lat),
                });
            }
        }
        Ok(())
    }

    pub fn totals(&self) -> SessionTotals {
        SessionTotals::new(self.distance, self.duration, self.total_step)
    }

    /// The caller's trajectory, if it has enough valid points to replay.
    pub fn recorded(&self) -> Result<Option<RecordedTrajectory>, ParamsError> {
        let mut recorded = RecordedTrajectory::from_json(&self.trajectory_points)?;
        if recorded.is_empty() {
            if let Some(path) = &self.trajectory_gpx {
                recorded = GpxLoader::load_file(path)?;
            }
        }
        Ok(recorded.is_usable().then_some(recorded))
    }

    /// `base` with every credential the caller supplied swapped in.
    pub fn credentials(&self, base: &Credentials) -> Credentials {
        let pick = |given: &Option<String>, fallback: &String| {
            given
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| fallback.clone(), |s| s.trim().to_string())
        };
        Credentials {
            authorization: pick(&self.auth_token, &base.authorization),
            satoken: pick(&self.satoken, &base.satoken),
            device_id: pick(&self.device_id, &base.device_id),
        }
    }

    pub fn plan_selection(&self) -> PlanSelection {
        PlanSelection {
            semester_code: self.semester_code.clone(),
            run_plan_code: self.run_plan_code.clone(),
            school_code: self.school_code.clone(),
            fence_code: self.fence_code.clone(),
            activity_code: self.activity_code.clone(),
        }
    }

    /// Start position for a free run: explicit origin, else the first
    /// recorded point, else `fallback`.
    pub fn free_origin(
        &self,
        recorded: Option<&RecordedTrajectory>,
        fallback: Option<GeoPoint>,
    ) -> Option<GeoPoint> {
        self.origin
            .or_else(|| recorded.and_then(RecordedTrajectory::first))
            .or(fallback)
    }
}

/// Accepts a non-negative integer as a number, a float (truncated) or a numeric string.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;
    let number = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) => Ok(n as u32),
        _ => Err(D::Error::custom(format!("expected a non-negative number, got {value}"))),
    }
}

/// Accepts a code as a string or a bare number. Blank strings count as absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = RunParams::from_json_str("{}").unwrap();
        assert_eq!(params.totals(), SessionTotals::new(3000, 786, 1894));
        assert_eq!(params.mode, ModeParam::Plan);
        assert!(params.order_number.is_none());
        assert!(params.recorded().unwrap().is_none());
    }

    #[test]
    fn test_lenient_values() {
        let params = RunParams::from_json_str(
            r#"{
                "order_number": 20240915001,
                "distance": "2500",
                "duration": 700.9,
                "total_step": "1500",
                "mode": "free",
                "fence_code": "  ",
                "semester_code": "2024-1",
                "face_image_path": "/tmp/face.jpg"
            }"#,
        )
        .unwrap();

        assert_eq!(params.order_number.as_deref(), Some("20240915001"));
        assert_eq!(params.totals(), SessionTotals::new(2500, 700, 1500));
        assert_eq!(params.mode, ModeParam::Free);
        assert!(params.fence_code.is_none());
        assert_eq!(params.plan_selection().semester_code.as_deref(), Some("2024-1"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            RunParams::from_json_str(r#"{"duration": 0}"#),
            Err(ParamsError::Invalid { field: "duration", .. })
        ));
        assert!(matches!(
            RunParams::from_json_str(r#"{"distance": "far"}"#),
            Err(ParamsError::Json(_))
        ));
        assert!(matches!(
            RunParams::from_json_str(r#"{"origin": {"lng": 120.0, "lat": 95.0}}"#),
            Err(ParamsError::Invalid { field: "origin", .. })
        ));
    }

    #[test]
    fn test_recorded_and_origin() {
        let params = RunParams::from_json_str(
            r#"{"trajectory_points": "[[120.5, 30.6], [120.501, 30.601], [999, 0]]"}"#,
        )
        .unwrap();
        let recorded = params.recorded().unwrap().unwrap();
        assert_eq!(recorded.len(), 2);

        let fallback = Some(GeoPoint::new(1.0, 2.0));
        assert_eq!(
            params.free_origin(Some(&recorded), fallback),
            Some(GeoPoint::new(120.5, 30.6))
        );
        assert_eq!(params.free_origin(None, fallback), fallback);
    }

    #[test]
    fn test_recorded_from_gpx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.gpx");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="relay" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="30.6" lon="120.5"></trkpt>
    <trkpt lat="30.601" lon="120.501"></trkpt>
  </trkseg></trk>
</gpx>"#,
        )
        .unwrap();

        for points in [Value::Null, serde_json::json!([]), serde_json::json!("")] {
            let raw = serde_json::json!({"trajectory_points": points, "trajectory_gpx": path});
            let params = RunParams::from_json_str(&raw.to_string()).unwrap();
            let recorded = params.recorded().unwrap().unwrap();
            assert_eq!(recorded.first(), Some(GeoPoint::new(120.5, 30.6)), "with {points}");
        }

        // Inline points win over the file.
        let raw = serde_json::json!({"trajectory_points": [[121.0, 31.0], [121.001, 31.001]], "trajectory_gpx": path});
        let params = RunParams::from_json_str(&raw.to_string()).unwrap();
        assert_eq!(params.recorded().unwrap().unwrap().first(), Some(GeoPoint::new(121.0, 31.0)));

        let missing = RunParams::from_json_str(r#"{"trajectory_gpx": "/nonexistent/run.gpx"}"#).unwrap();
        assert!(matches!(missing.recorded(), Err(ParamsError::Gpx(_))));
    }

    #[test]
    fn test_credentials_override() {
        let base = Credentials {
            authorization: "cfg-token".into(),
            satoken: "cfg-sa".into(),
            device_id: "cfg-device".into(),
        };
        let params =
            RunParams::from_json_str(r#"{"auth_token": "run-token", "satoken": ""}"#).unwrap();
        let creds = params.credentials(&base);

        assert_eq!(creds.authorization, "run-token");
        assert_eq!(creds.satoken, "cfg-sa");
        assert_eq!(creds.device_id, "cfg-device");
    }
}
