use motion::generators::{PaceSegment, StepSegment, StrideSegment};
use motion::model::TrajectoryPoint;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientIdentity;

/// Offset between a fix's collect time and its create time.
pub const CREATE_TIME_OFFSET_MS: i64 = 867;

/// A request body: client identity, the call's own fields, then the timestamp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signed<'a, T> {
    pub model_name: &'a str,
    pub app_version: &'a str,
    pub build_version: &'a str,
    pub channel: &'a str,
    pub app_code: &'a str,
    pub device_id: &'a str,
    pub system_version: &'a str,
    pub platform: &'a str,
    #[serde(flatten)]
    pub payload: T,
    pub timestamp: String,
}

impl<'a, T> Signed<'a, T> {
    pub fn new(identity: &'a ClientIdentity, device_id: &'a str, payload: T, timestamp_ms: i64) -> Self {
        Self {
            model_name: &identity.model_name,
            app_version: &identity.app_version,
            build_version: &identity.build_version,
            channel: &identity.channel,
            app_code: &identity.app_code,
            device_id,
            system_version: &identity.system_version,
            platform: &identity.platform,
            payload,
            timestamp: timestamp_ms.to_string(),
        }
    }
}

/// A record tagged with the `stability: 0` marker the server expects on list items.
#[derive(Debug, Clone, Serialize)]
pub struct Stable<T> {
    #[serde(flatten)]
    pub record: T,
    pub stability: u8,
}

impl<T> Stable<T> {
    pub fn new(record: T) -> Self {
        Self {
            record,
            stability: 0,
        }
    }

    pub fn all(records: impl IntoIterator<Item = T>) -> Vec<Self> {
        records.into_iter().map(Self::new).collect()
    }
}

/// Either a JSON number or a numeric string; finish calls use both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireNumber {
    Int(u32),
    Float(f64),
    Text(String),
}

#[derive(Debug, Default, Serialize)]
pub struct NoPayload {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQueryBody {
    pub semester_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolBody {
    pub school_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQueryBody {
    pub current_semester: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StartFreeBody {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPlanBody {
    pub use_credit_sword: &'static str,
    pub run_plan_code: String,
    pub lng: f64,
    pub lat: f64,
    pub target_distance: &'static str,
    pub fence_code: String,
    pub school_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_code: Option<String>,
}

/// One trajectory fix as the server stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub accuracy: f64,
    pub collect_time: i64,
    pub create_time: i64,
    pub index: u32,
    pub lat: f64,
    pub lng: f64,
    pub off_fence_dis_m: i32,
    /// Seconds since the session started.
    pub run_time: i64,
    pub satellites: u8,
    pub state: u8,
}

impl Poi {
    pub fn from_point(point: &TrajectoryPoint, start_ms: i64, satellites: u8) -> Self {
        Self {
            accuracy: (point.accuracy_m * 10.0).round() / 10.0,
            collect_time: point.timestamp_ms,
            create_time: point.timestamp_ms + CREATE_TIME_OFFSET_MS,
            index: point.index,
            lat: point.position.lat,
            lng: point.position.lng,
            off_fence_dis_m: -1,
            run_time: (point.timestamp_ms - start_ms).max(0) / 1000,
            satellites,
            state: 1,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryUploadBody<'a> {
    pub pois: &'a [Poi],
    pub run_record_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceUploadBody<'a> {
    pub pace_list: Vec<Stable<&'a PaceSegment>>,
    pub pace_interval: u32,
    pub run_record_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUploadBody<'a> {
    pub step_list: Vec<Stable<&'a StepSegment>>,
    pub step_interval: u32,
    pub run_record_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrideUploadBody<'a> {
    pub stride_list: Vec<&'a StrideSegment>,
    pub stride_interval: u32,
    pub run_record_code: &'a str,
}

/// A checkpoint as reported back to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPointReport {
    pub code: Value,
    pub lng: f64,
    pub lat: f64,
    pub pass_status: bool,
    pub clock_time: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassPointBody<'a> {
    pub target_points: &'a [TargetPointReport],
    pub run_record_code: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidReason {
    pub invalid_detail: String,
    pub invalid_type: u8,
}

/// Body of a finish call. Plan runs, free runs and forced closes fill
/// different subsets of the optional fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_times: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<u8>,
    pub step_interval: u32,
    pub distance: WireNumber,
    pub total_step: WireNumber,
    pub duration: WireNumber,
    /// Liveness-proof reference from an external upload, passed through as given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_img_record: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_points: Option<Vec<TargetPointReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_type: Option<u8>,
    pub step_list: Vec<Stable<StepSegment>>,
    pub pace_list: Vec<Stable<PaceSegment>>,
    pub pace_interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_count: Option<u32>,
    pub pois: Vec<Poi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reasons: Option<Vec<Stable<InvalidReason>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u8>,
    pub run_record_code: String,
}
