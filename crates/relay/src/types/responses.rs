use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Every response is wrapped in `{code, message, data}`; `code == 0` is success.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Decodes `data`. A missing `data` decodes as JSON `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone().unwrap_or(Value::Null))
    }
}

/// A server-issued checkpoint. Unknown fields are kept so they can be echoed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub code: Value,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TargetPoint {
    /// The code as plain text, without JSON string quotes.
    pub fn code_text(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    pub run_record_code: String,
    #[serde(default)]
    pub target_points: Vec<TargetPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfinishedData {
    #[serde(default)]
    pub run_record_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishData {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub alert_tip: Option<AlertTip>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertTip {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanList {
    #[serde(default)]
    pub list: Vec<RunPlan>,
    #[serde(default)]
    pub school_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPlan {
    pub run_plan_code: String,
    #[serde(default)]
    pub plan_status: Option<i64>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

impl RunPlan {
    pub fn is_active(&self) -> bool {
        self.plan_status == Some(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fence {
    pub fence_code: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
    #[serde(default)]
    pub fence_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityList {
    #[serde(default)]
    pub activity_list: Vec<Activity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub sun_run_activity_code: Option<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub activity_status: Option<i64>,
}

impl Activity {
    pub fn is_ongoing(&self) -> bool {
        self.activity_status == Some(1)
    }
}

/// Accepts a coordinate as a JSON number or a numeric string.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success_and_data() {
        let envelope = Envelope::parse(
            r#"{"code":0,"message":"ok","data":{"runRecordCode":"R1","targetPoints":[{"code":2301,"lng":"120.5","lat":30.6,"name":"Gate"}]}}"#,
        )
        .unwrap();
        assert!(envelope.is_success());

        let start: StartData = envelope.data_as().unwrap();
        assert_eq!(start.run_record_code, "R1");
        assert_eq!(start.target_points[0].lng, 120.5);
        assert_eq!(start.target_points[0].code_text(), "2301");
        assert_eq!(start.target_points[0].extra["name"], json!("Gate"));
    }

    #[test]
    fn test_envelope_missing_fields() {
        let envelope = Envelope::parse(r#"{"message":""}"#).unwrap();
        assert!(!envelope.is_success());
        assert_eq!(envelope.message_or("unknown"), "unknown");

        let unfinished: UnfinishedData = Envelope::parse(r#"{"code":0,"data":null}"#)
            .unwrap()
            .data_as::<Option<UnfinishedData>>()
            .unwrap()
            .unwrap_or_default();
        assert!(unfinished.run_record_code.is_none());
    }

    #[test]
    fn test_finish_alert_tip() {
        let data: FinishData = serde_json::from_value(json!({
            "status": 0,
            "alertTip": {"content": "未经过全部打卡点"}
        }))
        .unwrap();
        assert_eq!(data.status, Some(0));
        assert_eq!(data.alert_tip.unwrap().content.as_deref(), Some("未经过全部打卡点"));
    }

    #[test]
    fn test_plans_and_fences() {
        let plans: PlanList = serde_json::from_value(json!({
            "schoolCode": "S1",
            "list": [
                {"runPlanCode": "P0", "planStatus": 0},
                {"runPlanCode": "P1", "planStatus": 1}
            ]
        }))
        .unwrap();
        assert_eq!(plans.school_code.as_deref(), Some("S1"));
        assert!(!plans.list[0].is_active());
        assert!(plans.list[1].is_active());

        let fences: Vec<Fence> = serde_json::from_value(json!([
            {"fenceCode": "F1", "lat": "30.64", "lng": 120.52}
        ]))
        .unwrap();
        assert_eq!(fences[0].lat, 30.64);
    }
}
