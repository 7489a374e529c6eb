/// Remote operations consumed by the protocol client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    QueryUnfinished,
    StartFree,
    StartPlan,
    UploadRecord,
    UploadPace,
    UploadSteps,
    UploadStride,
    UploadPassPoint,
    FinishFree,
    FinishPlan,
    QueryPlans,
    QueryFences,
    QueryActivities,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::QueryUnfinished => "/run-front/run/queryUnFinishRun",
            Endpoint::StartFree => "/run-front/startFreeRun",
            Endpoint::StartPlan => "/run-front/run/startSunRun",
            Endpoint::UploadRecord => "/run-front/run/uploadRunRecord",
            Endpoint::UploadPace => "/run-front/run/uploadPaceRecord",
            Endpoint::UploadSteps => "/run-front/run/uploadStepsRecord",
            Endpoint::UploadStride => "/run-front/run/uploadStrideRecord",
            Endpoint::UploadPassPoint => "/run-front/run/uploadPassPoint",
            Endpoint::FinishFree => "/run-front/run/finishFreeRun",
            Endpoint::FinishPlan => "/run-front/run/finishSunRun",
            Endpoint::QueryPlans => "/run-front/run/plan/selectList",
            Endpoint::QueryFences => "/run-front/school/querySchoolFences",
            Endpoint::QueryActivities => "/run-front/activity/activityList",
        }
    }

    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::QueryUnfinished => "query_unfinished",
            Endpoint::StartFree => "start_free",
            Endpoint::StartPlan => "start_plan",
            Endpoint::UploadRecord => "upload_record",
            Endpoint::UploadPace => "upload_pace",
            Endpoint::UploadSteps => "upload_steps",
            Endpoint::UploadStride => "upload_stride",
            Endpoint::UploadPassPoint => "upload_pass_point",
            Endpoint::FinishFree => "finish_free",
            Endpoint::FinishPlan => "finish_plan",
            Endpoint::QueryPlans => "query_plans",
            Endpoint::QueryFences => "query_fences",
            Endpoint::QueryActivities => "query_activities",
        }
    }

    /// `(api, v)` routing headers. Only gateway-routed calls carry them.
    pub fn route(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Endpoint::QueryUnfinished => Some(("run", "queryUnFinishRun")),
            Endpoint::StartFree => Some(("run", "startFreeRun")),
            Endpoint::StartPlan => Some(("run", "startSunRun")),
            Endpoint::QueryPlans => Some(("run", "plan")),
            Endpoint::QueryFences => Some(("school", "querySchoolFences")),
            Endpoint::QueryActivities => Some(("activity", "activityList")),
            _ => None,
        }
    }

    /// Full set of routing headers for this endpoint.
    pub fn route_headers(&self) -> Vec<(&'static str, String)> {
        let Some((api, version)) = self.route() else {
            return Vec::new();
        };
        vec![
            ("app", "run-front".to_string()),
            ("e", "0".to_string()),
            ("v", version.to_string()),
            ("pv", "2".to_string()),
            ("api", api.to_string()),
            ("k", String::new()),
        ]
    }
}
