//! Plan, fence and activity lookup for plan runs.

use motion::model::GeoPoint;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::client::{CallPolicy, SessionProtocolClient};
use crate::endpoints::Endpoint;
use crate::errors::SessionError;
use crate::session::RunMode;
use crate::types::{ActivityList, ActivityQueryBody, Fence, PlanList, PlanQueryBody, SchoolBody};

/// What the caller already knows about the plan. Missing parts are looked up.
#[derive(Debug, Clone, Default)]
pub struct PlanSelection {
    pub semester_code: Option<String>,
    pub run_plan_code: Option<String>,
    pub school_code: Option<String>,
    pub fence_code: Option<String>,
    pub activity_code: Option<String>,
}

/// A fully specified plan run and the fence it takes place in.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub mode: RunMode,
    pub fence: Fence,
}

impl ResolvedPlan {
    /// Loop center and force-close anchor.
    pub fn fence_center(&self) -> GeoPoint {
        GeoPoint::new(self.fence.lng, self.fence.lat)
    }
}

impl SessionProtocolClient {
    pub async fn query_plans(&mut self, semester_code: &str) -> Result<PlanList, SessionError> {
        let body = PlanQueryBody {
            semester_code: semester_code.to_string(),
        };
        let envelope = self.call(Endpoint::QueryPlans, body).await?;
        envelope
            .data_as::<Option<PlanList>>()
            .map(Option::unwrap_or_default)
            .map_err(|e| SessionError::malformed(Endpoint::QueryPlans.name(), e.to_string()))
    }

    pub async fn query_fences(&mut self, school_code: &str) -> Result<Vec<Fence>, SessionError> {
        let body = SchoolBody {
            school_code: school_code.to_string(),
        };
        let envelope = self.call(Endpoint::QueryFences, body).await?;
        envelope
            .data_as::<Option<Vec<Fence>>>()
            .map(Option::unwrap_or_default)
            .map_err(|e| SessionError::malformed(Endpoint::QueryFences.name(), e.to_string()))
    }

    /// Code of the ongoing campus activity, if there is one. Best-effort.
    pub async fn ongoing_activity(&mut self) -> Result<Option<String>, SessionError> {
        let body = ActivityQueryBody {
            current_semester: "true",
        };
        let Some(envelope) = self
            .dispatch(CallPolicy::BestEffort, Endpoint::QueryActivities, body)
            .await?
        else {
            return Ok(None);
        };

        let activities = envelope
            .data_as::<Option<ActivityList>>()
            .unwrap_or_else(|e| {
                warn!("Unreadable activity list: {e}");
                None
            })
            .unwrap_or_default();
        Ok(activities
            .activity_list
            .into_iter()
            .filter(|a| a.is_ongoing())
            .find_map(|a| a.sun_run_activity_code))
    }

    /// Fills in whatever `selection` leaves open: the first active plan, the
    /// named fence or a random one, and the ongoing activity.
    pub async fn resolve_plan(&mut self, selection: PlanSelection) -> Result<ResolvedPlan, SessionError> {
        let (run_plan_code, school_code) = match (selection.run_plan_code, selection.school_code) {
            (Some(plan), Some(school)) => (plan, school),
            (plan, school) => {
                let semester = selection.semester_code.ok_or_else(|| {
                    SessionError::rejected(
                        Endpoint::QueryPlans.name(),
                        None,
                        "a semester code is needed to look up the run plan",
                    )
                })?;
                let plans = self.query_plans(&semester).await?;
                let plan = match plan {
                    Some(plan) => plan,
                    None => plans
                        .list
                        .iter()
                        .find(|p| p.is_active())
                        .map(|p| p.run_plan_code.clone())
                        .ok_or_else(|| {
                            SessionError::rejected(
                                Endpoint::QueryPlans.name(),
                                None,
                                "no active run plan this semester",
                            )
                        })?,
                };
                let school = school.or(plans.school_code).ok_or_else(|| {
                    SessionError::malformed(Endpoint::QueryPlans.name(), "missing schoolCode")
                })?;
                (plan, school)
            }
        };

        let fences = self.query_fences(&school_code).await?;
        let named = selection
            .fence_code
            .as_deref()
            .and_then(|code| fences.iter().find(|f| f.fence_code == code));
        let fence = match named {
            Some(fence) => fence.clone(),
            None => {
                if let Some(code) = &selection.fence_code {
                    warn!(fence_code = %code, "Configured fence not found, picking another");
                }
                fences
                    .choose(self.rng())
                    .cloned()
                    .ok_or_else(|| {
                        SessionError::rejected(
                            Endpoint::QueryFences.name(),
                            None,
                            format!("school {school_code} has no fences"),
                        )
                    })?
            }
        };

        let activity_code = match selection.activity_code {
            Some(code) => Some(code),
            None => self.ongoing_activity().await?,
        };

        info!(
            run_plan_code = %run_plan_code,
            fence_code = %fence.fence_code,
            activity = activity_code.is_some(),
            "Plan resolved"
        );
        Ok(ResolvedPlan {
            mode: RunMode::Plan {
                run_plan_code,
                fence_code: fence.fence_code.clone(),
                school_code,
                activity_code,
            },
            fence,
        })
    }
}
