//! Wire types for the session protocol.
//!
//! All bodies are camelCase JSON. Every request body echoes the client
//! identity and a millisecond `timestamp` string; see [`requests::Signed`].

pub mod requests;
pub mod responses;

pub use requests::{
    ActivityQueryBody, FinishBody, InvalidReason, NoPayload, PaceUploadBody, PassPointBody,
    PlanQueryBody, Poi, SchoolBody, Signed, Stable, StartFreeBody, StartPlanBody, StepUploadBody,
    StrideUploadBody, TargetPointReport, TrajectoryUploadBody, WireNumber,
};
pub use responses::{
    Activity, ActivityList, AlertTip, Envelope, Fence, FinishData, PlanList, RunPlan, StartData,
    TargetPoint, UnfinishedData,
};
