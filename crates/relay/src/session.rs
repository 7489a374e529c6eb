//! Session lifecycle.

use motion::model::{Checkpoint, GeoPoint, SessionTotals};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::TargetPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Local only; the server has not issued a record code.
    Created,
    Started,
    Uploading,
    Finishing,
    Finished,
    Failed,
    /// A stale session from an earlier run, force-closed before a new start.
    Recovered,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Finished | SessionState::Failed | SessionState::Recovered
        )
    }

    pub fn can_advance_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Created, Started | Recovered | Failed) => true,
            (Started, Uploading | Finishing | Failed) => true,
            (Uploading, Finishing | Failed) => true,
            (Finishing, Finished | Failed) => true,
            _ => false,
        }
    }
}

/// Whether the session runs against a plan (with server checkpoints) or freely.
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Free,
    Plan {
        run_plan_code: String,
        fence_code: String,
        school_code: String,
        activity_code: Option<String>,
    },
}

impl RunMode {
    pub fn is_plan(&self) -> bool {
        matches!(self, RunMode::Plan { .. })
    }
}

/// One server-tracked run, owned by the protocol client until it is terminal.
#[derive(Debug, Clone)]
pub struct Session {
    local_id: Uuid,
    state: SessionState,
    run_record_code: Option<String>,
    pub(crate) mode: RunMode,
    pub(crate) started_at_ms: i64,
    pub(crate) totals: SessionTotals,
    pub(crate) targets: Vec<TargetPoint>,
    pub(crate) checkpoints: Vec<Checkpoint>,
    pub(crate) uploaded_points: usize,
}

impl Session {
    pub fn new(mode: RunMode, totals: SessionTotals) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            state: SessionState::Created,
            run_record_code: None,
            mode,
            started_at_ms: 0,
            totals,
            targets: Vec::new(),
            checkpoints: Vec::new(),
            uploaded_points: 0,
        }
    }

    /// A session the server still holds open from an earlier run.
    pub fn stale(run_record_code: String) -> Self {
        let mut session = Self::new(RunMode::Free, SessionTotals::new(0, 0, 0));
        session.run_record_code = Some(run_record_code);
        session
    }

    pub fn local_id(&self) -> Uuid {
        self.local_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn run_record_code(&self) -> Option<&str> {
        self.run_record_code.as_deref()
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    /// When the server accepted the start, in ms since epoch. Zero before that.
    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    pub fn totals(&self) -> SessionTotals {
        self.totals
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn uploaded_points(&self) -> usize {
        self.uploaded_points
    }

    /// Records the server-issued code and checkpoint list.
    pub(crate) fn started(&mut self, run_record_code: String, targets: Vec<TargetPoint>, at_ms: i64) {
        self.checkpoints = targets
            .iter()
            .map(|t| Checkpoint::new(t.code_text(), GeoPoint::new(t.lng, t.lat)))
            .collect();
        self.targets = targets;
        self.run_record_code = Some(run_record_code);
        self.started_at_ms = at_ms;
        self.advance(SessionState::Started);
    }

    /// Moves to `next` if the transition is legal; illegal transitions are
    /// logged and ignored.
    pub(crate) fn advance(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if self.state.can_advance_to(next) {
            debug!(local_id = %self.local_id, from = ?self.state, to = ?next, "Session state");
            self.state = next;
        } else {
            warn!(
                local_id = %self.local_id,
                from = ?self.state,
                to = ?next,
                "Ignoring illegal session transition"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target(code: u64, lng: f64, lat: f64) -> TargetPoint {
        serde_json::from_value(json!({"code": code, "lng": lng, "lat": lat})).unwrap()
    }

    #[test]
    fn test_transitions() {
        use SessionState::*;
        assert!(Created.can_advance_to(Started));
        assert!(Created.can_advance_to(Recovered));
        assert!(Started.can_advance_to(Uploading));
        assert!(Uploading.can_advance_to(Finishing));
        assert!(Finishing.can_advance_to(Finished));
        assert!(Finishing.can_advance_to(Failed));

        assert!(!Created.can_advance_to(Finished));
        assert!(!Finished.can_advance_to(Started));
        assert!(!Failed.can_advance_to(Uploading));
        assert!(Recovered.is_terminal());
    }

    #[test]
    fn test_started_builds_checkpoints() {
        let mut session = Session::new(RunMode::Free, SessionTotals::new(3000, 786, 1894));
        session.started(
            "R1".into(),
            vec![target(2301, 120.1, 30.1), target(2302, 120.2, 30.2)],
            1_000,
        );

        assert_eq!(session.state(), SessionState::Started);
        assert_eq!(session.run_record_code(), Some("R1"));
        assert_eq!(session.started_at_ms(), 1_000);
        assert_eq!(session.checkpoints().len(), 2);
        assert_eq!(session.checkpoints()[1].id, "2302");
        assert_eq!(session.checkpoints()[0].position, GeoPoint::new(120.1, 30.1));
        assert!(!session.checkpoints()[0].passed);
    }

    #[test]
    fn test_illegal_transition_ignored() {
        let mut session = Session::new(RunMode::Free, SessionTotals::new(1, 1, 1));
        session.advance(SessionState::Finished);
        assert_eq!(session.state(), SessionState::Created);
    }
}
