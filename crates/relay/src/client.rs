//! Session upload protocol.
//!
//! A run goes: close any stale session, start, upload the trajectory in
//! batches, confirm checkpoints, upload pace/step/stride segments, finish.
//! Start and finish are mandatory; everything in between is best-effort and a
//! failed call is logged and skipped. An authentication-expired code on any
//! call ends the run at once.

use std::sync::Arc;
use std::time::Duration;

use motion::generators::{PaceSegment, SegmentDataGenerator, SegmentSet, StepSegment};
use motion::geodesy::haversine_distance;
use motion::model::{GeoPoint, PointSource, SessionTotals, TrajectoryPoint};
use motion::path::{PathRequest, PathSynthesizer, Strategy};
use motion::profiles::RunnerProfile;
use motion::sources::{NoRoute, RecordedTrajectory, RouteLookup, WalkingRouteClient};
use motion::timing::TimingProfile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::{Credentials, RelayConfig};
use crate::endpoints::Endpoint;
use crate::errors::{ConfigError, ErrorKind, SessionError};
use crate::pacing::{Pacer, PacingPolicy};
use crate::session::{RunMode, Session, SessionState};
use crate::signing::RequestSigner;
use crate::transport::{OutboundRequest, Transport};
use crate::types::{
    Envelope, FinishBody, FinishData, InvalidReason, NoPayload, PaceUploadBody, PassPointBody,
    Poi, Signed, Stable, StartData, StartFreeBody, StartPlanBody, StepUploadBody,
    StrideUploadBody, TargetPointReport, TrajectoryUploadBody, UnfinishedData, WireNumber,
};

/// A checkpoint counts as visited when a fix lies at least this close to it.
pub const CHECKPOINT_REACH_M: f64 = 20.0;

const SATELLITES: std::ops::RangeInclusive<u8> = 5..=13;

/// How a failed call affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPolicy {
    /// Failure ends the run.
    Mandatory,
    /// Failure is logged and the run continues. Expired authentication still ends it.
    BestEffort,
}

/// Inputs for one run.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub mode: RunMode,
    /// Start position, loop center and anchor for force-closing stale sessions.
    pub origin: GeoPoint,
    pub totals: SessionTotals,
    pub recorded: Option<RecordedTrajectory>,
    /// Reference to a liveness proof uploaded elsewhere, sent with the finish call.
    pub proof_reference: Option<String>,
}

/// Summary of an accepted run.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub run_record_code: String,
    pub strategy: Strategy,
    pub points_total: usize,
    pub points_uploaded: usize,
    pub checkpoints_total: usize,
    pub checkpoints_passed: usize,
    /// Record code of a stale session closed before this one started.
    pub recovered: Option<String>,
}

pub fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub struct SessionProtocolClient {
    config: Arc<RelayConfig>,
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
    pacer: Arc<dyn Pacer>,
    policy: PacingPolicy,
    credentials: Credentials,
    synthesizer: Arc<PathSynthesizer>,
    segments: SegmentDataGenerator,
    rng: StdRng,
    clock: fn() -> i64,
    last_error_code: Option<i64>,
}

impl SessionProtocolClient {
    pub fn new(
        config: Arc<RelayConfig>,
        transport: Arc<dyn Transport>,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self, ConfigError> {
        let signer = config.signer()?;
        let rng = match config.synthesis.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let synthesizer = Arc::new(PathSynthesizer::new(
            config.synthesis.clone(),
            route_lookup(&config)?,
        ));

        Ok(Self {
            policy: PacingPolicy::new(config.pacing, config.retry),
            credentials: config.credentials.clone(),
            segments: SegmentDataGenerator::with_widths(config.segments),
            config,
            signer,
            transport,
            pacer,
            synthesizer,
            rng,
            clock: now_ms,
            last_error_code: None,
        })
    }

    /// Overrides the configured credentials, e.g. with per-run parameters.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<PathSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Business code of the most recent response that carried one.
    pub fn last_error_code(&self) -> Option<i64> {
        self.last_error_code
    }

    /// Runs one complete session inside a `session` span.
    pub async fn run(&mut self, plan: SessionPlan) -> Result<SessionOutcome, SessionError> {
        let mut session = Session::new(plan.mode.clone(), plan.totals);
        let span = info_span!(
            "session",
            local_id = %session.local_id(),
            plan = plan.mode.is_plan()
        );

        async move {
            info!(
                distance_m = plan.totals.distance_m,
                duration_s = plan.totals.duration_s,
                steps = plan.totals.steps,
                "Session run started"
            );
            let result = self.drive(&mut session, &plan).await;
            match &result {
                Ok(outcome) => info!(
                    run_record_code = %outcome.run_record_code,
                    points = outcome.points_uploaded,
                    "Session finished"
                ),
                Err(e) => {
                    session.advance(SessionState::Failed);
                    error!(kind = ?e.kind(), "Session failed: {e}");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &mut self,
        session: &mut Session,
        plan: &SessionPlan,
    ) -> Result<SessionOutcome, SessionError> {
        let mut recovered = None;
        if plan.mode.is_plan() {
            if let Some(stale_code) = self.query_unfinished().await? {
                info!(run_record_code = %stale_code, "Closing unfinished session");
                let mut stale = Session::stale(stale_code.clone());
                if self.force_close(&mut stale, plan.origin).await? {
                    recovered = Some(stale_code);
                }
            }
        }

        self.start(session, plan.origin).await?;

        let timeline_start = (self.clock)() - i64::from(plan.totals.duration_s) * 1000;
        let (strategy, trajectory) = self
            .synthesize(session, plan.origin, plan.recorded.clone(), timeline_start)
            .await;
        let pois = self.to_pois(&trajectory, timeline_start);
        let segments = self.segments.generate(&plan.totals);
        let reports = checkpoint_reports(session, &trajectory);

        self.upload_trajectory(session, &pois).await?;
        self.confirm_checkpoints(session, &reports).await?;
        self.upload_segments(session, &segments).await?;
        self.finish(session, &pois, &segments, &reports, plan.proof_reference.clone())
            .await?;

        Ok(SessionOutcome {
            run_record_code: session.run_record_code().unwrap_or_default().to_string(),
            strategy,
            points_total: pois.len(),
            points_uploaded: session.uploaded_points(),
            checkpoints_total: session.checkpoints().len(),
            checkpoints_passed: session.checkpoints().iter().filter(|c| c.passed).count(),
            recovered,
        })
    }

    /// Signs and sends one call, retrying transport failures with backoff.
    ///
    /// Returns the envelope only when the server reports success.
    pub(crate) async fn call<T: Serialize>(
        &mut self,
        endpoint: Endpoint,
        payload: T,
    ) -> Result<Envelope, SessionError> {
        let signed = Signed::new(
            &self.config.client,
            &self.credentials.device_id,
            payload,
            (self.clock)(),
        );
        let body = serde_json::to_string(&signed)
            .map_err(|e| SessionError::malformed(endpoint.name(), format!("request body: {e}")))?;
        let request = OutboundRequest {
            endpoint,
            headers: self.headers(endpoint, &body),
            body,
        };

        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;
        let raw = loop {
            match self.transport.send(&request).await {
                Ok(raw) => break raw,
                Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        endpoint = endpoint.name(),
                        attempt = attempt + 1,
                        "Request failed, retrying in {delay:?}: {e}"
                    );
                    self.pacer.pause(delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(SessionError::Transport {
                        endpoint: endpoint.name(),
                        source,
                    });
                }
            }
        };

        let envelope = Envelope::parse(&raw.body)
            .map_err(|e| SessionError::malformed(endpoint.name(), e.to_string()))?;
        if envelope.code.is_some() {
            self.last_error_code = envelope.code;
        }

        if let Some(code) = envelope
            .code
            .filter(|c| self.config.upload.auth_expired_codes.contains(c))
        {
            error!(endpoint = endpoint.name(), code, "Authentication expired");
            return Err(SessionError::AuthExpired {
                code,
                message: envelope.message_or("authentication expired"),
            });
        }
        if !envelope.is_success() {
            return Err(SessionError::rejected(
                endpoint.name(),
                envelope.code,
                envelope.message_or("request rejected"),
            ));
        }

        debug!(endpoint = endpoint.name(), "Call succeeded");
        Ok(envelope)
    }

    /// Sends a call under `policy`. Best-effort failures come back as `Ok(None)`.
    pub(crate) async fn dispatch<T: Serialize>(
        &mut self,
        policy: CallPolicy,
        endpoint: Endpoint,
        payload: T,
    ) -> Result<Option<Envelope>, SessionError> {
        match self.call(endpoint, payload).await {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) if policy == CallPolicy::BestEffort && e.kind() != ErrorKind::AuthExpired => {
                warn!(endpoint = endpoint.name(), "Skipping failed call: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn headers(&self, endpoint: Endpoint, body: &str) -> Vec<(&'static str, String)> {
        let auth = &self.credentials.authorization;
        let authorization = if auth.starts_with("Bearer ") {
            auth.clone()
        } else {
            format!("Bearer {auth}")
        };

        let mut headers = vec![
            ("User-Agent", self.config.server.user_agent.clone()),
            ("Content-Type", "application/json;charset=UTF-8".to_string()),
            ("Authorization", authorization),
            ("satoken", self.credentials.satoken.clone()),
        ];
        headers.extend(endpoint.route_headers());
        headers.push(("sign", self.signer.sign(body)));
        headers
    }

    /// Record code of a session still open on the server, if any.
    pub async fn query_unfinished(&mut self) -> Result<Option<String>, SessionError> {
        let Some(envelope) = self
            .dispatch(CallPolicy::BestEffort, Endpoint::QueryUnfinished, NoPayload {})
            .await?
        else {
            return Ok(None);
        };

        let data = envelope
            .data_as::<Option<UnfinishedData>>()
            .unwrap_or_else(|e| {
                warn!("Unreadable unfinished-session data: {e}");
                None
            });
        Ok(data
            .and_then(|d| d.run_record_code)
            .filter(|code| !code.is_empty()))
    }

    /// Closes a stale session with a minimal failed-run body anchored at `anchor`.
    pub async fn force_close(
        &mut self,
        stale: &mut Session,
        anchor: GeoPoint,
    ) -> Result<bool, SessionError> {
        let code = record_code(stale, Endpoint::FinishPlan)?;
        let body = force_close_body(code, anchor, (self.clock)(), &mut self.rng);

        let closed = self
            .dispatch(CallPolicy::BestEffort, Endpoint::FinishPlan, body)
            .await?
            .is_some();
        if closed {
            stale.advance(SessionState::Recovered);
        } else {
            warn!("Stale session could not be closed");
        }
        Ok(closed)
    }

    /// Opens the session on the server.
    pub async fn start(&mut self, session: &mut Session, origin: GeoPoint) -> Result<(), SessionError> {
        let (endpoint, envelope) = match session.mode().clone() {
            RunMode::Free => {
                let body = StartFreeBody {
                    lng: origin.lng,
                    lat: origin.lat,
                };
                (Endpoint::StartFree, self.call(Endpoint::StartFree, body).await?)
            }
            RunMode::Plan {
                run_plan_code,
                fence_code,
                school_code,
                activity_code,
            } => {
                let body = StartPlanBody {
                    use_credit_sword: "false",
                    run_plan_code,
                    lng: origin.lng,
                    lat: origin.lat,
                    target_distance: "0",
                    fence_code,
                    school_code,
                    activity_code,
                };
                (Endpoint::StartPlan, self.call(Endpoint::StartPlan, body).await?)
            }
        };

        let data: StartData = envelope
            .data_as()
            .map_err(|e| SessionError::malformed(endpoint.name(), e.to_string()))?;
        if data.run_record_code.is_empty() {
            return Err(SessionError::malformed(endpoint.name(), "empty runRecordCode"));
        }

        info!(
            run_record_code = %data.run_record_code,
            checkpoints = data.target_points.len(),
            "Session started"
        );
        session.started(data.run_record_code, data.target_points, (self.clock)());
        Ok(())
    }

    /// Builds the timed trajectory for a started session.
    pub async fn synthesize(
        &mut self,
        session: &Session,
        origin: GeoPoint,
        recorded: Option<RecordedTrajectory>,
        timeline_start: i64,
    ) -> (Strategy, Vec<TrajectoryPoint>) {
        let totals = session.totals();
        let mut request = PathRequest::around(origin)
            .duration_hint(f64::from(totals.duration_s))
            .checkpoints(session.checkpoints().to_vec());
        if let Some(recorded) = recorded {
            request = request.recorded(recorded);
        }

        let path = self.synthesizer.synthesize(&request, &mut self.rng).await;
        let timing = TimingProfile::new(RunnerProfile::for_session(
            f64::from(totals.distance_m),
            f64::from(totals.duration_s),
        ));
        let trajectory = timing.attach_timing(
            &path.points,
            timeline_start,
            f64::from(totals.duration_s),
            1,
            &mut self.rng,
        );
        debug!(strategy = ?path.strategy, points = trajectory.len(), "Trajectory ready");
        (path.strategy, trajectory)
    }

    fn to_pois(&mut self, trajectory: &[TrajectoryPoint], timeline_start: i64) -> Vec<Poi> {
        trajectory
            .iter()
            .map(|p| Poi::from_point(p, timeline_start, self.rng.gen_range(SATELLITES)))
            .collect()
    }

    /// Uploads the trajectory in fixed-size batches. Returns the number of
    /// accepted batches.
    pub async fn upload_trajectory(
        &mut self,
        session: &mut Session,
        pois: &[Poi],
    ) -> Result<usize, SessionError> {
        let code = record_code(session, Endpoint::UploadRecord)?;
        session.advance(SessionState::Uploading);

        let batch_size = self.config.upload.batch_size.max(1);
        let total = pois.len().div_ceil(batch_size);
        let mut accepted = 0;

        for (i, batch) in pois.chunks(batch_size).enumerate() {
            if i > 0 {
                self.pacer.pause(self.policy.batch_delay()).await;
            }
            let body = TrajectoryUploadBody {
                pois: batch,
                run_record_code: &code,
            };
            if self
                .dispatch(CallPolicy::BestEffort, Endpoint::UploadRecord, body)
                .await?
                .is_some()
            {
                accepted += 1;
                session.uploaded_points += batch.len();
            } else {
                warn!(batch = i + 1, total, "Trajectory batch skipped");
            }
        }

        info!(accepted, total, points = session.uploaded_points, "Trajectory uploaded");
        Ok(accepted)
    }

    /// Reports visited checkpoints. Checkpoints are marked passed only once
    /// the server acknowledges them.
    pub async fn confirm_checkpoints(
        &mut self,
        session: &mut Session,
        reports: &[TargetPointReport],
    ) -> Result<usize, SessionError> {
        if reports.is_empty() {
            return Ok(0);
        }
        let code = record_code(session, Endpoint::UploadPassPoint)?;

        self.pause_organically().await;
        let body = PassPointBody {
            target_points: reports,
            run_record_code: &code,
        };
        let acknowledged = self
            .dispatch(CallPolicy::BestEffort, Endpoint::UploadPassPoint, body)
            .await?
            .is_some();
        if !acknowledged {
            return Ok(0);
        }

        let mut passed = 0;
        for (checkpoint, report) in session.checkpoints.iter_mut().zip(reports) {
            if report.pass_status {
                checkpoint.mark_passed(report.clock_time);
                passed += 1;
            }
        }
        info!(passed, total = reports.len(), "Checkpoints confirmed");
        Ok(passed)
    }

    /// Uploads pace, step and stride segments with randomized gaps. Returns
    /// the number of accepted uploads.
    pub async fn upload_segments(
        &mut self,
        session: &Session,
        segments: &SegmentSet,
    ) -> Result<usize, SessionError> {
        let code = record_code(session, Endpoint::UploadPace)?;
        let widths = *self.segments.widths();
        let mut accepted = 0;

        if !segments.pace.is_empty() {
            self.pause_organically().await;
            let body = PaceUploadBody {
                pace_list: Stable::all(&segments.pace),
                pace_interval: widths.pace_m,
                run_record_code: &code,
            };
            accepted += self
                .dispatch(CallPolicy::BestEffort, Endpoint::UploadPace, body)
                .await?
                .map_or(0, |_| 1);
        }

        if !segments.steps.is_empty() {
            self.pause_organically().await;
            let body = StepUploadBody {
                step_list: Stable::all(&segments.steps),
                step_interval: widths.step_s,
                run_record_code: &code,
            };
            accepted += self
                .dispatch(CallPolicy::BestEffort, Endpoint::UploadSteps, body)
                .await?
                .map_or(0, |_| 1);
        }

        if !segments.strides.is_empty() {
            self.pause_organically().await;
            let body = StrideUploadBody {
                stride_list: segments.strides.iter().collect(),
                stride_interval: widths.stride_m,
                run_record_code: &code,
            };
            accepted += self
                .dispatch(CallPolicy::BestEffort, Endpoint::UploadStride, body)
                .await?
                .map_or(0, |_| 1);
        }

        debug!(accepted, "Segments uploaded");
        Ok(accepted)
    }

    /// Closes the session. The server's own explanation is returned verbatim
    /// when it does not accept the run.
    pub async fn finish(
        &mut self,
        session: &mut Session,
        pois: &[Poi],
        segments: &SegmentSet,
        reports: &[TargetPointReport],
        proof_reference: Option<String>,
    ) -> Result<(), SessionError> {
        let is_plan = session.mode().is_plan();
        let endpoint = if is_plan {
            Endpoint::FinishPlan
        } else {
            Endpoint::FinishFree
        };
        let code = record_code(session, endpoint)?;
        session.advance(SessionState::Finishing);

        let tail = &pois[pois.len().saturating_sub(self.config.upload.finish_tail_points)..];
        let widths = self.segments.widths();
        let totals = session.totals();
        let body = if is_plan {
            FinishBody {
                pause_times: Some(0),
                sport_type: Some(1),
                step_interval: widths.step_s,
                distance: WireNumber::Float(f64::from(totals.distance_m)),
                total_step: WireNumber::Int(totals.steps),
                duration: WireNumber::Int(totals.duration_s),
                run_img_record: proof_reference,
                target_points: Some(reports.to_vec()),
                align_type: Some(3),
                step_list: Stable::all(segments.steps.iter().cloned()),
                pace_list: Stable::all(segments.pace.iter().cloned()),
                pace_interval: widths.pace_m,
                pause_count: Some(0),
                pois: tail.to_vec(),
                invalid_reasons: None,
                status: Some(1),
                run_record_code: code,
            }
        } else {
            FinishBody {
                pause_times: None,
                sport_type: None,
                step_interval: widths.step_s,
                distance: WireNumber::Text(totals.distance_m.to_string()),
                total_step: WireNumber::Text(totals.steps.to_string()),
                duration: WireNumber::Text(totals.duration_s.to_string()),
                run_img_record: proof_reference,
                target_points: None,
                align_type: None,
                step_list: Stable::all(segments.steps.iter().cloned()),
                pace_list: Stable::all(segments.pace.iter().cloned()),
                pace_interval: widths.pace_m,
                pause_count: None,
                pois: tail.to_vec(),
                invalid_reasons: None,
                status: None,
                run_record_code: code,
            }
        };

        let envelope = match self.call(endpoint, body).await {
            Ok(envelope) => envelope,
            Err(e) => {
                session.advance(SessionState::Failed);
                return Err(e);
            }
        };

        // A plan finish must carry its acceptance status.
        let data = match envelope.data_as::<Option<FinishData>>() {
            Ok(Some(data)) => data,
            Ok(None) if !is_plan => FinishData::default(),
            Ok(None) => {
                session.advance(SessionState::Failed);
                return Err(SessionError::malformed(endpoint.name(), "missing data"));
            }
            Err(e) => {
                session.advance(SessionState::Failed);
                return Err(SessionError::malformed(endpoint.name(), e.to_string()));
            }
        };
        let accepted = match data.status {
            Some(status) => status == 1,
            None => !is_plan,
        };
        if !accepted {
            session.advance(SessionState::Failed);
            let message = data
                .alert_tip
                .and_then(|tip| tip.content)
                .unwrap_or_else(|| "run was not accepted".to_string());
            return Err(SessionError::rejected(endpoint.name(), envelope.code, message));
        }

        session.advance(SessionState::Finished);
        Ok(())
    }

    async fn pause_organically(&mut self) {
        let delay = self.policy.organic_delay(&mut self.rng);
        self.pacer.pause(delay).await;
    }
}

/// Route lookup configured by `[route]`, or [`NoRoute`] without one.
pub fn route_lookup(config: &RelayConfig) -> Result<Arc<dyn RouteLookup>, ConfigError> {
    let Some(route) = &config.route else {
        return Ok(Arc::new(NoRoute));
    };
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .build()?;
    let mut client = WalkingRouteClient::new(&route.endpoint, &route.key).with_client(http);
    if let Some(dir) = &route.cache_dir {
        client = client.with_cache_dir(dir);
    }
    Ok(Arc::new(client))
}

fn record_code(session: &Session, endpoint: Endpoint) -> Result<String, SessionError> {
    session
        .run_record_code()
        .map(str::to_string)
        .ok_or_else(|| SessionError::malformed(endpoint.name(), "session has no record code"))
}

/// Pass status and time for every server checkpoint, in server order.
///
/// A checkpoint is visited when the trajectory contains it exactly, or
/// failing that, when some fix lies within [`CHECKPOINT_REACH_M`].
pub fn checkpoint_reports(session: &Session, trajectory: &[TrajectoryPoint]) -> Vec<TargetPointReport> {
    session
        .targets
        .iter()
        .zip(session.checkpoints())
        .enumerate()
        .map(|(ordinal, (target, checkpoint))| {
            let visit = trajectory
                .iter()
                .find(|p| p.source == PointSource::Checkpoint(ordinal))
                .or_else(|| {
                    trajectory
                        .iter()
                        .map(|p| (haversine_distance(p.position, checkpoint.position), p))
                        .filter(|(d, _)| *d <= CHECKPOINT_REACH_M)
                        .min_by(|a, b| a.0.total_cmp(&b.0))
                        .map(|(_, p)| p)
                })
                .map(|p| p.timestamp_ms);

            TargetPointReport {
                code: target.code.clone(),
                lng: target.lng,
                lat: target.lat,
                pass_status: visit.is_some(),
                clock_time: visit.unwrap_or(0),
            }
        })
        .collect()
}

/// Minimal finish body that abandons a stale session: zero totals, three
/// unvisited checkpoints scattered around `anchor`, one fix at `anchor`.
fn force_close_body(run_record_code: String, anchor: GeoPoint, now: i64, rng: &mut impl Rng) -> FinishBody {
    const SCATTER_DEG: f64 = 0.001;
    const TARGETS: usize = 3;

    let target_points = (0..TARGETS)
        .map(|_| {
            let suffix: u64 = rng.gen_range(1_000_000_000..=9_999_999_999);
            TargetPointReport {
                code: Value::from(23 * 10_000_000_000 + suffix),
                lng: anchor.lng + rng.gen_range(-SCATTER_DEG..=SCATTER_DEG),
                lat: anchor.lat + rng.gen_range(-SCATTER_DEG..=SCATTER_DEG),
                pass_status: false,
                clock_time: 0,
            }
        })
        .collect();

    FinishBody {
        pause_times: Some(1),
        sport_type: None,
        step_interval: 20,
        distance: WireNumber::Text("0".to_string()),
        total_step: WireNumber::Text("0".to_string()),
        duration: WireNumber::Text("7".to_string()),
        run_img_record: None,
        target_points: Some(target_points),
        align_type: Some(3),
        step_list: vec![Stable::new(StepSegment {
            start_step: 0,
            end_step: 0,
            step: 0,
            start_time: 0,
            end_time: 7,
            time: 7,
            index: i32::MAX as u32,
        })],
        pace_list: vec![Stable::new(PaceSegment {
            start_distance: 0,
            end_distance: 0,
            distance: 0,
            start_time: 0,
            end_time: 6,
            time: 6,
            start_step_count: 0,
            end_step_count: 0,
            step_count: 0,
            index: 82,
        })],
        pace_interval: 50,
        pause_count: Some(1),
        pois: vec![Poi {
            accuracy: 1.0,
            collect_time: now - 10_000,
            create_time: now - 9_700,
            index: 1,
            lat: anchor.lat,
            lng: anchor.lng,
            off_fence_dis_m: -1,
            run_time: 0,
            satellites: 5,
            state: 1,
        }],
        invalid_reasons: Some(Stable::all([
            InvalidReason {
                invalid_detail: "公里数不足基本要求".to_string(),
                invalid_type: 2,
            },
            InvalidReason {
                invalid_detail: format!("只完成0个打卡点，还有{TARGETS}个未完成"),
                invalid_type: 1,
            },
        ])),
        status: Some(0),
        run_record_code,
    }
}
