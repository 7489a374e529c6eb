//! Path synthesis with strategy fallback.
//!
//! Strategies are tried in priority order:
//! 1. a caller-supplied recorded trajectory, used verbatim after normalization;
//! 2. two or more checkpoints, visited exactly, joined by looked-up routes or
//!    jittered straight connectives, then densified;
//! 3. an explicit destination, joined by a looked-up route or a Bézier curve;
//! 4. a closed loop around the origin.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::SynthesisConfig;
use crate::geodesy::haversine_distance;
use crate::model::{Checkpoint, GeoPoint, PathPoint};
use crate::sources::{ProceduralGenerator, RecordedTrajectory, RouteLookup};

/// Route points closer than this to a checkpoint are dropped so the checkpoint
/// itself stays the only point at that location.
const CHECKPOINT_SNAP_M: f64 = 0.5;

/// Below this origin/destination separation the pair is treated as one point.
const DEGENERATE_M: f64 = 0.01;

/// Which strategy produced a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Recorded,
    Checkpoints,
    Routed,
    Curve,
    Loop,
    Degenerate,
}

/// Inputs to [`PathSynthesizer::synthesize`].
#[derive(Debug, Clone)]
pub struct PathRequest {
    pub origin: GeoPoint,
    pub destination: Option<GeoPoint>,
    pub duration_hint_s: f64,
    pub checkpoints: Vec<Checkpoint>,
    pub recorded: Option<RecordedTrajectory>,
}

impl PathRequest {
    /// A request with no destination, which falls back to a loop around `origin`.
    pub fn around(origin: GeoPoint) -> Self {
        Self {
            origin,
            destination: None,
            duration_hint_s: 0.0,
            checkpoints: Vec::new(),
            recorded: None,
        }
    }

    /// A request from `origin` to `destination`.
    pub fn between(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            destination: Some(destination),
            ..Self::around(origin)
        }
    }

    pub fn duration_hint(mut self, seconds: f64) -> Self {
        self.duration_hint_s = seconds;
        self
    }

    pub fn checkpoints(mut self, checkpoints: Vec<Checkpoint>) -> Self {
        self.checkpoints = checkpoints;
        self
    }

    pub fn recorded(mut self, recorded: RecordedTrajectory) -> Self {
        self.recorded = Some(recorded);
        self
    }
}

/// An ordered, untimed path and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct SynthesizedPath {
    pub strategy: Strategy,
    pub points: Vec<PathPoint>,
}

impl SynthesizedPath {
    /// Indices of checkpoint-sourced points, in path order.
    pub fn checkpoint_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.source.is_checkpoint())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Produces ordered geographic points for a session.
pub struct PathSynthesizer {
    procedural: ProceduralGenerator,
    route: Arc<dyn RouteLookup>,
}

impl PathSynthesizer {
    pub fn new(config: SynthesisConfig, route: Arc<dyn RouteLookup>) -> Self {
        Self {
            procedural: ProceduralGenerator::new(config),
            route,
        }
    }

    pub fn config(&self) -> &SynthesisConfig {
        self.procedural.config()
    }

    /// Synthesizes a path for the request, falling back through the strategies.
    pub async fn synthesize(&self, request: &PathRequest, rng: &mut impl Rng) -> SynthesizedPath {
        if let Some(recorded) = request.recorded.as_ref().filter(|r| r.is_usable()) {
            info!("Using recorded trajectory with {} points", recorded.len());
            return SynthesizedPath {
                strategy: Strategy::Recorded,
                points: recorded
                    .points()
                    .iter()
                    .copied()
                    .map(PathPoint::recorded)
                    .collect(),
            };
        }

        if request.checkpoints.len() >= 2 {
            let points = self.through_checkpoints(&request.checkpoints, rng).await;
            info!(
                "Synthesized {} points through {} checkpoints",
                points.len(),
                request.checkpoints.len()
            );
            return SynthesizedPath {
                strategy: Strategy::Checkpoints,
                points,
            };
        }

        if let Some(destination) = request.destination {
            return self
                .between(request.origin, destination, request.duration_hint_s, rng)
                .await;
        }

        let points = self.procedural.loop_path(request.origin, rng);
        info!("Synthesized loop of {} points", points.len());
        SynthesizedPath {
            strategy: Strategy::Loop,
            points: points.into_iter().map(PathPoint::interpolated).collect(),
        }
    }

    async fn between(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        duration_hint_s: f64,
        rng: &mut impl Rng,
    ) -> SynthesizedPath {
        if haversine_distance(origin, destination) < DEGENERATE_M {
            return SynthesizedPath {
                strategy: Strategy::Degenerate,
                points: vec![PathPoint::interpolated(origin)],
            };
        }

        match self.route.walking_route(origin, destination).await {
            Ok(route) if route.len() >= 2 => SynthesizedPath {
                strategy: Strategy::Routed,
                points: route.into_iter().map(PathPoint::interpolated).collect(),
            },
            Ok(_) => self.curve(origin, destination, duration_hint_s, rng),
            Err(e) => {
                debug!("Route lookup unavailable, using curve: {e}");
                self.curve(origin, destination, duration_hint_s, rng)
            }
        }
    }

    fn curve(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        duration_hint_s: f64,
        rng: &mut impl Rng,
    ) -> SynthesizedPath {
        let points = self
            .procedural
            .bezier_path(origin, destination, duration_hint_s, rng);
        SynthesizedPath {
            strategy: Strategy::Curve,
            points: points.into_iter().map(PathPoint::interpolated).collect(),
        }
    }

    /// Builds a path that contains every checkpoint's exact coordinates in input order.
    async fn through_checkpoints(
        &self,
        checkpoints: &[Checkpoint],
        rng: &mut impl Rng,
    ) -> Vec<PathPoint> {
        let mut points = Vec::new();

        for (ordinal, pair) in checkpoints.windows(2).enumerate() {
            let (from, to) = (pair[0].position, pair[1].position);
            points.push(PathPoint::checkpoint(from, ordinal));

            match self.route.walking_route(from, to).await {
                Ok(route) if route.len() >= 2 => {
                    points.extend(
                        route
                            .into_iter()
                            .filter(|p| {
                                haversine_distance(*p, from) > CHECKPOINT_SNAP_M
                                    && haversine_distance(*p, to) > CHECKPOINT_SNAP_M
                            })
                            .map(PathPoint::interpolated),
                    );
                }
                other => {
                    if let Err(e) = other {
                        warn!(
                            "Route lookup failed between checkpoints {} and {}: {e}",
                            ordinal,
                            ordinal + 1
                        );
                    }
                    points.extend(
                        self.procedural
                            .straight_segment(from, to, rng)
                            .into_iter()
                            .map(PathPoint::interpolated),
                    );
                }
            }
        }

        if let Some(last) = checkpoints.last() {
            points.push(PathPoint::checkpoint(last.position, checkpoints.len() - 1));
        }

        self.procedural.densify(points, rng)
    }
}
