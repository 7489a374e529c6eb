//! Procedural path generation.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::SynthesisConfig;
use crate::geodesy::{haversine_distance, lerp, meters_to_degrees, offset_meters};
use crate::model::{GeoPoint, PathPoint};

/// Floor for every configured spacing and interval; keeps point counts finite.
const MIN_SPACING: f64 = 0.5;

/// Generates synthetic path geometry with receiver-like noise.
pub struct ProceduralGenerator {
    config: SynthesisConfig,
}

impl ProceduralGenerator {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Generates a curved path from `origin` to `destination`.
    ///
    /// One to three control points are placed off the straight axis to emulate
    /// street turns, the cubic curve is sampled at uniform `t`, each step is
    /// blended with the previous step's direction, and interior points get
    /// Gaussian jitter. The endpoints are kept exact.
    pub fn bezier_path(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        duration_hint_s: f64,
        rng: &mut impl Rng,
    ) -> Vec<GeoPoint> {
        let route_distance = haversine_distance(origin, destination);
        if route_distance < f64::EPSILON {
            return vec![origin];
        }

        let dx = destination.lng - origin.lng;
        let dy = destination.lat - origin.lat;

        // Control points ordered along the route so the curve never doubles back.
        let num_turns = rng.gen_range(1..=3);
        let mut turns: Vec<(f64, GeoPoint)> = (0..num_turns)
            .map(|_| {
                let turn_pos = rng.gen_range(0.25..0.75);
                let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let strength = rng.gen_range(0.2..0.5);
                let control = GeoPoint::new(
                    origin.lng + dx * turn_pos + side * dy * strength,
                    origin.lat + dy * turn_pos - side * dx * strength,
                );
                (turn_pos, control)
            })
            .collect();
        turns.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (c1, c2) = match turns.as_slice() {
            [(_, only)] => (*only, destination),
            [(_, first), .., (_, last)] => (*first, *last),
            [] => (origin, destination),
        };

        let by_spacing = (route_distance / self.config.curve_spacing_m.max(MIN_SPACING)).ceil() as usize;
        let by_time = (duration_hint_s.max(0.0) / self.config.sample_interval_s.max(MIN_SPACING)).ceil() as usize;
        let num_points = by_spacing.max(by_time).max(2);

        let jitter = Jitter::new(meters_to_degrees(self.config.gps_jitter_m));
        let memory = self.config.direction_memory.clamp(0.0, 1.0);

        let mut smooth: Vec<GeoPoint> = Vec::with_capacity(num_points);
        let mut prev_step = (0.0, 0.0);
        for i in 0..num_points {
            let t = i as f64 / (num_points - 1) as f64;
            let on_curve = cubic_bezier(origin, c1, c2, destination, t);

            let point = match smooth.last() {
                Some(prev) => {
                    let step = (
                        memory * (on_curve.lng - prev.lng) + (1.0 - memory) * prev_step.0,
                        memory * (on_curve.lat - prev.lat) + (1.0 - memory) * prev_step.1,
                    );
                    prev_step = step;
                    GeoPoint::new(prev.lng + step.0, prev.lat + step.1)
                }
                None => on_curve,
            };
            smooth.push(point);
        }

        let last = smooth.len() - 1;
        smooth
            .into_iter()
            .enumerate()
            .map(|(i, p)| match i {
                0 => origin,
                i if i == last => destination,
                _ => GeoPoint::new(p.lng + jitter.sample(rng), p.lat + jitter.sample(rng)),
            })
            .collect()
    }

    /// Generates the interior points of a straight connective from `from` to `to`.
    ///
    /// Spacing is drawn once per segment from the configured range. Neither
    /// endpoint is included.
    pub fn straight_segment(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        rng: &mut impl Rng,
    ) -> Vec<GeoPoint> {
        let distance = haversine_distance(from, to);
        let (min_spacing, max_spacing) = self.config.connective_spacing_m;
        let min_spacing = min_spacing.max(MIN_SPACING);
        let spacing = if max_spacing > min_spacing {
            rng.gen_range(min_spacing..max_spacing)
        } else {
            min_spacing
        };

        let steps = (distance / spacing).ceil() as usize;
        if steps < 2 {
            return Vec::new();
        }

        let jitter = Jitter::new(self.config.connective_jitter_deg);
        (1..steps)
            .map(|j| {
                let p = lerp(from, to, j as f64 / steps as f64);
                GeoPoint::new(p.lng + jitter.sample(rng), p.lat + jitter.sample(rng))
            })
            .collect()
    }

    /// Generates a closed loop around `center`, traversed for the configured
    /// number of laps.
    pub fn loop_path(&self, center: GeoPoint, rng: &mut impl Rng) -> Vec<GeoPoint> {
        let loop_config = self.config.loop_path;
        let per_lap = loop_config.points_per_lap.max(3);
        let laps = loop_config.laps.max(1);
        let jitter = Jitter::new(self.config.connective_jitter_deg);

        let mut points = Vec::with_capacity(per_lap * laps);
        for _ in 0..laps {
            for i in 0..per_lap {
                let angle = std::f64::consts::TAU * i as f64 / per_lap as f64;
                let p = offset_meters(
                    center,
                    loop_config.radius_m * angle.cos(),
                    loop_config.radius_m * angle.sin(),
                );
                points.push(GeoPoint::new(
                    p.lng + jitter.sample(rng),
                    p.lat + jitter.sample(rng),
                ));
            }
        }
        points
    }

    /// Inserts interpolated points wherever two consecutive non-checkpoint
    /// points are farther apart than the smoothing threshold.
    pub fn densify(&self, points: Vec<PathPoint>, rng: &mut impl Rng) -> Vec<PathPoint> {
        let jitter = Jitter::new(self.config.smoothing_jitter_deg);
        let mut smoothed = Vec::with_capacity(points.len());

        for i in 0..points.len() {
            let current = points[i];
            smoothed.push(current);

            let Some(next) = points.get(i + 1) else {
                continue;
            };
            if current.source.is_checkpoint() || next.source.is_checkpoint() {
                continue;
            }

            let dist = haversine_distance(current.position, next.position);
            if dist <= self.config.smoothing_threshold_m {
                continue;
            }

            let num_insert = ((dist / self.config.smoothing_spacing_m.max(MIN_SPACING)) as usize).max(1);
            for j in 1..=num_insert {
                let p = lerp(
                    current.position,
                    next.position,
                    j as f64 / (num_insert + 1) as f64,
                );
                smoothed.push(PathPoint::interpolated(GeoPoint::new(
                    p.lng + jitter.sample(rng),
                    p.lat + jitter.sample(rng),
                )));
            }
        }

        smoothed
    }
}

/// Zero-mean Gaussian positional noise. Non-positive sigmas disable it.
struct Jitter(Option<Normal<f64>>);

impl Jitter {
    fn new(sigma: f64) -> Self {
        Self(Normal::new(0.0, sigma).ok().filter(|_| sigma > 0.0))
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        self.0.as_ref().map_or(0.0, |normal| normal.sample(rng))
    }
}

fn cubic_bezier(p0: GeoPoint, p1: GeoPoint, p2: GeoPoint, p3: GeoPoint, t: f64) -> GeoPoint {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    GeoPoint::new(
        b0 * p0.lng + b1 * p1.lng + b2 * p2.lng + b3 * p3.lng,
        b0 * p0.lat + b1 * p1.lat + b2 * p2.lat + b3 * p3.lat,
    )
}
