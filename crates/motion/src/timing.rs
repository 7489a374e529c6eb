//! Timestamps, speeds, and GPS accuracy for synthesized paths.

use rand::Rng;

use crate::geodesy::haversine_distance;
use crate::model::{PathPoint, TrajectoryPoint};
use crate::profiles::{self, AthleteProfile, RunnerProfile};

/// Assigns timing, speed, and accuracy to each point of a path.
pub struct TimingProfile {
    profile: Box<dyn AthleteProfile>,
    /// Accuracy range for the first and last fix (meters).
    endpoint_accuracy_m: (f64, f64),
    /// Best accuracy of an interior fix (meters).
    accuracy_floor_m: f64,
    /// Accuracy added at or above `accuracy_speed_cap_mps` (meters).
    accuracy_span_m: f64,
    /// Speed at which accuracy stops degrading.
    accuracy_speed_cap_mps: f64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::new(RunnerProfile::default())
    }
}

impl TimingProfile {
    pub fn new(profile: impl AthleteProfile + 'static) -> Self {
        Self {
            profile: Box::new(profile),
            endpoint_accuracy_m: (1.0, 3.0),
            accuracy_floor_m: 1.0,
            accuracy_span_m: 4.0,
            accuracy_speed_cap_mps: 5.0,
        }
    }

    /// Attaches timing to `points`, starting at `start_ms` and spanning
    /// `total_duration_s`. Sequence indices start at `first_index`.
    ///
    /// Raw segment times follow the profile's speed curve with per-point
    /// variance and are then scaled so the cumulative time equals the
    /// requested duration. Zero-length segments take no time.
    pub fn attach_timing(
        &self,
        points: &[PathPoint],
        start_ms: i64,
        total_duration_s: f64,
        first_index: u32,
        rng: &mut impl Rng,
    ) -> Vec<TrajectoryPoint> {
        let n = points.len();
        if n == 0 {
            return Vec::new();
        }

        let distances: Vec<f64> = points
            .windows(2)
            .map(|w| haversine_distance(w[0].position, w[1].position))
            .collect();

        let mut raw_times = Vec::with_capacity(distances.len());
        for (i, distance) in distances.iter().enumerate() {
            let progress = (i + 1) as f64 / (n - 1) as f64;
            let speed = profiles::speed_at(self.profile.as_ref(), progress)
                * profiles::sample_variance(self.profile.as_ref(), rng);
            raw_times.push(distance / speed);
        }

        let raw_total: f64 = raw_times.iter().sum();
        let target_total = total_duration_s.max(0.0);
        let segment_times: Vec<f64> = if raw_total > 0.0 {
            let scale = target_total / raw_total;
            raw_times.iter().map(|t| t * scale).collect()
        } else if !raw_times.is_empty() {
            // Every point is at the same spot; spread the time evenly.
            vec![target_total / raw_times.len() as f64; raw_times.len()]
        } else {
            Vec::new()
        };

        let mut result = Vec::with_capacity(n);
        let mut elapsed_s = 0.0;
        for (i, point) in points.iter().enumerate() {
            let speed = if i == 0 {
                0.0
            } else {
                elapsed_s += segment_times[i - 1];
                let dt = segment_times[i - 1];
                if dt > 0.0 { distances[i - 1] / dt } else { 0.0 }
            };

            let accuracy = if i == 0 || i == n - 1 {
                rng.gen_range(self.endpoint_accuracy_m.0..=self.endpoint_accuracy_m.1)
            } else {
                self.interior_accuracy(speed)
            };

            result.push(TrajectoryPoint {
                position: point.position,
                timestamp_ms: start_ms + (elapsed_s * 1000.0).round() as i64,
                accuracy_m: accuracy,
                speed_mps: speed,
                index: first_index + i as u32,
                source: point.source,
            });
        }

        result
    }

    /// Faster movement means a looser fix, up to a capped maximum.
    fn interior_accuracy(&self, speed_mps: f64) -> f64 {
        let speed_factor = (speed_mps / self.accuracy_speed_cap_mps).clamp(0.0, 1.0);
        self.accuracy_floor_m + speed_factor * self.accuracy_span_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::offset_meters;
    use crate::model::{GeoPoint, PointSource};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const START_MS: i64 = 1_700_000_000_000;

    fn straight_path(n: usize, spacing_m: f64) -> Vec<PathPoint> {
        let origin = GeoPoint::new(120.523568, 30.647431);
        (0..n)
            .map(|i| PathPoint::interpolated(offset_meters(origin, 0.0, i as f64 * spacing_m)))
            .collect()
    }

    #[test]
    fn test_duration_matches() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(42);

        let points = timing.attach_timing(&straight_path(200, 5.0), START_MS, 786.0, 1, &mut rng);

        assert_eq!(points.len(), 200);
        assert_eq!(points[0].timestamp_ms, START_MS);
        let elapsed = points.last().unwrap().timestamp_ms - START_MS;
        assert!((elapsed - 786_000).abs() <= 1, "elapsed {elapsed}");
    }

    #[test]
    fn test_indices_and_timestamps_monotonic() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(7);

        let points = timing.attach_timing(&straight_path(100, 4.0), START_MS, 120.0, 10, &mut rng);

        assert_eq!(points[0].index, 10);
        for w in points.windows(2) {
            assert_eq!(w[1].index, w[0].index + 1);
            assert!(w[1].timestamp_ms >= w[0].timestamp_ms);
        }
    }

    #[test]
    fn test_speed_curve_is_slow_fast_slow() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(3);

        let points = timing.attach_timing(&straight_path(101, 5.0), START_MS, 300.0, 1, &mut rng);

        let early: f64 = points[1..11].iter().map(|p| p.speed_mps).sum::<f64>() / 10.0;
        let middle: f64 = points[45..55].iter().map(|p| p.speed_mps).sum::<f64>() / 10.0;
        let late: f64 = points[90..100].iter().map(|p| p.speed_mps).sum::<f64>() / 10.0;
        assert!(middle > early * 1.5, "early {early} middle {middle}");
        assert!(middle > late * 1.5, "late {late} middle {middle}");
    }

    #[test]
    fn test_accuracy_bounds() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(5);

        let points = timing.attach_timing(&straight_path(50, 5.0), START_MS, 60.0, 1, &mut rng);

        let first = points[0].accuracy_m;
        let last = points.last().unwrap().accuracy_m;
        assert!((1.0..=3.0).contains(&first));
        assert!((1.0..=3.0).contains(&last));
        for p in &points[1..points.len() - 1] {
            assert!((1.0..=5.0).contains(&p.accuracy_m));
        }
    }

    #[test]
    fn test_single_point() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(5);

        let points = timing.attach_timing(&straight_path(1, 5.0), START_MS, 60.0, 1, &mut rng);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp_ms, START_MS);
        assert_eq!(points[0].speed_mps, 0.0);
    }

    #[test]
    fn test_stationary_points_spread_evenly() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(5);
        let points = straight_path(5, 0.0);

        let timed = timing.attach_timing(&points, START_MS, 40.0, 1, &mut rng);
        assert_eq!(timed[4].timestamp_ms, START_MS + 40_000);
        assert!(timed.iter().all(|p| p.speed_mps == 0.0));
    }

    #[test]
    fn test_checkpoint_source_preserved() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut points = straight_path(3, 10.0);
        points[1].source = PointSource::Checkpoint(0);

        let timed = timing.attach_timing(&points, START_MS, 10.0, 1, &mut rng);
        assert_eq!(timed[1].source, PointSource::Checkpoint(0));
        assert_eq!(timed[1].position, points[1].position);
    }

    #[test]
    fn test_empty() {
        let timing = TimingProfile::default();
        let mut rng = StdRng::seed_from_u64(5);
        assert!(timing.attach_timing(&[], START_MS, 60.0, 1, &mut rng).is_empty());
    }
}
