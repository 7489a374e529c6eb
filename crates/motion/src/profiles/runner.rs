//! Runner athletic profile.

use std::f64::consts::PI;

use super::AthleteProfile;

/// Athletic profile for running sessions.
///
/// Speed follows a half-sine over the session: slow start, faster middle,
/// slow finish. The phase factor is 0.3 at both ends and 1.3 mid-run.
#[derive(Debug, Clone)]
pub struct RunnerProfile {
    /// Base speed in m/s.
    base_speed: f64,
    /// Per-point perturbation (±fraction).
    variance: f64,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            base_speed: 2.5, // ~6:40/km
            variance: 0.15,
        }
    }
}

impl RunnerProfile {
    /// Creates a profile with the given base speed in m/s.
    pub fn with_base_speed(base_speed: f64) -> Self {
        Self {
            base_speed,
            ..Default::default()
        }
    }

    /// Creates a profile with the given base pace in minutes per kilometer.
    pub fn with_pace(pace_min_per_km: f64) -> Self {
        Self::with_base_speed(1000.0 / (pace_min_per_km * 60.0))
    }

    /// Creates a profile whose average speed covers `distance_m` in `duration_s`.
    pub fn for_session(distance_m: f64, duration_s: f64) -> Self {
        if distance_m <= 0.0 || duration_s <= 0.0 {
            return Self::default();
        }
        Self::with_base_speed(distance_m / duration_s / Self::MEAN_PHASE_FACTOR)
    }

    /// Average of the phase factor over [0, 1]: 0.3 + 2/π.
    const MEAN_PHASE_FACTOR: f64 = 0.3 + 2.0 / PI;
}

impl AthleteProfile for RunnerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn phase_factor(&self, progress: f64) -> f64 {
        0.3 + (PI * progress).sin()
    }

    fn variance(&self) -> f64 {
        self.variance
    }
}
