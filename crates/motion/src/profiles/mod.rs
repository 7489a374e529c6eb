//! Athletic speed profiles.
//!
//! Profiles define how fast an athlete moves at each point of a session.
//! They are used by [`TimingProfile`](crate::timing::TimingProfile) to produce
//! realistic timestamps.

mod runner;

pub use runner::RunnerProfile;

/// Trait for athletic speed profiles.
///
/// Implementations should provide:
/// - Base speed on flat terrain
/// - Phase factor (speed multiplier over normalized session progress)
/// - Point-to-point variance
pub trait AthleteProfile: Send + Sync {
    /// Base speed in meters per second.
    fn base_speed_mps(&self) -> f64;

    /// Speed multiplier at a normalized position along the path (0.0 = start, 1.0 = end).
    fn phase_factor(&self, progress: f64) -> f64;

    /// Maximum relative per-point speed perturbation (0.15 means ±15%).
    fn variance(&self) -> f64;
}

/// Speed at a normalized position, before per-point variance.
pub fn speed_at(profile: &dyn AthleteProfile, progress: f64) -> f64 {
    let speed = profile.base_speed_mps() * profile.phase_factor(progress.clamp(0.0, 1.0));
    speed.max(0.5) // Minimum 0.5 m/s to avoid division issues
}

/// Samples a uniform variance factor around 1.0.
pub fn sample_variance(profile: &dyn AthleteProfile, rng: &mut impl rand::Rng) -> f64 {
    let spread = profile.variance().clamp(0.0, 0.9);
    if spread > 0.0 {
        rng.gen_range((1.0 - spread)..=(1.0 + spread))
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_variance_bounds() {
        let profile = RunnerProfile::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let v = sample_variance(&profile, &mut rng);
            assert!((0.85..=1.15).contains(&v), "variance {v}");
        }
    }

    #[test]
    fn test_speed_floor() {
        let profile = RunnerProfile::with_base_speed(0.1);
        assert_eq!(speed_at(&profile, 0.0), 0.5);
    }
}
