//! Configuration types for trajectory synthesis.

use serde::{Deserialize, Serialize};

/// Shape of the closed-loop fallback path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Loop radius in meters.
    pub radius_m: f64,
    /// Number of laps traversed.
    pub laps: usize,
    /// Points sampled per lap.
    pub points_per_lap: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            radius_m: 100.0,
            laps: 3,
            points_per_lap: 100,
        }
    }
}

impl LoopConfig {
    /// Approximate path length of the whole loop in meters.
    pub fn length_m(&self) -> f64 {
        std::f64::consts::TAU * self.radius_m * self.laps as f64
    }
}

/// Tuning knobs for [`PathSynthesizer`](crate::path::PathSynthesizer) and its sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Receiver-noise jitter on procedural curve points, standard deviation in meters.
    pub gps_jitter_m: f64,
    /// Jitter on straight-line connective points between checkpoints, in degrees.
    pub connective_jitter_deg: f64,
    /// Jitter on points inserted by the smoothing pass, in degrees.
    pub smoothing_jitter_deg: f64,
    /// Spacing range for straight-line connective segments in meters (min, max).
    pub connective_spacing_m: (f64, f64),
    /// Consecutive non-checkpoint points farther apart than this get densified.
    pub smoothing_threshold_m: f64,
    /// Target spacing of densified points in meters.
    pub smoothing_spacing_m: f64,
    /// Approximate spacing between procedural curve samples in meters.
    pub curve_spacing_m: f64,
    /// Approximate interval between GPS fixes in seconds.
    pub sample_interval_s: f64,
    /// Fraction of each curve step kept from the curve itself (the rest follows
    /// the previous step's direction).
    pub direction_memory: f64,
    /// Closed-loop fallback.
    pub loop_path: LoopConfig,
    /// Fixed RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            gps_jitter_m: 3.0,
            connective_jitter_deg: 0.000015,
            smoothing_jitter_deg: 0.000008,
            connective_spacing_m: (3.0, 6.0),
            smoothing_threshold_m: 8.0,
            smoothing_spacing_m: 5.0,
            curve_spacing_m: 10.0,
            sample_interval_s: 3.0,
            direction_memory: 0.7,
            loop_path: LoopConfig::default(),
            seed: None,
        }
    }
}
