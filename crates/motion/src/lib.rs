//! Synthetic motion data for running sessions.
//!
//! This crate fabricates everything a running session reports about movement:
//! an ordered trajectory of GPS fixes with timing, speed and accuracy, and the
//! pace/step/stride aggregate segments derived from the session totals.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use motion::prelude::*;
//!
//! let synthesizer = PathSynthesizer::new(SynthesisConfig::default(), Arc::new(NoRoute));
//! let request = PathRequest::around(GeoPoint::new(120.5235, 30.6474)).duration_hint(786.0);
//! let path = synthesizer.synthesize(&request, &mut rng).await;
//!
//! let timing = TimingProfile::new(RunnerProfile::default());
//! let trajectory = timing.attach_timing(&path.points, start_ms, 786.0, 1, &mut rng);
//!
//! let segments = SegmentDataGenerator::new().generate(&SessionTotals::new(3000, 786, 1894));
//! ```

pub mod config;
pub mod generators;
pub mod geodesy;
pub mod model;
pub mod path;
pub mod profiles;
pub mod sources;
pub mod timing;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{LoopConfig, SynthesisConfig};
    pub use crate::generators::{
        PaceSegment, SegmentDataGenerator, SegmentSet, SegmentWidths, StepSegment, StrideSegment,
    };
    pub use crate::geodesy::haversine_distance;
    pub use crate::model::{
        Checkpoint, GeoPoint, PathPoint, PointSource, SessionTotals, TrajectoryPoint,
    };
    pub use crate::path::{PathRequest, PathSynthesizer, Strategy, SynthesizedPath};
    pub use crate::profiles::{AthleteProfile, RunnerProfile, sample_variance};
    pub use crate::sources::{
        GpxLoader, NoRoute, ProceduralGenerator, RecordedTrajectory, RouteLookup,
        WalkingRouteClient,
    };
    pub use crate::timing::TimingProfile;
}
