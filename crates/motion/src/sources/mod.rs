//! Geometry sources for path synthesis.
//!
//! This module provides the ways a path can be obtained:
//! - [`RecordedTrajectory`] / [`GpxLoader`]: caller-supplied real trajectories
//! - [`WalkingRouteClient`]: walking directions from an external route API
//! - [`ProceduralGenerator`]: Bézier curves, straight connectives, and loops

mod gpx_files;
mod procedural;
mod recorded;
mod route;

pub use gpx_files::{GpxError, GpxLoader};
pub use procedural::ProceduralGenerator;
pub use recorded::{RecordedError, RecordedTrajectory};
pub use route::{NoRoute, RouteError, RouteLookup, WalkingRouteClient};
