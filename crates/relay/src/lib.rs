//! Signed session upload protocol for synthesized running sessions.
//!
//! [`client::SessionProtocolClient`] drives one session against the server:
//! it signs every body with [`signing::RequestSigner`], paces and retries
//! calls, and feeds the server the trajectory and segments built by the
//! `motion` crate. [`report::Reporter`] tells the orchestrator how it went.

pub mod client;
pub mod config;
pub mod discovery;
pub mod endpoints;
pub mod errors;
pub mod pacing;
pub mod params;
pub mod report;
pub mod session;
pub mod signing;
pub mod transport;
pub mod types;

pub use client::{SessionOutcome, SessionPlan, SessionProtocolClient};
pub use config::RelayConfig;
pub use errors::{ErrorKind, SessionError};
pub use session::{RunMode, Session, SessionState};
