//! Placement Session: the mode state machine and the authoritative collection
//! of placed entities.
//!
//! # Invariants
//! - Exactly one mode is active; tracking and simulation never overlap.
//! - Entities are append-only until a wholesale reset.
//! - Every failure has a degraded continuation; nothing here ends the session.
//! - Every mutation produces a [`SessionEvent`].

pub mod collab;
mod config;
mod mode;
mod session;
mod status;

pub use collab::{
    CaptureError, CaptureTarget, CapturedFrame, Credential, DescribeError, EnvCredential,
    NoCapture, SceneDescriber, describe_scene,
};
pub use config::{ConfigError, SessionConfig};
pub use mode::SessionMode;
pub use session::{ActionOutcome, PlacementSession, SessionEvent};
pub use status::{Status, StatusLine};

pub use arplace_tracking::PlacementError;
