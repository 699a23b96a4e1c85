//! Surface Tracking: keeps the single best estimate of where an object would
//! land if placed right now.
//!
//! # Invariants
//! - The query source is requested at most once per tracking session.
//! - Only `visible` decides whether the anchor may be used.
//! - Oracle poses are taken verbatim; no smoothing.

mod oracle;
mod scripted;
mod tracker;

pub use oracle::{
    Feature, Intersection, OracleError, QuerySource, QuerySourceRequest, ReferenceSpace,
    SessionError, SessionFeatures, TrackingOracle,
};
pub use scripted::{HitTestBehavior, ScriptedFrame, ScriptedOracle};
pub use tracker::{AnchorPose, PlacementError, QuerySourceState, SurfaceTracker};
