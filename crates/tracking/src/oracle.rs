use arplace_common::Pose;
use tokio::sync::oneshot;

/// Space that a query source's ray is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSpace {
    /// Attached to the device, looking forward.
    Viewer,
    /// World space with the origin on the floor.
    LocalFloor,
}

/// A capability a tracking session can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    LocalFloor,
    OverlaySurface,
    SurfaceHitTest,
}

/// Capabilities requested when a tracking session begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFeatures {
    pub required: Vec<Feature>,
    pub optional: Vec<Feature>,
}

impl SessionFeatures {
    /// What object placement needs: a floor-anchored space and an overlay
    /// surface, with hit testing when the device has it.
    pub fn placement() -> Self {
        Self {
            required: vec![Feature::LocalFloor, Feature::OverlaySurface],
            optional: vec![Feature::SurfaceHitTest],
        }
    }
}

/// Opaque handle to an oracle-side hit-test source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySource(pub u64);

/// One ray/surface intersection reported for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub pose: Pose,
}

/// Pending answer to a query-source request. The oracle resolves it once;
/// dropping the sender without resolving means it never will.
pub type QuerySourceRequest = oneshot::Receiver<Result<QuerySource, OracleError>>;

/// A tracking session could not be started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tracking session failed to start: {reason}")]
pub struct SessionError {
    pub reason: String,
}

impl SessionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors from oracle requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("hit testing is not supported by this session")]
    HitTestUnsupported,
    #[error("reference space unavailable: {0}")]
    ReferenceSpace(String),
    #[error("query source request failed: {0}")]
    Request(String),
}

/// The platform's spatial-tracking subsystem, seen as a capability interface.
pub trait TrackingOracle {
    /// Opaque per-frame snapshot handed to the host's frame callback.
    type Frame;

    /// Whether an immersive tracking session can be started at all.
    fn is_tracking_supported(&self) -> bool;

    fn begin_tracking_session(&mut self, features: &SessionFeatures) -> Result<(), SessionError>;

    /// End the running session, if any.
    fn end_tracking_session(&mut self);

    /// False once the session ended, whether by the user or the device.
    fn is_session_active(&self) -> bool;

    /// Ask for a hit-test source casting along the forward ray of `space`.
    fn request_query_source(&mut self, space: ReferenceSpace) -> QuerySourceRequest;

    /// Intersections for this frame, nearest along the ray first.
    fn intersections(&self, frame: &Self::Frame, source: &QuerySource) -> Vec<Intersection>;
}
