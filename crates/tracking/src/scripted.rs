use crate::oracle::{
    Intersection, OracleError, QuerySource, QuerySourceRequest, ReferenceSpace, SessionError,
    SessionFeatures, TrackingOracle,
};
use arplace_common::Pose;
use glam::Vec3;
use tokio::sync::oneshot;

/// How a [`ScriptedOracle`] answers query-source requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTestBehavior {
    /// Resolved before the request is handed back.
    Immediate,
    /// Held until [`ScriptedOracle::resolve_pending`] is called; never
    /// resolves otherwise.
    Deferred,
    /// Resolved with [`OracleError::HitTestUnsupported`].
    Unsupported,
    /// The sender is dropped without an answer.
    Dropped,
}

/// A frame snapshot carrying the intersections the script wants reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedFrame {
    pub intersections: Vec<Intersection>,
}

impl ScriptedFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single flat hit at `position`.
    pub fn hit(position: Vec3) -> Self {
        Self::with_intersections(vec![Intersection {
            pose: Pose::at(position),
        }])
    }

    pub fn with_intersections(intersections: Vec<Intersection>) -> Self {
        Self { intersections }
    }
}

/// Deterministic stand-in for a device tracking subsystem.
///
/// Used by the command-line driver on machines without tracking hardware and
/// by tests to script capability, session and hit-test outcomes.
#[derive(Debug)]
pub struct ScriptedOracle {
    supported: bool,
    start_failure: Option<String>,
    hit_test: HitTestBehavior,
    active: bool,
    requests: usize,
    next_source: u64,
    pending: Option<oneshot::Sender<Result<QuerySource, OracleError>>>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedOracle {
    /// Tracking supported, sessions start, hit testing resolves immediately.
    pub fn new() -> Self {
        Self {
            supported: true,
            start_failure: None,
            hit_test: HitTestBehavior::Immediate,
            active: false,
            requests: 0,
            next_source: 1,
            pending: None,
        }
    }

    /// A device without any tracking capability.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Sessions fail to start with `reason` (e.g. permission denied).
    pub fn with_start_failure(mut self, reason: impl Into<String>) -> Self {
        self.start_failure = Some(reason.into());
        self
    }

    pub fn with_hit_test(mut self, behavior: HitTestBehavior) -> Self {
        self.hit_test = behavior;
        self
    }

    /// Number of query-source requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests
    }

    /// Resolve a deferred request. Returns false if none was waiting or the
    /// requester is gone.
    pub fn resolve_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(tx) => {
                let source = self.allocate_source();
                tx.send(Ok(source)).is_ok()
            }
            None => false,
        }
    }

    /// Simulate the device ending the session.
    pub fn interrupt(&mut self) {
        self.active = false;
    }

    fn allocate_source(&mut self) -> QuerySource {
        let source = QuerySource(self.next_source);
        self.next_source += 1;
        source
    }
}

impl TrackingOracle for ScriptedOracle {
    type Frame = ScriptedFrame;

    fn is_tracking_supported(&self) -> bool {
        self.supported
    }

    fn begin_tracking_session(&mut self, features: &SessionFeatures) -> Result<(), SessionError> {
        if !self.supported {
            return Err(SessionError::new("immersive tracking is not supported"));
        }
        if let Some(reason) = &self.start_failure {
            return Err(SessionError::new(reason.clone()));
        }
        tracing::debug!(
            required = features.required.len(),
            optional = features.optional.len(),
            "scripted tracking session started"
        );
        self.active = true;
        Ok(())
    }

    fn end_tracking_session(&mut self) {
        self.active = false;
        self.pending = None;
    }

    fn is_session_active(&self) -> bool {
        self.active
    }

    fn request_query_source(&mut self, _space: ReferenceSpace) -> QuerySourceRequest {
        self.requests += 1;
        let (tx, rx) = oneshot::channel();
        match self.hit_test {
            HitTestBehavior::Immediate => {
                let source = self.allocate_source();
                let _ = tx.send(Ok(source));
            }
            HitTestBehavior::Deferred => self.pending = Some(tx),
            HitTestBehavior::Unsupported => {
                let _ = tx.send(Err(OracleError::HitTestUnsupported));
            }
            HitTestBehavior::Dropped => drop(tx),
        }
        rx
    }

    fn intersections(&self, frame: &ScriptedFrame, _source: &QuerySource) -> Vec<Intersection> {
        frame.intersections.clone()
    }
}
