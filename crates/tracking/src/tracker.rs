use crate::oracle::{QuerySource, QuerySourceRequest, ReferenceSpace, TrackingOracle};
use arplace_common::{AssetReference, PlacedEntity, Pose};
use rand::Rng;
use tokio::sync::oneshot::error::TryRecvError;

/// Current placement anchor. `pose` keeps its last value while hidden, but
/// only `visible` says whether it is usable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorPose {
    pub pose: Pose,
    pub visible: bool,
}

/// Why a placement gesture produced no entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("no surface under the placement ray")]
    NotVisible,
    #[error("no placement session is running")]
    NotPlaying,
}

/// Observable state of the hit-test query source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySourceState {
    Unrequested,
    Pending,
    Ready(QuerySource),
    /// The request failed or was abandoned; never retried this session.
    Unavailable,
}

#[derive(Debug)]
enum Slot {
    Unrequested,
    Pending(QuerySourceRequest),
    Ready(QuerySource),
    Unavailable,
}

/// Per-frame hit-test anchor.
#[derive(Debug)]
pub struct SurfaceTracker {
    slot: Slot,
    anchor: AnchorPose,
}

impl Default for SurfaceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceTracker {
    pub fn new() -> Self {
        Self {
            slot: Slot::Unrequested,
            anchor: AnchorPose::default(),
        }
    }

    /// Refresh the anchor from this frame's intersections.
    ///
    /// The first call requests the query source. Until it resolves, and
    /// forever if it fails, the anchor stays hidden.
    pub fn update<O>(&mut self, oracle: &mut O, frame: &O::Frame) -> AnchorPose
    where
        O: TrackingOracle + ?Sized,
    {
        let _span = tracing::info_span!("tracker_update").entered();

        if matches!(self.slot, Slot::Unrequested) {
            tracing::debug!("requesting hit-test query source");
            self.slot = Slot::Pending(oracle.request_query_source(ReferenceSpace::Viewer));
        }

        let outcome = match &mut self.slot {
            Slot::Pending(request) => Some(request.try_recv()),
            _ => None,
        };
        match outcome {
            Some(Ok(Ok(source))) => {
                tracing::debug!(?source, "query source ready");
                self.slot = Slot::Ready(source);
            }
            Some(Ok(Err(error))) => {
                tracing::warn!(%error, "hit testing unavailable for this session");
                self.slot = Slot::Unavailable;
            }
            Some(Err(TryRecvError::Closed)) => {
                tracing::warn!("query source request abandoned by the oracle");
                self.slot = Slot::Unavailable;
            }
            Some(Err(TryRecvError::Empty)) | None => {}
        }

        self.anchor.visible = match &self.slot {
            Slot::Ready(source) => match oracle.intersections(frame, source).first() {
                Some(hit) => {
                    self.anchor.pose = hit.pose;
                    true
                }
                None => false,
            },
            _ => false,
        };

        tracing::trace!(visible = self.anchor.visible, "anchor updated");
        self.anchor
    }

    pub fn current_anchor(&self) -> AnchorPose {
        self.anchor
    }

    pub fn query_source_state(&self) -> QuerySourceState {
        match &self.slot {
            Slot::Unrequested => QuerySourceState::Unrequested,
            Slot::Pending(_) => QuerySourceState::Pending,
            Slot::Ready(source) => QuerySourceState::Ready(*source),
            Slot::Unavailable => QuerySourceState::Unavailable,
        }
    }

    /// Stamp an entity at the anchor position. Rejected while the anchor is
    /// hidden rather than snapping to a stale pose.
    pub fn place<R: Rng + ?Sized>(
        &self,
        asset: &AssetReference,
        uniform_scale: f32,
        rng: &mut R,
    ) -> Result<PlacedEntity, PlacementError> {
        if !self.anchor.visible {
            return Err(PlacementError::NotVisible);
        }
        Ok(PlacedEntity::stamp(
            asset.clone(),
            self.anchor.pose.position,
            uniform_scale,
            rng,
        ))
    }

    /// Forget the query source and anchor, ready for a new tracking session.
    pub fn reset(&mut self) {
        self.slot = Slot::Unrequested;
        self.anchor = AnchorPose::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Intersection;
    use crate::scripted::{HitTestBehavior, ScriptedFrame, ScriptedOracle};
    use glam::{Quat, Vec3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn oracle(behavior: HitTestBehavior) -> ScriptedOracle {
        ScriptedOracle::new().with_hit_test(behavior)
    }

    #[test]
    fn requests_query_source_exactly_once() {
        let mut oracle = oracle(HitTestBehavior::Immediate);
        let mut tracker = SurfaceTracker::new();
        assert_eq!(tracker.query_source_state(), QuerySourceState::Unrequested);
        for _ in 0..10 {
            tracker.update(&mut oracle, &ScriptedFrame::empty());
        }
        assert_eq!(oracle.request_count(), 1);
        assert!(matches!(
            tracker.query_source_state(),
            QuerySourceState::Ready(_)
        ));
    }

    #[test]
    fn anchor_appears_on_fourth_frame() {
        let mut oracle = oracle(HitTestBehavior::Immediate);
        let mut tracker = SurfaceTracker::new();
        for _ in 0..3 {
            assert!(!tracker.update(&mut oracle, &ScriptedFrame::empty()).visible);
        }
        let target = Vec3::new(0.3, 0.0, -0.8);
        let anchor = tracker.update(&mut oracle, &ScriptedFrame::hit(target));
        assert!(anchor.visible);
        assert_eq!(anchor.pose.position, target);

        let mut rng = StdRng::seed_from_u64(1);
        let entity = tracker.place(&AssetReference::cube(), 1.0, &mut rng).unwrap();
        assert_eq!(entity.position(), target);
    }

    #[test]
    fn nearest_intersection_wins_and_orientation_is_verbatim() {
        let mut oracle = oracle(HitTestBehavior::Immediate);
        let mut tracker = SurfaceTracker::new();
        let tilted = Quat::from_rotation_x(0.2);
        let frame = ScriptedFrame::with_intersections(vec![
            Intersection {
                pose: Pose::new(Vec3::new(0.0, 0.0, -1.0), tilted),
            },
            Intersection {
                pose: Pose::at(Vec3::new(0.0, 0.0, -3.0)),
            },
        ]);
        let anchor = tracker.update(&mut oracle, &frame);
        assert_eq!(anchor.pose.position, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(anchor.pose.orientation, tilted);
    }

    #[test]
    fn losing_the_surface_hides_but_keeps_the_pose() {
        let mut oracle = oracle(HitTestBehavior::Immediate);
        let mut tracker = SurfaceTracker::new();
        tracker.update(&mut oracle, &ScriptedFrame::hit(Vec3::X));
        let anchor = tracker.update(&mut oracle, &ScriptedFrame::empty());
        assert!(!anchor.visible);
        assert_eq!(anchor.pose.position, Vec3::X);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            tracker.place(&AssetReference::cube(), 1.0, &mut rng),
            Err(PlacementError::NotVisible)
        );
    }

    #[test]
    fn unsupported_hit_test_is_not_retried() {
        let mut oracle = oracle(HitTestBehavior::Unsupported);
        let mut tracker = SurfaceTracker::new();
        for _ in 0..5 {
            let anchor = tracker.update(&mut oracle, &ScriptedFrame::hit(Vec3::ONE));
            assert!(!anchor.visible);
        }
        assert_eq!(oracle.request_count(), 1);
        assert_eq!(tracker.query_source_state(), QuerySourceState::Unavailable);
    }

    #[test]
    fn abandoned_request_degrades_to_no_anchor() {
        let mut oracle = oracle(HitTestBehavior::Dropped);
        let mut tracker = SurfaceTracker::new();
        tracker.update(&mut oracle, &ScriptedFrame::hit(Vec3::ONE));
        tracker.update(&mut oracle, &ScriptedFrame::hit(Vec3::ONE));
        assert_eq!(tracker.query_source_state(), QuerySourceState::Unavailable);
        assert_eq!(oracle.request_count(), 1);
    }

    #[test]
    fn deferred_source_is_picked_up_when_resolved() {
        let mut oracle = oracle(HitTestBehavior::Deferred);
        let mut tracker = SurfaceTracker::new();
        let frame = ScriptedFrame::hit(Vec3::Z);

        assert!(!tracker.update(&mut oracle, &frame).visible);
        assert!(!tracker.update(&mut oracle, &frame).visible);
        assert_eq!(tracker.query_source_state(), QuerySourceState::Pending);

        assert!(oracle.resolve_pending());
        assert!(tracker.update(&mut oracle, &frame).visible);
        assert_eq!(oracle.request_count(), 1);
    }

    #[test]
    fn reset_allows_a_new_request() {
        let mut oracle = oracle(HitTestBehavior::Unsupported);
        let mut tracker = SurfaceTracker::new();
        tracker.update(&mut oracle, &ScriptedFrame::empty());
        tracker.reset();
        assert_eq!(tracker.query_source_state(), QuerySourceState::Unrequested);
        assert!(!tracker.current_anchor().visible);
        tracker.update(&mut oracle, &ScriptedFrame::empty());
        assert_eq!(oracle.request_count(), 2);
    }
}
