use crate::collab::{
    ANALYSIS_FAILED, CaptureError, CaptureTarget, CapturedFrame, EnvCredential, SceneDescriber,
    describe_scene,
};
use crate::config::SessionConfig;
use crate::mode::SessionMode;
use crate::status::{Status, StatusLine};
use arplace_assets::{AssetLibrary, AssetStore};
use arplace_common::{AssetReference, EntityId, PlacedEntity, Ray};
use arplace_input::Action;
use arplace_tracking::{
    AnchorPose, PlacementError, QuerySourceState, SessionFeatures, SurfaceTracker,
    TrackingOracle,
};
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A change to session state. Appended for every mutation so observers can
/// follow the session without polling it.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ModeChanged { from: SessionMode, to: SessionMode },
    AssetUploaded(AssetReference),
    AssetSelected(AssetReference),
    EntityPlaced { id: EntityId, position: Vec3 },
    SceneCleared { removed: usize },
    StatusChanged(Status),
}

/// Result of applying one [`Action`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Mode(SessionMode),
    Uploaded(AssetReference),
    Selected(AssetReference),
    Placed(PlacedEntity),
    Rejected(PlacementError),
    Cleared(usize),
    Captured(CapturedFrame),
    CaptureFailed(CaptureError),
}

/// The placement state machine and the authoritative entity collection.
///
/// `Menu` is initial. Entering goes to `Tracking` when the oracle supports it
/// and the session starts, otherwise to `Simulation`. A tracking session that
/// ends returns to `Menu`. The session is the only writer of the entity list.
#[derive(Debug)]
pub struct PlacementSession<O: TrackingOracle> {
    config: SessionConfig,
    oracle: O,
    mode: SessionMode,
    tracker: SurfaceTracker,
    library: AssetLibrary,
    store: AssetStore,
    entities: Vec<PlacedEntity>,
    status: StatusLine,
    rng: StdRng,
    events: Vec<SessionEvent>,
}

impl<O: TrackingOracle> PlacementSession<O> {
    pub fn new(oracle: O, config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            status: StatusLine::new(config.status_hold_frames),
            config,
            oracle,
            mode: SessionMode::Menu,
            tracker: SurfaceTracker::new(),
            library: AssetLibrary::new(),
            store: AssetStore::new(),
            entities: Vec::new(),
            rng,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Placed entities in placement order.
    pub fn entities(&self) -> &[PlacedEntity] {
        &self.entities
    }

    pub fn active_asset(&self) -> &AssetReference {
        self.library.active()
    }

    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    /// Backing store for uploaded assets; the source renderers load from.
    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn status(&self) -> Status {
        self.status.current()
    }

    pub fn anchor(&self) -> AnchorPose {
        self.tracker.current_anchor()
    }

    pub fn query_source_state(&self) -> QuerySourceState {
        self.tracker.query_source_state()
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Leave the menu. Never fails: any tracking problem degrades to
    /// simulation. A no-op when a session is already running.
    pub fn enter_session(&mut self) -> SessionMode {
        if self.mode.is_playing() {
            tracing::debug!(mode = %self.mode, "enter ignored, session already running");
            return self.mode;
        }

        if !self.oracle.is_tracking_supported() {
            tracing::warn!("tracking not supported, falling back to simulation");
            self.set_mode(SessionMode::Simulation);
            self.update_status(|line| line.set_base(Status::Simulation));
            return self.mode;
        }

        match self
            .oracle
            .begin_tracking_session(&SessionFeatures::placement())
        {
            Ok(()) => {
                self.tracker.reset();
                self.set_mode(SessionMode::Tracking);
                self.update_status(|line| line.set_base(Status::DetectingSurface));
            }
            Err(error) => {
                tracing::error!(%error, "tracking session failed to start");
                self.set_mode(SessionMode::Simulation);
                self.update_status(|line| {
                    line.set_base(Status::Simulation);
                    line.flash(Status::TrackingFailed);
                });
            }
        }
        self.mode
    }

    /// Return to the menu, ending a live tracking session. Placed entities
    /// are kept.
    pub fn exit_session(&mut self) -> SessionMode {
        match self.mode {
            SessionMode::Menu => {}
            SessionMode::Tracking => {
                self.oracle.end_tracking_session();
                self.tracker.reset();
                self.return_to_menu();
            }
            SessionMode::Simulation => self.return_to_menu(),
        }
        self.mode
    }

    /// Advance one frame: age the status line and, while tracking, refresh
    /// the anchor. Detects a tracking session ended by the device.
    pub fn update(&mut self, frame: &O::Frame) -> AnchorPose {
        let _span = tracing::info_span!("session_update", mode = %self.mode).entered();
        self.update_status(StatusLine::tick);

        if self.mode != SessionMode::Tracking {
            return self.tracker.current_anchor();
        }

        if !self.oracle.is_session_active() {
            tracing::info!("tracking session ended");
            self.tracker.reset();
            self.return_to_menu();
            return self.tracker.current_anchor();
        }

        let anchor = self.tracker.update(&mut self.oracle, frame);
        let base = if anchor.visible {
            Status::TrackingActive
        } else {
            Status::DetectingSurface
        };
        self.update_status(|line| line.set_base(base));
        anchor
    }

    /// Place the active asset. Tracking stamps at the current anchor;
    /// simulation casts `pointer` against the virtual ground.
    pub fn place_active(&mut self, pointer: Option<Ray>) -> Result<PlacedEntity, PlacementError> {
        let asset = self.library.active().clone();
        let scale = self.config.entity_scale;
        let placed = match self.mode {
            SessionMode::Menu => Err(PlacementError::NotPlaying),
            SessionMode::Tracking => self.tracker.place(&asset, scale, &mut self.rng),
            SessionMode::Simulation => pointer
                .and_then(|ray| self.config.ground.intersect(&ray))
                .map(|hit| PlacedEntity::stamp(asset, hit, scale, &mut self.rng))
                .ok_or(PlacementError::NotVisible),
        };

        match placed {
            Ok(entity) => {
                tracing::debug!(
                    id = %entity.id(),
                    asset = entity.asset().display_name(),
                    position = ?entity.position(),
                    "entity placed"
                );
                self.events.push(SessionEvent::EntityPlaced {
                    id: entity.id(),
                    position: entity.position(),
                });
                self.entities.push(entity.clone());
                Ok(entity)
            }
            Err(error) => {
                tracing::debug!(%error, mode = %self.mode, "placement rejected");
                Err(error)
            }
        }
    }

    /// Drop every placed entity. The mode is unchanged.
    pub fn reset(&mut self) -> usize {
        let removed = self.entities.len();
        self.entities.clear();
        tracing::info!(removed, "scene cleared");
        self.events.push(SessionEvent::SceneCleared { removed });
        self.update_status(|line| line.flash(Status::SceneCleared));
        removed
    }

    /// Make `reference` the active asset for future placements.
    pub fn select_asset(&mut self, reference: AssetReference) {
        self.library.select(reference.clone());
        self.events.push(SessionEvent::AssetSelected(reference));
    }

    /// Store uploaded bytes, register the asset and make it active.
    pub fn upload_asset(&mut self, bytes: Vec<u8>, filename: &str) -> AssetReference {
        let reference = self.store.upload(bytes, filename);
        tracing::info!(
            asset = reference.display_name(),
            kind = %reference.kind(),
            location = reference.source_location(),
            "asset uploaded"
        );
        self.library.add(reference.clone());
        self.events.push(SessionEvent::AssetUploaded(reference.clone()));
        reference
    }

    /// Take the current frame from `target`.
    pub fn capture<C>(&mut self, target: &mut C) -> Result<CapturedFrame, CaptureError>
    where
        C: CaptureTarget + ?Sized,
    {
        let result = target.snapshot();
        match &result {
            Ok(frame) => {
                tracing::info!(bytes = frame.data.len(), media_type = %frame.media_type, "frame captured");
                self.update_status(|line| line.flash(Status::Captured));
            }
            Err(error) => {
                tracing::warn!(%error, "capture failed");
                self.update_status(|line| line.flash(Status::CaptureFailed));
            }
        }
        result
    }

    /// Describe the current frame with `describer`, using the API key from
    /// the configured environment variable. Always yields text for the user.
    pub fn describe_view<C, D>(&self, target: &mut C, describer: &D) -> String
    where
        C: CaptureTarget + ?Sized,
        D: SceneDescriber,
    {
        let frame = match target.snapshot() {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(%error, "no frame to describe");
                return ANALYSIS_FAILED.to_string();
            }
        };
        let credential = EnvCredential::new(self.config.describe_key_env.as_str());
        describe_scene(describer, &credential, &frame)
    }

    pub fn apply<C>(&mut self, action: Action, capture: &mut C) -> ActionOutcome
    where
        C: CaptureTarget + ?Sized,
    {
        match action {
            Action::EnterSession => ActionOutcome::Mode(self.enter_session()),
            Action::ExitSession => ActionOutcome::Mode(self.exit_session()),
            Action::Upload { bytes, filename } => {
                ActionOutcome::Uploaded(self.upload_asset(bytes, &filename))
            }
            Action::Select(reference) => {
                self.select_asset(reference.clone());
                ActionOutcome::Selected(reference)
            }
            Action::Place { ray } => match self.place_active(ray) {
                Ok(entity) => ActionOutcome::Placed(entity),
                Err(error) => ActionOutcome::Rejected(error),
            },
            Action::Reset => ActionOutcome::Cleared(self.reset()),
            Action::Capture => match self.capture(capture) {
                Ok(frame) => ActionOutcome::Captured(frame),
                Err(error) => ActionOutcome::CaptureFailed(error),
            },
        }
    }

    /// Run one frame: refresh the anchor, then apply `actions` in order so
    /// every gesture sees this frame's anchor.
    pub fn handle_frame<C, I>(
        &mut self,
        frame: &O::Frame,
        actions: I,
        capture: &mut C,
    ) -> Vec<ActionOutcome>
    where
        C: CaptureTarget + ?Sized,
        I: IntoIterator<Item = Action>,
    {
        self.update(frame);
        actions
            .into_iter()
            .map(|action| self.apply(action, capture))
            .collect()
    }

    pub fn events(&self) -> &[SessionEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_mode(&mut self, to: SessionMode) {
        let from = self.mode;
        if from == to {
            return;
        }
        tracing::info!(%from, %to, "mode changed");
        self.mode = to;
        self.events.push(SessionEvent::ModeChanged { from, to });
    }

    fn return_to_menu(&mut self) {
        self.set_mode(SessionMode::Menu);
        self.update_status(|line| line.set_base(Status::Menu));
    }

    fn update_status(&mut self, change: impl FnOnce(&mut StatusLine)) {
        let before = self.status.current();
        change(&mut self.status);
        let after = self.status.current();
        if after != before {
            tracing::debug!(status = %after, "status changed");
            self.events.push(SessionEvent::StatusChanged(after));
        }
    }
}
