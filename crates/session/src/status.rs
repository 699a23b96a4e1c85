use serde::{Deserialize, Serialize};

/// Short human-readable status token. Observational only; no control decision
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Menu,
    DetectingSurface,
    TrackingActive,
    Simulation,
    TrackingFailed,
    Captured,
    CaptureFailed,
    SceneCleared,
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Menu => "Ready",
            Self::DetectingSurface => "Detecting floor...",
            Self::TrackingActive => "Surface found",
            Self::Simulation => "3D Simulation Mode",
            Self::TrackingFailed => "AR Failed - Switched to Simulation",
            Self::Captured => "Photo saved!",
            Self::CaptureFailed => "Capture failed.",
            Self::SceneCleared => "Scene cleared",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A base status driven by mode and anchor, overlaid by short-lived messages
/// that revert after a fixed number of frames.
#[derive(Debug, Clone)]
pub struct StatusLine {
    base: Status,
    transient: Option<(Status, u32)>,
    hold_frames: u32,
}

impl StatusLine {
    pub fn new(hold_frames: u32) -> Self {
        Self {
            base: Status::Menu,
            transient: None,
            hold_frames,
        }
    }

    pub fn current(&self) -> Status {
        self.transient.map_or(self.base, |(status, _)| status)
    }

    pub fn base(&self) -> Status {
        self.base
    }

    pub fn set_base(&mut self, status: Status) {
        self.base = status;
    }

    /// Show `status` for the hold period, then fall back to the base.
    pub fn flash(&mut self, status: Status) {
        self.transient = Some((status, self.hold_frames));
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        let expired = match &mut self.transient {
            Some((_, remaining)) if *remaining > 1 => {
                *remaining -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.transient = None;
        }
    }
}
