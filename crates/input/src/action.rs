use arplace_common::{AssetReference, Ray};

/// A high-level action produced by whichever surface the user interacts with.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Leave the menu for live tracking, or simulation when tracking is
    /// unavailable.
    EnterSession,
    /// Return to the menu.
    ExitSession,
    /// Add an asset from uploaded bytes and make it active.
    Upload { bytes: Vec<u8>, filename: String },
    /// Make an already known asset active.
    Select(AssetReference),
    /// Place the active asset. Tracking uses the anchor; simulation needs the
    /// pointing ray.
    Place { ray: Option<Ray> },
    /// Clear every placed entity.
    Reset,
    /// Take the current frame.
    Capture,
}

impl Action {
    /// Place against the tracked anchor.
    pub fn place() -> Self {
        Self::Place { ray: None }
    }

    /// Place where `ray` meets the simulation ground.
    pub fn place_along(ray: Ray) -> Self {
        Self::Place { ray: Some(ray) }
    }

    pub fn upload(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self::Upload {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }
}
