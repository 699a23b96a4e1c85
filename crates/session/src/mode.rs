use serde::{Deserialize, Serialize};

/// Which embodiment the session is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Start screen; nothing is tracked or placed.
    Menu,
    /// Live spatial tracking against real surfaces.
    Tracking,
    /// Fallback with a virtual ground plane standing in for the real surface.
    Simulation,
}

impl SessionMode {
    /// True when placement gestures are accepted.
    pub fn is_playing(&self) -> bool {
        !matches!(self, Self::Menu)
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Menu => "menu",
            Self::Tracking => "tracking",
            Self::Simulation => "simulation",
        };
        f.write_str(s)
    }
}
