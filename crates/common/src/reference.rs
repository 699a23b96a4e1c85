use serde::{Deserialize, Serialize};

/// How a placeable asset is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Built-in cube, drawn without any source data.
    Primitive,
    /// Wavefront OBJ, a single-mesh text format.
    Obj,
    /// Binary FBX, a container format usually authored in centimeters.
    Fbx,
}

impl AssetKind {
    /// Infer the kind from a file name's extension. Unknown extensions map to
    /// `Primitive`.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("obj") => Self::Obj,
            Some("fbx") => Self::Fbx,
            _ => Self::Primitive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Obj => "obj",
            Self::Fbx => "fbx",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes a placeable kind. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    display_name: String,
    source_location: String,
    kind: AssetKind,
}

impl AssetReference {
    pub fn new(
        display_name: impl Into<String>,
        source_location: impl Into<String>,
        kind: AssetKind,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            source_location: source_location.into(),
            kind,
        }
    }

    /// The built-in cube that is active when a session starts.
    pub fn cube() -> Self {
        Self::new("Cube", "", AssetKind::Primitive)
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Opaque location handle; empty for the built-in primitive.
    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// True when the renderer must load and normalize source data.
    pub fn needs_loading(&self) -> bool {
        self.kind != AssetKind::Primitive && !self.source_location.is_empty()
    }
}
