use crate::LoadError;
use crate::scene::RawAsset;
use crate::{fbx, obj};
use arplace_common::{AssetKind, AssetReference};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Location scheme for uploads held in memory.
pub const MEM_SCHEME: &str = "mem://";

/// Longest display name kept for an upload.
const DISPLAY_NAME_CHARS: usize = 8;

/// Anything that can produce a decoded asset for a location handle.
pub trait AssetSource {
    fn load(&self, location: &str, kind: AssetKind) -> Result<RawAsset, LoadError>;
}

/// Decode raw bytes according to the asset kind.
pub fn decode(kind: AssetKind, bytes: &[u8]) -> Result<RawAsset, LoadError> {
    match kind {
        AssetKind::Obj => obj::decode(bytes),
        AssetKind::Fbx => fbx::decode(bytes),
        AssetKind::Primitive => Err(LoadError::Unsupported(
            "primitive assets have no source data".into(),
        )),
    }
}

/// Content-addressed store for uploaded asset bytes.
///
/// Uploads are keyed by the SHA-256 of their content, so the same file
/// uploaded twice shares one entry. Locations outside the `mem://` scheme are
/// read from the file system.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    uploads: BTreeMap<String, Vec<u8>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store uploaded bytes and describe them as a placeable reference.
    ///
    /// The kind comes from the file extension; the display name is the first
    /// eight characters of the file name.
    pub fn upload(&mut self, bytes: Vec<u8>, filename: &str) -> AssetReference {
        let location = format!("{MEM_SCHEME}{}", content_hash(&bytes));
        let kind = AssetKind::from_filename(filename);
        let display_name: String = filename.chars().take(DISPLAY_NAME_CHARS).collect();
        tracing::debug!(%location, %kind, size = bytes.len(), "stored upload");
        self.uploads.insert(location.clone(), bytes);
        AssetReference::new(display_name, location, kind)
    }

    /// Raw bytes behind a location handle.
    pub fn read(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        if location.starts_with(MEM_SCHEME) {
            return self
                .uploads
                .get(location)
                .cloned()
                .ok_or_else(|| LoadError::NotFound(location.to_string()));
        }
        std::fs::read(location).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound(location.to_string()),
            _ => LoadError::Io {
                location: location.to_string(),
                message: e.to_string(),
            },
        })
    }

    /// Number of stored uploads.
    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

impl AssetSource for AssetStore {
    fn load(&self, location: &str, kind: AssetKind) -> Result<RawAsset, LoadError> {
        let bytes = self.read(location)?;
        decode(kind, &bytes)
    }
}

fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
