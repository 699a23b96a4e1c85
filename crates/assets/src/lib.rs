//! Asset pipeline for placeable objects.
//!
//! An [`AssetReference`] names a placeable kind. Uploaded bytes live in the
//! content-addressed [`AssetStore`]; decoders turn them into a [`RawAsset`]
//! scene graph, and [`normalize`] produces a fresh, unit-consistent copy per
//! placed entity.
//!
//! # Invariants
//! - References are immutable once created.
//! - Normalization never mutates the cached raw asset.
//! - A failed load is remembered; the caller shows a placeholder.

mod cache;
pub mod fbx;
mod library;
mod normalize;
pub mod obj;
mod scene;
mod store;

pub use arplace_common::{AssetKind, AssetReference};
pub use cache::AssetCache;
pub use library::AssetLibrary;
pub use normalize::{NormalizeConfig, NormalizedEntity, normalize};
pub use scene::{Material, MeshSurface, RawAsset, SceneNode};
pub use store::{AssetSource, AssetStore, MEM_SCHEME, decode};

/// Errors from loading or decoding an asset.
///
/// `Clone` so that failures can be cached alongside successes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("IO error reading {location}: {message}")]
    Io { location: String, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported asset: {0}")]
    Unsupported(String),
}
