//! Shared value types for the placement core: identities, asset references,
//! placed entities, transforms, poses, rays and bounding boxes.

mod entity;
mod geometry;
mod reference;
mod types;

pub use entity::PlacedEntity;
pub use geometry::{Aabb, GroundPlane, PARALLEL_EPSILON, Pose, Ray};
pub use reference::{AssetKind, AssetReference};
pub use types::{EntityId, Transform};
