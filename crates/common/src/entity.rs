use crate::reference::AssetReference;
use crate::types::{EntityId, Transform};
use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A user-placed object. Its transform is frozen at creation; the only way
/// it changes is by being cleared with the rest of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    id: EntityId,
    asset: AssetReference,
    position: Vec3,
    orientation_angle: f32,
    uniform_scale: f32,
}

impl PlacedEntity {
    /// Stamp a new entity at `position` with a fresh id and a uniformly
    /// random yaw in `[0, 2π)`.
    pub fn stamp<R: Rng + ?Sized>(
        asset: AssetReference,
        position: Vec3,
        uniform_scale: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            id: EntityId::new(),
            asset,
            position,
            orientation_angle: rng.gen_range(0.0..TAU),
            uniform_scale,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Copy of the asset reference that was active at placement time.
    pub fn asset(&self) -> &AssetReference {
        &self.asset
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation about the vertical axis, in radians.
    pub fn orientation_angle(&self) -> f32 {
        self.orientation_angle
    }

    pub fn uniform_scale(&self) -> f32 {
        self.uniform_scale
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: Quat::from_rotation_y(self.orientation_angle),
            scale: Vec3::splat(self.uniform_scale),
        }
    }
}
