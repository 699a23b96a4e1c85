use crate::scene::{Material, RawAsset, SceneNode};
use arplace_common::{Aabb, AssetKind};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameters of the normalization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Largest extent, in world units, of every normalized asset.
    pub target_size: f32,
    /// Corrective scale applied to FBX roots before the bounding-box fit.
    /// FBX content is conventionally authored in centimeters.
    pub fbx_prescale: f32,
    /// Material given to surfaces that arrive without one.
    pub default_material: Material,
    /// Move the fitted asset so its base sits on the origin, centered on X/Z.
    pub recenter: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_size: 0.5,
            fbx_prescale: 0.01,
            default_material: Material::default(),
            recenter: false,
        }
    }
}

impl NormalizeConfig {
    pub fn prescale_for(&self, kind: AssetKind) -> f32 {
        match kind {
            AssetKind::Fbx => self.fbx_prescale,
            AssetKind::Obj | AssetKind::Primitive => 1.0,
        }
    }
}

/// A placeable, independently owned copy of an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEntity {
    pub root: SceneNode,
    /// Uniform factor applied by the bounding-box fit (1.0 when skipped).
    pub scale_factor: f32,
    /// Bounds after the format pre-scale, before the fit.
    pub source_bounds: Option<Aabb>,
}

impl NormalizedEntity {
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.bounds()
    }
}

/// Normalize a fresh copy of `asset`.
///
/// 1. select the renderable root (container scene or the asset itself)
/// 2. apply the format pre-scale
/// 3. fit the largest bounding dimension to `target_size`; degenerate assets
///    (largest dimension zero) keep scale 1
/// 4. give material-less surfaces the default material
/// 5. make every surface cast and receive shadows
pub fn normalize(asset: &RawAsset, kind: AssetKind, config: &NormalizeConfig) -> NormalizedEntity {
    let mut root = asset
        .renderable_root()
        .cloned()
        .unwrap_or_else(|| SceneNode::new("empty"));

    root.transform.scale *= config.prescale_for(kind);

    let source_bounds = root.bounds();
    let max_dimension = source_bounds.map_or(0.0, |b| b.max_dimension());
    let scale_factor = if max_dimension > 0.0 {
        config.target_size / max_dimension
    } else {
        1.0
    };
    root.transform.scale *= scale_factor;

    if config.recenter {
        if let Some(fitted) = root.bounds() {
            let center = fitted.center();
            root.transform.position -= Vec3::new(center.x, fitted.min.y, center.z);
        }
    }

    let mut defaulted = 0usize;
    root.for_each_surface_mut(&mut |surface| {
        if surface.material.is_none() {
            surface.material = Some(config.default_material.clone());
            defaulted += 1;
        }
        surface.cast_shadow = true;
        surface.receive_shadow = true;
    });

    tracing::debug!(
        %kind,
        max_dimension,
        scale_factor,
        defaulted_materials = defaulted,
        "normalized asset"
    );

    NormalizedEntity {
        root,
        scale_factor,
        source_bounds,
    }
}
