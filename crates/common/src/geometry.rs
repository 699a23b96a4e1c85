use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Ray/plane denominators below this magnitude count as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// A rigid pose: position plus orientation, as reported by the tracking oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose with identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// A pointing ray. The direction need not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Horizontal virtual ground used when no real surface tracking is available.
///
/// The plane has its normal along +Y at `height` and is bounded to a square of
/// `half_extent` around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundPlane {
    pub height: f32,
    pub half_extent: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            height: 0.0,
            half_extent: 50.0,
        }
    }
}

impl GroundPlane {
    /// Intersect a ray with the plane.
    ///
    /// Returns `None` when the ray is (nearly) parallel to the plane, points away
    /// from it, or lands outside the bounded extent.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.y;
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.height - ray.origin.y) / denom;
        if t < 0.0 {
            return None;
        }
        let hit = ray.point_at(t);
        if !hit.is_finite() {
            return None;
        }
        if hit.x.abs() > self.half_extent || hit.z.abs() > self.half_extent {
            return None;
        }
        Some(hit)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing all points, or `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.extend(p);
        }
        Some(aabb)
    }

    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Largest extent across the three axes.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }
}
