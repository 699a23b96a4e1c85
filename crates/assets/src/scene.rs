use arplace_common::{Aabb, Transform};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A minimal shading material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    /// Opaque white, assigned to surfaces that arrive without a material.
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// One triangle mesh inside a scene node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshSurface {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshSurface {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            indices,
            ..Self::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A node in a decoded asset's scene graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub surfaces: Vec<MeshSurface>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_surface(mut self, surface: MeshSurface) -> Self {
        self.surfaces.push(surface);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Bounding box of every surface vertex, with this node's own transform
    /// and all descendant transforms applied. `None` when there are no
    /// vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut out = None;
        self.accumulate_bounds(Mat4::IDENTITY, &mut out);
        out
    }

    fn accumulate_bounds(&self, parent: Mat4, out: &mut Option<Aabb>) {
        let m = parent * self.transform.matrix();
        for surface in &self.surfaces {
            for p in &surface.positions {
                let q = m.transform_point3(*p);
                match out {
                    Some(aabb) => aabb.extend(q),
                    None => *out = Aabb::from_points([q]),
                }
            }
        }
        for child in &self.children {
            child.accumulate_bounds(m, out);
        }
    }

    /// Visit every surface in this subtree, depth first.
    pub fn for_each_surface_mut(&mut self, f: &mut impl FnMut(&mut MeshSurface)) {
        for surface in &mut self.surfaces {
            f(surface);
        }
        for child in &mut self.children {
            child.for_each_surface_mut(f);
        }
    }

    pub fn for_each_surface(&self, f: &mut impl FnMut(&MeshSurface)) {
        for surface in &self.surfaces {
            f(surface);
        }
        for child in &self.children {
            child.for_each_surface(f);
        }
    }

    pub fn surface_count(&self) -> usize {
        let mut n = 0;
        self.for_each_surface(&mut |_| n += 1);
        n
    }
}

/// A decoded asset before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAsset {
    /// Single-mesh formats: the asset is its own renderable root.
    Mesh(SceneNode),
    /// Container formats: the renderable root is a nested scene.
    Container {
        scenes: Vec<SceneNode>,
        default_scene: usize,
    },
}

impl RawAsset {
    /// Select the node to place: the asset itself, or the container's default
    /// scene. `None` for a container without scenes.
    pub fn renderable_root(&self) -> Option<&SceneNode> {
        match self {
            Self::Mesh(node) => Some(node),
            Self::Container {
                scenes,
                default_scene,
            } => scenes.get(*default_scene),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> MeshSurface {
        MeshSurface::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn bounds_apply_nested_transforms() {
        let child = SceneNode {
            transform: Transform {
                position: Vec3::new(10.0, 0.0, 0.0),
                ..Transform::default()
            },
            ..SceneNode::new("child")
        }
        .with_surface(unit_triangle());
        let mut root = SceneNode::new("root").with_child(child);
        root.transform.scale = Vec3::splat(2.0);

        let aabb = root.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(22.0, 2.0, 0.0));
    }

    #[test]
    fn empty_node_has_no_bounds() {
        assert!(SceneNode::new("empty").bounds().is_none());
    }

    #[test]
    fn surface_traversal_reaches_descendants() {
        let mut root = SceneNode::new("root")
            .with_surface(unit_triangle())
            .with_child(SceneNode::new("a").with_surface(unit_triangle()))
            .with_child(
                SceneNode::new("b").with_child(SceneNode::new("c").with_surface(unit_triangle())),
            );
        assert_eq!(root.surface_count(), 3);

        root.for_each_surface_mut(&mut |s| s.cast_shadow = true);
        let mut all = true;
        root.for_each_surface(&mut |s| all &= s.cast_shadow);
        assert!(all);
    }

    #[test]
    fn container_root_is_default_scene() {
        let asset = RawAsset::Container {
            scenes: vec![SceneNode::new("first"), SceneNode::new("second")],
            default_scene: 1,
        };
        assert_eq!(asset.renderable_root().unwrap().name, "second");

        let empty = RawAsset::Container {
            scenes: Vec::new(),
            default_scene: 0,
        };
        assert!(empty.renderable_root().is_none());
    }

    #[test]
    fn default_material_is_opaque_white() {
        let m = Material::default();
        assert_eq!(m.base_color, [1.0, 1.0, 1.0, 1.0]);
    }
}
