//! Wavefront OBJ decoding.

use crate::LoadError;
use crate::scene::{MeshSurface, RawAsset, SceneNode};
use glam::Vec3;

/// Decode OBJ text into a single-mesh asset, one surface per object/group.
///
/// Material libraries are not resolved, so every surface arrives without a
/// material.
pub fn decode(bytes: &[u8]) -> Result<RawAsset, LoadError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| LoadError::Parse(format!("OBJ is not valid UTF-8: {e}")))?;

    let (models, _materials) = tobj::load_obj_buf(
        &mut std::io::Cursor::new(text.as_bytes()),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .map_err(|e| LoadError::Parse(format!("OBJ: {e}")))?;

    let mut root = SceneNode::new("obj");
    for model in models {
        let positions = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect();
        root.surfaces
            .push(MeshSurface::new(model.name, positions, model.mesh.indices));
    }

    tracing::debug!(surfaces = root.surfaces.len(), "decoded OBJ");
    Ok(RawAsset::Mesh(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE: &str = "\
o cube
v -1.0 -1.0 -1.0
v  1.0 -1.0 -1.0
v  1.0  1.0 -1.0
v -1.0  1.0 -1.0
v -1.0 -1.0  1.0
v  1.0 -1.0  1.0
v  1.0  1.0  1.0
v -1.0  1.0  1.0
f 1 2 3 4
f 5 6 7 8
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
";

    #[test]
    fn decodes_cube() {
        let asset = decode(CUBE.as_bytes()).unwrap();
        let root = asset.renderable_root().unwrap();
        assert_eq!(root.surfaces.len(), 1);

        let surface = &root.surfaces[0];
        assert_eq!(surface.triangle_count(), 12);
        assert!(surface.material.is_none());

        let aabb = root.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::splat(-1.0));
        assert_eq!(aabb.max, Vec3::splat(1.0));
    }

    #[test]
    fn rejects_binary_garbage() {
        let err = decode(&[0xff, 0xfe, 0x00, 0x80]).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
