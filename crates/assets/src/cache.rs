use crate::LoadError;
use crate::normalize::{NormalizeConfig, NormalizedEntity, normalize};
use crate::scene::RawAsset;
use crate::store::AssetSource;
use arplace_common::{AssetKind, AssetReference};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Memoized load results, keyed by location and kind.
///
/// Failures are cached too: an asset that failed once keeps showing its
/// placeholder instead of being reloaded every frame.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: BTreeMap<(String, AssetKind), Result<Arc<RawAsset>, LoadError>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load through the cache. The source is consulted at most once per key.
    pub fn get_or_load(
        &mut self,
        source: &dyn AssetSource,
        reference: &AssetReference,
    ) -> Result<Arc<RawAsset>, LoadError> {
        let key = (reference.source_location().to_string(), reference.kind());
        self.entries
            .entry(key)
            .or_insert_with(|| {
                let result = source
                    .load(reference.source_location(), reference.kind())
                    .map(Arc::new);
                if let Err(e) = &result {
                    tracing::warn!(
                        asset = reference.display_name(),
                        error = %e,
                        "asset failed to load"
                    );
                }
                result
            })
            .clone()
    }

    /// Load and normalize a fresh copy for one placed entity.
    pub fn resolve(
        &mut self,
        source: &dyn AssetSource,
        reference: &AssetReference,
        config: &NormalizeConfig,
    ) -> Result<NormalizedEntity, LoadError> {
        let raw = self.get_or_load(source, reference)?;
        Ok(normalize(&raw, reference.kind(), config))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshSurface, SceneNode};
    use glam::Vec3;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        fail: bool,
    }

    impl AssetSource for CountingSource {
        fn load(&self, location: &str, _kind: AssetKind) -> Result<RawAsset, LoadError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(LoadError::NotFound(location.to_string()));
            }
            Ok(RawAsset::Mesh(SceneNode::new("m").with_surface(MeshSurface::new(
                "s",
                vec![Vec3::ZERO, Vec3::splat(2.0)],
                Vec::new(),
            ))))
        }
    }

    fn reference() -> AssetReference {
        AssetReference::new("thing", "mem://thing", AssetKind::Obj)
    }

    #[test]
    fn loads_once_per_location() {
        let source = CountingSource {
            calls: Cell::new(0),
            fail: false,
        };
        let mut cache = AssetCache::new();
        let a = cache.get_or_load(&source, &reference()).unwrap();
        let b = cache.get_or_load(&source, &reference()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failures_are_remembered() {
        let source = CountingSource {
            calls: Cell::new(0),
            fail: true,
        };
        let mut cache = AssetCache::new();
        assert!(cache.get_or_load(&source, &reference()).is_err());
        assert!(cache.get_or_load(&source, &reference()).is_err());
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn resolved_entities_do_not_share_geometry() {
        let source = CountingSource {
            calls: Cell::new(0),
            fail: false,
        };
        let mut cache = AssetCache::new();
        let config = NormalizeConfig::default();
        let mut first = cache.resolve(&source, &reference(), &config).unwrap();
        let second = cache.resolve(&source, &reference(), &config).unwrap();

        first.root.transform.position = Vec3::new(9.0, 9.0, 9.0);
        first.root.surfaces[0].positions[0] = Vec3::splat(-5.0);

        assert_eq!(second.root.transform.position, Vec3::ZERO);
        assert_eq!(second.root.surfaces[0].positions[0], Vec3::ZERO);
        let cached = cache.get_or_load(&source, &reference()).unwrap();
        assert_eq!(
            cached.renderable_root().unwrap().surfaces[0].positions[0],
            Vec3::ZERO
        );
    }
}
