use crate::renderer::{DrawItem, DrawKind, SceneView};
use arplace_assets::{AssetCache, AssetSource, NormalizeConfig};
use arplace_common::{EntityId, PlacedEntity};
use arplace_session::PlacementSession;
use arplace_tracking::TrackingOracle;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Edge length of the built-in cube.
pub const PRIMITIVE_SIZE: f32 = 0.2;

/// Turns the session's entity list into draw items, loading and normalizing
/// assets on demand. Each entity gets its own normalized copy, resolved once
/// and kept until the entity leaves the session.
#[derive(Debug, Default)]
pub struct FrameComposer {
    cache: AssetCache,
    normalize: NormalizeConfig,
    resolved: BTreeMap<EntityId, DrawKind>,
}

impl FrameComposer {
    pub fn new(normalize: NormalizeConfig) -> Self {
        Self {
            cache: AssetCache::new(),
            normalize,
            resolved: BTreeMap::new(),
        }
    }

    /// Snapshot the session for one frame.
    pub fn compose<O: TrackingOracle>(&mut self, session: &PlacementSession<O>) -> SceneView {
        let live: BTreeSet<EntityId> = session.entities().iter().map(|e| e.id()).collect();
        self.resolved.retain(|id, _| live.contains(id));

        let items = session
            .entities()
            .iter()
            .map(|entity| self.draw_item(session.store(), entity))
            .collect::<Vec<_>>();
        tracing::trace!(items = items.len(), "frame composed");
        SceneView {
            mode: session.mode(),
            status: session.status(),
            anchor: session.anchor(),
            items,
        }
    }

    pub fn draw_item(&mut self, source: &dyn AssetSource, entity: &PlacedEntity) -> DrawItem {
        let kind = match self.resolved.get(&entity.id()) {
            Some(kind) => kind.clone(),
            None => {
                let kind = self.resolve(source, entity);
                self.resolved.insert(entity.id(), kind.clone());
                kind
            }
        };
        DrawItem {
            entity: entity.id(),
            world: entity.transform().matrix(),
            kind,
        }
    }

    /// Distinct assets loaded so far, failures included.
    pub fn cached_assets(&self) -> usize {
        self.cache.len()
    }

    /// Entities whose draw kind is currently held.
    pub fn resolved_entities(&self) -> usize {
        self.resolved.len()
    }

    fn resolve(&mut self, source: &dyn AssetSource, entity: &PlacedEntity) -> DrawKind {
        let asset = entity.asset();
        if !asset.needs_loading() {
            return DrawKind::Primitive {
                size: PRIMITIVE_SIZE,
                color: color_for(entity.id()),
            };
        }
        match self.cache.resolve(source, asset, &self.normalize) {
            Ok(model) => DrawKind::Model(Arc::new(model)),
            Err(error) => DrawKind::Placeholder {
                reason: error.to_string(),
            },
        }
    }
}

/// Stable, fairly bright colour derived from the entity id.
fn color_for(id: EntityId) -> [f32; 4] {
    let bytes = id.0.as_bytes();
    let channel = |b: u8| 0.3 + 0.7 * f32::from(b) / 255.0;
    [channel(bytes[0]), channel(bytes[1]), channel(bytes[2]), 1.0]
}
