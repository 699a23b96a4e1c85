use arplace_assets::NormalizedEntity;
use arplace_common::EntityId;
use arplace_session::{SessionMode, Status};
use arplace_tracking::AnchorPose;
use glam::{Mat4, Vec3};
use std::fmt::Write;
use std::sync::Arc;

/// What to draw for one placed entity.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    /// Built-in cube of edge `size`.
    Primitive { size: f32, color: [f32; 4] },
    /// The entity's own normalized copy of its asset.
    Model(Arc<NormalizedEntity>),
    /// The asset failed to load.
    Placeholder { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub entity: EntityId,
    /// `T(position) * R_y(angle) * S(scale)`.
    pub world: Mat4,
    pub kind: DrawKind,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    pub mode: SessionMode,
    pub status: Status,
    /// Reticle pose; drawn only while visible.
    pub anchor: AnchorPose,
    pub items: Vec<DrawItem>,
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    type Output;

    fn render(&self, view: &SceneView) -> Self::Output;
}

/// Human-readable frame dump for the CLI, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, view: &SceneView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== {} | {} ===", view.mode, view.status);
        if view.anchor.visible {
            let p = view.anchor.pose.position;
            let _ = writeln!(out, "Reticle: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        } else {
            let _ = writeln!(out, "Reticle: hidden");
        }
        let _ = writeln!(out, "Entities: {}", view.items.len());

        for item in &view.items {
            let (_, _, p) = item.world.to_scale_rotation_translation();
            let what = match &item.kind {
                DrawKind::Primitive { size, .. } => format!("cube {size:.2}"),
                DrawKind::Model(model) => {
                    let extent = model.bounds().map_or(Vec3::ZERO, |b| b.size());
                    format!(
                        "model {} surfaces, extent ({:.2}, {:.2}, {:.2})",
                        model.root.surface_count(),
                        extent.x,
                        extent.y,
                        extent.z
                    )
                }
                DrawKind::Placeholder { reason } => format!("placeholder ({reason})"),
            };
            let _ = writeln!(
                out,
                "  [{}] pos=({:.2}, {:.2}, {:.2}) {what}",
                item.entity.short(),
                p.x,
                p.y,
                p.z
            );
        }

        out
    }
}
