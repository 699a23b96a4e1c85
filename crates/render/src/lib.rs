//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate session state.
//! - Every placed entity yields exactly one draw item; load failures draw a
//!   placeholder instead of aborting the frame.

mod composer;
mod renderer;

pub use composer::{FrameComposer, PRIMITIVE_SIZE};
pub use renderer::{DebugTextRenderer, DrawItem, DrawKind, Renderer, SceneView};
