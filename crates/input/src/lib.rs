//! User-facing actions: the vocabulary that menus, touch and pointer input are
//! mapped onto.
//!
//! # Invariants
//! - Tracking and simulation consume the same actions.
//! - The session never sees raw input events.

pub mod action;

pub use action::Action;
