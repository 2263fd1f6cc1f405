//! Rendered marker state and reconciliation
//!
//! This crate provides:
//! - The rendering collaborator interface (`Renderer`)
//! - An in-memory rendering surface
//! - The registry of currently rendered markers
//! - Diffing and applying a desired marker set

pub mod reconcile;
pub mod registry;
pub mod render;

// Re-exports
pub use reconcile::{diff, ReconcileError, ReconcilePlan, ReconcileReport, Reconciler};
pub use registry::{InvariantViolation, MarkerRecord, MarkerRegistry};
pub use render::{MarkerId, MemoryRenderer, RenderCalls, RenderError, RenderedMarker, Renderer};
