//! Rendering collaborator interface

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use thiserror::Error;

/// Errors reported by a rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The list container markers are placed into is gone
    #[error("marker container is not available")]
    ContainerUnavailable,
    /// Handle does not refer to a live element
    #[error("unknown marker handle {0}")]
    UnknownHandle(String),
    /// Any other surface failure
    #[error("rendering surface error: {0}")]
    Backend(String),
}

/// Surface that owns the visual marker elements
///
/// Markers are positioned absolutely in the list's coordinate space and must
/// not cause the surface to reflow the list itself.
pub trait Renderer {
    /// Back-reference to one rendered element
    type Handle: Clone + Eq + Hash + Debug;

    /// Whether the list container can currently accept markers
    fn is_available(&self) -> bool {
        true
    }

    /// Create a marker at `position` showing `label`
    fn create_marker(&mut self, position: f64, label: &str) -> Result<Self::Handle, RenderError>;

    /// Move and relabel an existing marker in place
    fn update_marker(
        &mut self,
        handle: &Self::Handle,
        position: f64,
        label: &str,
    ) -> Result<(), RenderError>;

    /// Remove a marker from the surface
    fn destroy_marker(&mut self, handle: Self::Handle) -> Result<(), RenderError>;
}

/// Handle of a marker rendered by [`MemoryRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// A marker as currently drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub position: f64,
    pub label: String,
}

/// Collaborator call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderCalls {
    pub created: usize,
    pub updated: usize,
    pub destroyed: usize,
}

impl RenderCalls {
    /// Total external mutations
    pub fn total(&self) -> usize {
        self.created + self.updated + self.destroyed
    }
}

/// Headless rendering surface
///
/// Keeps every marker in memory and counts calls, which makes it usable both
/// for hosts without a visual surface and for asserting churn.
#[derive(Debug)]
pub struct MemoryRenderer {
    markers: BTreeMap<MarkerId, RenderedMarker>,
    next_id: u64,
    available: bool,
    calls: RenderCalls,
}

impl MemoryRenderer {
    /// Create an empty, available surface
    pub fn new() -> Self {
        Self {
            markers: BTreeMap::new(),
            next_id: 0,
            available: true,
            calls: RenderCalls::default(),
        }
    }

    /// Simulate the list container appearing or disappearing
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Drop a marker behind the registry's back (host re-render)
    pub fn forget(&mut self, id: MarkerId) -> Option<RenderedMarker> {
        self.markers.remove(&id)
    }

    pub fn get(&self, id: MarkerId) -> Option<&RenderedMarker> {
        self.markers.get(&id)
    }

    /// Live markers sorted by position
    pub fn markers(&self) -> Vec<RenderedMarker> {
        let mut markers: Vec<_> = self.markers.values().cloned().collect();
        markers.sort_by(|a, b| a.position.total_cmp(&b.position));
        markers
    }

    /// Labels of live markers, top to bottom
    pub fn labels(&self) -> Vec<String> {
        self.markers().into_iter().map(|m| m.label).collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn calls(&self) -> RenderCalls {
        self.calls
    }

    /// Zero the call counters
    pub fn reset_calls(&mut self) {
        self.calls = RenderCalls::default();
    }
}

impl Default for MemoryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MemoryRenderer {
    type Handle = MarkerId;

    fn is_available(&self) -> bool {
        self.available
    }

    fn create_marker(&mut self, position: f64, label: &str) -> Result<MarkerId, RenderError> {
        if !self.available {
            return Err(RenderError::ContainerUnavailable);
        }
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.insert(
            id,
            RenderedMarker {
                position,
                label: label.to_string(),
            },
        );
        self.calls.created += 1;
        Ok(id)
    }

    fn update_marker(
        &mut self,
        handle: &MarkerId,
        position: f64,
        label: &str,
    ) -> Result<(), RenderError> {
        let marker = self
            .markers
            .get_mut(handle)
            .ok_or_else(|| RenderError::UnknownHandle(handle.to_string()))?;
        marker.position = position;
        marker.label = label.to_string();
        self.calls.updated += 1;
        Ok(())
    }

    fn destroy_marker(&mut self, handle: MarkerId) -> Result<(), RenderError> {
        self.markers
            .remove(&handle)
            .ok_or_else(|| RenderError::UnknownHandle(handle.to_string()))?;
        self.calls.destroyed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_update_destroy() {
        let mut surface = MemoryRenderer::new();
        let id = surface.create_marker(77.0, "Yesterday").unwrap();
        surface.update_marker(&id, 117.0, "Yesterday").unwrap();
        assert_eq!(surface.get(id).unwrap().position, 117.0);

        surface.destroy_marker(id).unwrap();
        assert!(surface.is_empty());
        assert_eq!(
            surface.calls(),
            RenderCalls {
                created: 1,
                updated: 1,
                destroyed: 1
            }
        );
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut surface = MemoryRenderer::new();
        let a = surface.create_marker(0.0, "Today").unwrap();
        surface.destroy_marker(a).unwrap();
        let b = surface.create_marker(0.0, "Today").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unavailable_container_rejects_creates() {
        let mut surface = MemoryRenderer::new();
        surface.set_available(false);
        assert_eq!(
            surface.create_marker(0.0, "Today"),
            Err(RenderError::ContainerUnavailable)
        );
    }

    #[test]
    fn test_unknown_handle() {
        let mut surface = MemoryRenderer::new();
        assert!(matches!(
            surface.destroy_marker(MarkerId(9)),
            Err(RenderError::UnknownHandle(_))
        ));
    }
}
