//! List source collaborator

use dayline_core::Item;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;

/// List source failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The list container is not on screen
    #[error("item list is not available")]
    Unavailable,
}

/// Read-only view of the host's current item list
///
/// Must be cheap to query repeatedly.
pub trait ListSource: Send + 'static {
    /// Current items in on-screen order
    fn snapshot(&self) -> Result<Vec<Item>, SourceError>;

    /// Number of rows currently in the list
    fn item_count(&self) -> usize {
        self.snapshot().map(|items| items.len()).unwrap_or(0)
    }
}

/// Shared in-memory item list
///
/// The host writes through one clone while the watcher reads another.
#[derive(Debug, Clone, Default)]
pub struct SharedList {
    items: Arc<RwLock<Option<Vec<Item>>>>,
}

impl SharedList {
    /// A list that is present but empty
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(Some(Vec::new()))),
        }
    }

    /// A list whose container has not appeared yet
    pub fn detached() -> Self {
        Self::default()
    }

    /// Replace the whole list
    pub fn replace(&self, items: Vec<Item>) {
        *self.items.write() = Some(items);
    }

    /// Append rows, renumbering ordinals after the current tail
    pub fn extend(&self, rows: impl IntoIterator<Item = Item>) {
        let mut guard = self.items.write();
        let items = guard.get_or_insert_with(Vec::new);
        let start = items.len();
        items.extend(rows.into_iter().enumerate().map(|(i, mut item)| {
            item.ordinal = start + i;
            item
        }));
    }

    /// Remove the list container entirely
    pub fn detach(&self) {
        *self.items.write() = None;
    }
}

impl ListSource for SharedList {
    fn snapshot(&self) -> Result<Vec<Item>, SourceError> {
        self.items.read().clone().ok_or(SourceError::Unavailable)
    }

    fn item_count(&self) -> usize {
        self.items.read().as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_list_is_unavailable() {
        let list = SharedList::detached();
        assert_eq!(list.snapshot(), Err(SourceError::Unavailable));
        assert_eq!(list.item_count(), 0);
    }

    #[test]
    fn test_extend_renumbers_ordinals() {
        let list = SharedList::new();
        list.replace(vec![Item::new(0, Some(0.0), Some("2025-11-21"))]);
        list.extend(vec![
            Item::new(0, Some(40.0), Some("2025-11-21")),
            Item::new(0, Some(80.0), Some("2025-11-20")),
        ]);

        let ordinals: Vec<_> = list.snapshot().unwrap().iter().map(|i| i.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_clones_share_state() {
        let host = SharedList::new();
        let reader = host.clone();
        host.replace(vec![Item::new(0, Some(0.0), None)]);
        assert_eq!(reader.item_count(), 1);
    }
}
