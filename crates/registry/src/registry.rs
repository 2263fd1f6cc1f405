//! Registry of currently rendered markers

use ahash::{AHashMap, AHashSet};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Broken registry bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Two keys point at the same rendered element
    #[error("handle {handle} is registered under both `{first}` and `{second}`")]
    DuplicateHandle {
        handle: String,
        first: String,
        second: String,
    },
}

/// Rendered counterpart of one desired marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord<H> {
    pub position: f64,
    pub label: String,
    pub handle: H,
}

/// Authoritative record of rendered markers: key -> record
///
/// Only the reconciler creates or destroys records, and every record owns
/// exactly one live element on the rendering surface.
#[derive(Debug, Clone)]
pub struct MarkerRegistry<H> {
    records: AHashMap<String, MarkerRecord<H>>,
}

impl<H: Clone + Eq + Hash + Debug> MarkerRegistry<H> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            records: AHashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MarkerRecord<H>> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MarkerRecord<H>)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Verify no two records share a handle
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen: AHashMap<&H, &str> = AHashMap::with_capacity(self.records.len());
        for (key, record) in &self.records {
            if let Some(first) = seen.insert(&record.handle, key) {
                return Err(InvariantViolation::DuplicateHandle {
                    handle: format!("{:?}", record.handle),
                    first: first.to_string(),
                    second: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// Distinct handles currently held
    pub fn handles(&self) -> AHashSet<H> {
        self.records.values().map(|r| r.handle.clone()).collect()
    }

    pub(crate) fn insert(&mut self, key: String, record: MarkerRecord<H>) {
        self.records.insert(key, record);
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut MarkerRecord<H>> {
        self.records.get_mut(key)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<MarkerRecord<H>> {
        self.records.remove(key)
    }

    pub(crate) fn drain(&mut self) -> Vec<(String, MarkerRecord<H>)> {
        self.records.drain().collect()
    }
}

impl<H: Clone + Eq + Hash + Debug> Default for MarkerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
