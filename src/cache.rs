//! Generation-stamped memo table for computed properties.
//!
//! An entry is only ever returned when its stamp equals the owning
//! molecule's current generation. Nothing tracks which property was derived
//! from which: advancing the generation invalidates every entry at once,
//! including values that were computed from other cached values.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::property::{Entity, PropertyKey, PropertyValue};

#[derive(Debug, Clone)]
struct CacheEntry {
    generation: u64,
    value: PropertyValue,
}

/// Computed property values of one [`Mol`](crate::Mol).
///
/// Lookups take `&self` so that read-only queries can populate the cache.
/// The table is guarded by a [`RwLock`], which is never held while a value is
/// being computed; computations may therefore recurse into other properties.
#[derive(Debug, Default)]
pub struct PropertyCache {
    entries: RwLock<HashMap<(Entity, PropertyKey), CacheEntry>>,
}

impl PropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if it was computed at `generation`.
    pub fn lookup(
        &self,
        entity: Entity,
        key: &PropertyKey,
        generation: u64,
    ) -> Option<PropertyValue> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(entity, key.clone()))
            .filter(|entry| entry.generation == generation)
            .map(|entry| entry.value.clone())
    }

    pub fn is_fresh(&self, entity: Entity, key: &PropertyKey, generation: u64) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(entity, key.clone()))
            .is_some_and(|entry| entry.generation == generation)
    }

    pub fn store(&self, entity: Entity, key: PropertyKey, value: PropertyValue, generation: u64) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert((entity, key), CacheEntry { generation, value });
    }

    /// Drops every entry not computed at `generation`.
    ///
    /// Needed after index compaction: a stale entry keyed by a shifted index
    /// would otherwise linger under another entity's key.
    pub fn evict_stale(&mut self, generation: u64) {
        self.entries
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, entry| entry.generation == generation);
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
