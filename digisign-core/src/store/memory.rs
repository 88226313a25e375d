//! In-memory store backed by a sharded concurrent map.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{KeyValueStore, Taken};

/// Process-lifetime storage. Records are lost on restart.
pub struct MemoryStore<V> {
    records: DashMap<String, V>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        self.records.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: String, value: V) -> Option<V> {
        self.records.insert(key, value)
    }

    fn delete(&self, key: &str) -> Option<V> {
        self.records.remove(key).map(|(_, value)| value)
    }

    fn take_if(&self, key: &str, remove: &mut dyn FnMut(&V) -> bool) -> Taken<V> {
        // The entry guard holds the shard's write lock until it is dropped.
        match self.records.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                if remove(entry.get()) {
                    Taken::Removed(entry.remove())
                } else {
                    Taken::Kept(entry.get().clone())
                }
            }
            Entry::Vacant(_) => Taken::Missing,
        }
    }

    fn retain(&self, keep: &mut dyn FnMut(&V) -> bool) {
        self.records.retain(|_, value| keep(value));
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl<V> std::fmt::Debug for MemoryStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.records.len())
            .finish()
    }
}
