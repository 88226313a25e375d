//! Keyed record storage.
//!
//! Profiles and OTP records live behind [`KeyValueStore`] so the workflow does
//! not care where they are kept. The only backend shipped today is
//! [`MemoryStore`], which lives for the process lifetime. A database-backed
//! store can implement the same trait later.

mod memory;

pub use memory::MemoryStore;

/// Result of an inspect-then-maybe-remove access on a single key.
#[derive(Debug, Clone, PartialEq)]
pub enum Taken<V> {
    /// No record exists for the key.
    Missing,
    /// The record was inspected and left in place.
    Kept(V),
    /// The record was inspected and removed.
    Removed(V),
}

/// Keyed storage with per-key atomic read-modify-write.
///
/// Implementations must be thread-safe: handlers call into the same store
/// concurrently. Every method touching a single key must observe either the
/// whole previous record or the whole new one.
pub trait KeyValueStore<V>: Send + Sync {
    /// Clone of the record stored under `key`.
    fn get(&self, key: &str) -> Option<V>;

    /// Insert or overwrite, returning the replaced record.
    fn put(&self, key: String, value: V) -> Option<V>;

    /// Remove and return the record under `key`.
    fn delete(&self, key: &str) -> Option<V>;

    /// Inspect the record under `key` while holding exclusive access to it.
    /// The record is removed when `remove` returns `true`.
    fn take_if(&self, key: &str, remove: &mut dyn FnMut(&V) -> bool) -> Taken<V>;

    /// Keep only the records for which `keep` returns `true`.
    fn retain(&self, keep: &mut dyn FnMut(&V) -> bool);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
