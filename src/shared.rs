//! Reader/writer wrapper for sharing a trie between threads.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::TrieConfig;
use crate::error::Result;
use crate::trie::Trie;

/// A [`Trie`] behind a reader/writer lock.
///
/// Lookups and searches take the read lock, so they run in parallel with each
/// other; mutations take the write lock. Visitors run while the read lock is
/// held and must not call back into a mutating method of the same
/// `SharedTrie`, or they deadlock.
pub struct SharedTrie<V> {
    inner: RwLock<Trie<V>>,
}

impl<V> SharedTrie<V> {
    /// Create an empty shared trie with default configuration.
    pub fn new() -> Self {
        Self::from_trie(Trie::new())
    }

    /// Create an empty shared trie with the given configuration.
    pub fn with_config(config: TrieConfig) -> Result<Self> {
        Ok(Self::from_trie(Trie::with_config(config)?))
    }

    /// Wrap an existing trie.
    pub fn from_trie(trie: Trie<V>) -> Self {
        Self {
            inner: RwLock::new(trie),
        }
    }

    /// Unwrap the trie.
    pub fn into_inner(self) -> Trie<V> {
        self.inner.into_inner()
    }

    /// Shared access for several reads under one lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Trie<V>> {
        self.inner.read()
    }

    /// Exclusive access for several writes under one lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, Trie<V>> {
        self.inner.write()
    }

    /// Insert unless the key is present. See [`Trie::insert`].
    pub fn insert(&self, key: impl AsRef<[u8]>, value: V) -> bool {
        self.inner.write().insert(key.as_ref(), value)
    }

    /// Insert or overwrite. See [`Trie::set`].
    pub fn set(&self, key: impl AsRef<[u8]>, value: V) -> Option<V> {
        self.inner.write().set(key.as_ref(), value)
    }

    /// Get a copy of the value for a key.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().get(key.as_ref()).cloned()
    }

    /// Check if a key exists.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.read().contains_key(key.as_ref())
    }

    /// Remove a key, returning its value.
    pub fn remove(&self, key: impl AsRef<[u8]>) -> Option<V> {
        self.inner.write().remove(key.as_ref())
    }

    /// Remove a key. See [`Trie::delete`].
    pub fn delete(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.write().delete(key.as_ref())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// See [`Trie::visit_prefixes`].
    pub fn visit_prefixes<E, F>(
        &self,
        query: impl AsRef<[u8]>,
        case_insensitive: bool,
        visitor: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&[u8], &V) -> std::result::Result<(), E>,
    {
        self.inner
            .read()
            .visit_prefixes(query.as_ref(), case_insensitive, visitor)
    }

    /// See [`Trie::visit_substring`].
    pub fn visit_substring<E, F>(
        &self,
        query: impl AsRef<[u8]>,
        case_insensitive: bool,
        visitor: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&[u8], &V) -> std::result::Result<(), E>,
    {
        self.inner
            .read()
            .visit_substring(query.as_ref(), case_insensitive, visitor)
    }

    /// See [`Trie::visit_fuzzy`].
    pub fn visit_fuzzy<E, F>(
        &self,
        query: impl AsRef<[u8]>,
        case_insensitive: bool,
        visitor: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&[u8], &V, usize) -> std::result::Result<(), E>,
    {
        self.inner
            .read()
            .visit_fuzzy(query.as_ref(), case_insensitive, visitor)
    }
}

impl<V> Default for SharedTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<Trie<V>> for SharedTrie<V> {
    fn from(trie: Trie<V>) -> Self {
        Self::from_trie(trie)
    }
}
