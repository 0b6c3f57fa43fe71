//! The trie handle and its mutation engine.

use crate::config::TrieConfig;
use crate::error::Result;
use crate::node::Node;

/// A PATRICIA trie mapping byte-string keys to values of type `V`.
///
/// Paths are compressed: a node that holds no value always has at least two
/// children, so the node count stays proportional to the number of keys.
/// Every node carries a 64-bit mask of the character classes found at or
/// below it, which the search visitors use to skip subtrees.
///
/// ```rust
/// use patricia_rs::Trie;
///
/// let mut trie = Trie::new();
/// assert!(trie.insert(b"Pepan", 1));
/// assert!(trie.insert(b"Pepin", 2));
/// assert!(!trie.insert(b"Pepan", 3));
///
/// assert_eq!(trie.get(b"Pepan"), Some(&1));
/// assert!(trie.delete(b"Pepin"));
/// assert_eq!(trie.get(b"Pepin"), None);
/// ```
#[derive(Clone)]
pub struct Trie<V> {
    pub(crate) root: Node<V>,
    pub(crate) len: usize,
    pub(crate) config: TrieConfig,
}

impl<V> Trie<V> {
    /// Create an empty trie with the default configuration.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            len: 0,
            config: TrieConfig::default(),
        }
    }

    /// Create an empty trie with the given configuration.
    pub fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: Node::root(),
            len: 0,
            config,
        })
    }

    /// The configuration this trie was built with.
    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.root = Node::root();
        self.len = 0;
    }

    /// Insert `value` under `key` unless the key is already present.
    ///
    /// Returns `false`, leaving the stored value untouched, if `key` exists.
    pub fn insert(&mut self, key: &[u8], value: V) -> bool {
        let max_sparse = self.config.max_children_per_sparse_node;
        let slot = self.root.slot(key, max_sparse);
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        self.len += 1;
        true
    }

    /// Insert or overwrite the value under `key`, returning the previous one.
    pub fn set(&mut self, key: &[u8], value: V) -> Option<V> {
        let max_sparse = self.config.max_children_per_sparse_node;
        let old = self.root.slot(key, max_sparse).replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Get a reference to the value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let mut node = &self.root;
        let mut rest = key;
        loop {
            rest = rest.strip_prefix(node.prefix.as_slice())?;
            let Some(&byte) = rest.first() else {
                return node.value.as_ref();
            };
            node = node.children.get(byte)?;
        }
    }

    /// Get a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let mut node = &mut self.root;
        let mut rest = key;
        loop {
            rest = rest.strip_prefix(node.prefix.as_slice())?;
            let Some(&byte) = rest.first() else {
                return node.value.as_mut();
            };
            node = node.children.get_mut(byte)?;
        }
    }

    /// Whether `key` is stored.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Whether any stored key starts with `prefix`.
    pub fn contains_prefix(&self, prefix: &[u8]) -> bool {
        self.subtree(prefix)
            .map_or(false, |(node, _)| node.value.is_some() || node.children.len() > 0)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let max_sparse = self.config.max_children_per_sparse_node;
        let old = self.root.remove(key, max_sparse)?;
        self.len -= 1;
        Some(old)
    }

    /// Remove `key`. Returns `false`, changing nothing, if it was not stored.
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.remove(key).is_some()
    }

    /// Remove every key starting with `prefix`. Returns `false` if none did.
    pub fn delete_subtree(&mut self, prefix: &[u8]) -> bool {
        if prefix.is_empty() {
            let had_keys = !self.is_empty();
            self.clear();
            return had_keys;
        }

        let max_sparse = self.config.max_children_per_sparse_node;
        let removed = self.root.remove_subtree(prefix, max_sparse);
        if removed > 0 {
            log::debug!(
                "removed {} keys under prefix {:?}",
                removed,
                String::from_utf8_lossy(prefix)
            );
        }
        self.len -= removed;
        removed > 0
    }

    /// The highest node whose key starts with `prefix`, with that node's full
    /// key.
    pub(crate) fn subtree(&self, prefix: &[u8]) -> Option<(&Node<V>, Vec<u8>)> {
        let mut node = &self.root;
        let mut path = Vec::with_capacity(prefix.len());
        let mut rest = prefix;
        loop {
            if node.prefix.starts_with(rest) {
                path.extend_from_slice(&node.prefix);
                return Some((node, path));
            }
            rest = rest.strip_prefix(node.prefix.as_slice())?;
            path.extend_from_slice(&node.prefix);
            node = node.children.get(rest[0])?;
        }
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for Trie<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trie")
            .field("len", &self.len)
            .field("root", &self.root)
            .finish()
    }
}
