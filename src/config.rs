//! Trie configuration.

use crate::error::{Error, Result};

/// Default fan-out at which a node's child list switches to a dense table.
pub const DEFAULT_MAX_CHILDREN_PER_SPARSE_NODE: usize = 8;

/// Configuration for a [`Trie`](crate::Trie).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieConfig {
    /// Largest number of children kept in a sorted inline list. A node that
    /// needs more switches to a 256-slot table indexed by byte, and switches
    /// back once it drops to half this count. Must be in `1..=256`.
    pub max_children_per_sparse_node: usize,
}

impl TrieConfig {
    /// Check that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=256).contains(&self.max_children_per_sparse_node) {
            return Err(Error::InvalidConfig {
                field: "max_children_per_sparse_node",
                value: self.max_children_per_sparse_node,
                expected: "1..=256",
            });
        }
        Ok(())
    }
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            max_children_per_sparse_node: DEFAULT_MAX_CHILDREN_PER_SPARSE_NODE,
        }
    }
}
