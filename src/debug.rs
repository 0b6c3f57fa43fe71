//! Structural statistics and integrity checks.

use crate::mask::mask_of;
use crate::node::Node;
use crate::trie::Trie;

/// Shape of a trie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Number of keys stored.
    pub keys: usize,
    /// Number of nodes, including the root.
    pub nodes: usize,
    /// Nodes with children kept in a sorted inline list.
    pub sparse_nodes: usize,
    /// Nodes with children kept in a 256-slot table.
    pub dense_nodes: usize,
    /// Total bytes held in node prefixes.
    pub prefix_bytes: usize,
    /// Longest root-to-node edge count.
    pub max_depth: usize,
}

impl<V> Trie<V> {
    /// Walk the tree and collect its [`TrieStats`].
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::default();
        let mut stack: Vec<(&Node<V>, usize)> = vec![(&self.root, 0)];
        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.keys += node.value.is_some() as usize;
            stats.prefix_bytes += node.prefix.len();
            stats.max_depth = stats.max_depth.max(depth);
            if node.children.len() > 0 {
                if node.children.is_dense() {
                    stats.dense_nodes += 1;
                } else {
                    stats.sparse_nodes += 1;
                }
            }
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        stats
    }

    /// Verify tree invariants. Returns a list of issues found, empty when the
    /// trie is well formed.
    ///
    /// Checked: compression (no value-less single-child or childless node
    /// below the root), distinct and correctly placed sibling bytes, masks
    /// covering their own prefix and every child's mask, and the key count.
    pub fn check_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.root.prefix.is_empty() {
            issues.push(format!(
                "root has non-empty prefix {:?}",
                String::from_utf8_lossy(&self.root.prefix)
            ));
        }
        let mut path = Vec::new();
        let count = Self::verify_node(&self.root, true, &mut path, &mut issues);
        if count != self.len {
            issues.push(format!("reachable value count {} != len {}", count, self.len));
        }
        issues
    }

    fn verify_node(
        node: &Node<V>,
        is_root: bool,
        path: &mut Vec<u8>,
        issues: &mut Vec<String>,
    ) -> usize {
        let start = path.len();
        path.extend_from_slice(&node.prefix);
        let at = String::from_utf8_lossy(path).into_owned();

        if !is_root {
            if node.prefix.is_empty() {
                issues.push(format!("non-root node at {:?} has empty prefix", at));
            }
            if node.value.is_none() {
                match node.children.len() {
                    0 => issues.push(format!("childless node at {:?} has no value", at)),
                    1 => issues.push(format!("uncompressed single-child node at {:?}", at)),
                    _ => {}
                }
            }
        }

        let own = mask_of(&node.prefix);
        if own & !node.mask != 0 {
            issues.push(format!(
                "mask at {:?} misses own prefix bits {:#018x}",
                at,
                own & !node.mask
            ));
        }

        let iterated = node.children.iter().count();
        if iterated != node.children.len() {
            issues.push(format!(
                "child list at {:?} reports {} children but holds {}",
                at,
                node.children.len(),
                iterated
            ));
        }

        let mut count = node.value.is_some() as usize;
        let mut prev: Option<u8> = None;
        for child in node.children.iter() {
            if child.prefix.is_empty() {
                issues.push(format!("child of {:?} has empty prefix", at));
                continue;
            }
            let byte = child.first_byte();
            if prev.map_or(false, |p| p >= byte) {
                issues.push(format!(
                    "children of {:?} out of order or duplicated at byte {:#04x}",
                    at, byte
                ));
            }
            prev = Some(byte);
            if !node.children.get(byte).map_or(false, |c| std::ptr::eq(c, child)) {
                issues.push(format!("child {:#04x} of {:?} is not findable", byte, at));
            }
            if child.mask & !node.mask != 0 {
                issues.push(format!(
                    "child mask escapes parent at {:?}: diff {:#018x}",
                    at,
                    child.mask & !node.mask
                ));
            }
            count += Self::verify_node(child, false, path, issues);
        }

        path.truncate(start);
        count
    }
}
