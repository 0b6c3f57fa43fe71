//! Traversals: full and subtree walks plus the three search visitors.
//!
//! Every visitor returns `Result`. The first `Err` stops the traversal and is
//! handed back to the caller unchanged; the trie is never modified.
//!
//! The searches use node masks to skip subtrees that cannot hold a match.
//! A skip is only taken when the mask proves the subtree lacks a byte the
//! match still needs, so results are the same as an exhaustive scan.

use memchr::memmem;

use crate::mask::{case_variants, eq_byte, eq_bytes, fold_mask};
use crate::node::Node;
use crate::trie::Trie;

/// What a [`Trie::visit`] callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Keep going, including the keys below the current one.
    Continue,
    /// Skip the keys that extend the current one.
    SkipSubtree,
}

impl<V> Trie<V> {
    /// Visit every key in lexicographic byte order.
    pub fn visit<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<Walk, E>,
    {
        let mut path = Vec::new();
        walk(&self.root, &mut path, &mut visitor)
    }

    /// Visit every key starting with `prefix`, in lexicographic byte order.
    pub fn visit_subtree<E, F>(&self, prefix: &[u8], mut visitor: F) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<Walk, E>,
    {
        let Some((node, mut path)) = self.subtree(prefix) else {
            return Ok(());
        };
        path.truncate(path.len() - node.prefix.len());
        walk(node, &mut path, &mut visitor)
    }

    /// Visit every stored key that is a prefix of `query`, shortest first.
    ///
    /// With `case_insensitive`, ASCII letters match either case and both
    /// branches are followed when the trie holds both spellings.
    pub fn visit_prefixes<E, F>(
        &self,
        query: &[u8],
        case_insensitive: bool,
        mut visitor: F,
    ) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<(), E>,
    {
        let mut path = Vec::with_capacity(query.len());
        let result = prefixes(&self.root, query, case_insensitive, &mut path, &mut visitor);
        if result.is_err() {
            log::debug!("prefix search stopped by visitor");
        }
        result
    }

    /// Visit every key that contains `query` as a contiguous run. An empty
    /// query matches every key.
    pub fn visit_substring<E, F>(
        &self,
        query: &[u8],
        case_insensitive: bool,
        mut visitor: F,
    ) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<(), E>,
    {
        // Every query byte has to occur somewhere in the trie.
        if !query
            .iter()
            .all(|&b| self.root.mask & fold_mask(b, case_insensitive) != 0)
        {
            return Ok(());
        }

        let search = SubstringSearch::new(query, case_insensitive);
        let mut path = Vec::new();
        let result = search.walk(&self.root, &mut path, false, &mut visitor);
        if result.is_err() {
            log::debug!("substring search stopped by visitor");
        }
        result
    }

    /// Visit every key that contains the bytes of `query` in order, not
    /// necessarily adjacent.
    ///
    /// Query bytes are aligned greedily, each to the first matching key byte
    /// after the previous match. The visitor receives the number of key bytes
    /// lying between the first and last matched positions that were not
    /// matched themselves.
    pub fn visit_fuzzy<E, F>(
        &self,
        query: &[u8],
        case_insensitive: bool,
        mut visitor: F,
    ) -> Result<(), E>
    where
        F: FnMut(&[u8], &V, usize) -> Result<(), E>,
    {
        let search = FuzzySearch {
            query,
            case_insensitive,
        };
        let mut path = Vec::new();
        let result = search.walk(&self.root, &mut path, FuzzyState::default(), &mut visitor);
        if result.is_err() {
            log::debug!("fuzzy search stopped by visitor");
        }
        result
    }
}

fn walk<V, E, F>(node: &Node<V>, path: &mut Vec<u8>, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&[u8], &V) -> Result<Walk, E>,
{
    let start = path.len();
    path.extend_from_slice(&node.prefix);

    let descend = match &node.value {
        Some(value) => visitor(path.as_slice(), value)? == Walk::Continue,
        None => true,
    };
    if descend {
        for child in node.children.iter() {
            walk(child, path, visitor)?;
        }
    }

    path.truncate(start);
    Ok(())
}

fn prefixes<V, E, F>(
    node: &Node<V>,
    query: &[u8],
    case_insensitive: bool,
    path: &mut Vec<u8>,
    visitor: &mut F,
) -> Result<(), E>
where
    F: FnMut(&[u8], &V) -> Result<(), E>,
{
    let n = node.prefix.len();
    if n > query.len() || !eq_bytes(&node.prefix, &query[..n], case_insensitive) {
        return Ok(());
    }

    let start = path.len();
    path.extend_from_slice(&node.prefix);
    if let Some(value) = &node.value {
        visitor(path.as_slice(), value)?;
    }

    let rest = &query[n..];
    if let Some(&next) = rest.first() {
        for byte in case_variants(next, case_insensitive) {
            if let Some(child) = node.children.get(byte) {
                prefixes(child, rest, case_insensitive, path, visitor)?;
            }
        }
    }

    path.truncate(start);
    Ok(())
}

struct SubstringSearch<'q> {
    query: &'q [u8],
    case_insensitive: bool,
    finder: memmem::Finder<'q>,
    /// Slots of the last query byte. Any occurrence not already complete
    /// above a subtree ends inside it, so the subtree must have this class.
    last_needed: u64,
}

impl<'q> SubstringSearch<'q> {
    fn new(query: &'q [u8], case_insensitive: bool) -> Self {
        Self {
            query,
            case_insensitive,
            finder: memmem::Finder::new(query),
            last_needed: query
                .last()
                .map_or(u64::MAX, |&b| fold_mask(b, case_insensitive)),
        }
    }

    fn contains(&self, haystack: &[u8]) -> bool {
        if self.query.is_empty() {
            return true;
        }
        if self.case_insensitive {
            haystack
                .windows(self.query.len())
                .any(|w| w.eq_ignore_ascii_case(self.query))
        } else {
            self.finder.find(haystack).is_some()
        }
    }

    fn walk<V, E, F>(
        &self,
        node: &Node<V>,
        path: &mut Vec<u8>,
        matched_above: bool,
        visitor: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&[u8], &V) -> Result<(), E>,
    {
        let start = path.len();
        path.extend_from_slice(&node.prefix);

        // A new occurrence has to end within this node's prefix.
        let matched = matched_above || {
            let from = start.saturating_sub(self.query.len().saturating_sub(1));
            self.contains(&path[from..])
        };

        if matched {
            if let Some(value) = &node.value {
                visitor(path.as_slice(), value)?;
            }
        }

        for child in node.children.iter() {
            if !matched && child.mask & self.last_needed == 0 {
                continue;
            }
            self.walk(child, path, matched, visitor)?;
        }

        path.truncate(start);
        Ok(())
    }
}

struct FuzzySearch<'q> {
    query: &'q [u8],
    case_insensitive: bool,
}

/// Greedy alignment progress along one root-to-node path.
#[derive(Debug, Clone, Copy, Default)]
struct FuzzyState {
    /// Query bytes matched so far.
    matched: usize,
    /// Key position of the latest match.
    last: Option<usize>,
    skipped: usize,
}

impl FuzzySearch<'_> {
    fn walk<V, E, F>(
        &self,
        node: &Node<V>,
        path: &mut Vec<u8>,
        mut state: FuzzyState,
        visitor: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&[u8], &V, usize) -> Result<(), E>,
    {
        let start = path.len();
        path.extend_from_slice(&node.prefix);

        for (offset, &byte) in node.prefix.iter().enumerate() {
            let Some(&wanted) = self.query.get(state.matched) else {
                break;
            };
            if eq_byte(byte, wanted, self.case_insensitive) {
                let pos = start + offset;
                if let Some(last) = state.last {
                    state.skipped += pos - last - 1;
                }
                state.last = Some(pos);
                state.matched += 1;
            }
        }

        let needed = self
            .query
            .get(state.matched)
            .map(|&b| fold_mask(b, self.case_insensitive));

        if needed.is_none() {
            if let Some(value) = &node.value {
                visitor(path.as_slice(), value, state.skipped)?;
            }
        }

        for child in node.children.iter() {
            if needed.map_or(false, |m| child.mask & m == 0) {
                continue;
            }
            self.walk(child, path, state, visitor)?;
        }

        path.truncate(start);
        Ok(())
    }
}
