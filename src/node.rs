//! Trie nodes and their adaptive child lists.
//!
//! A node owns a compressed path segment (`prefix`), an optional value and its
//! children. Children are keyed by the first byte of their own prefix. Small
//! fan-out uses a sorted inline list; once a node exceeds the configured
//! threshold it switches to a 256-slot table indexed by byte.

use smallvec::SmallVec;

use crate::mask::mask_of;

/// Compressed path segment. Most segments are short enough to stay inline.
pub(crate) type Prefix = SmallVec<[u8; 16]>;

/// Children of a node.
#[derive(Clone)]
pub(crate) enum ChildList<V> {
    /// Sorted by first prefix byte.
    Sparse(SmallVec<[Box<Node<V>>; 4]>),
    /// Indexed by first prefix byte.
    Dense {
        slots: Box<[Option<Box<Node<V>>>; 256]>,
        len: usize,
    },
}

impl<V> ChildList<V> {
    pub(crate) fn new() -> Self {
        ChildList::Sparse(SmallVec::new())
    }

    fn single(child: Box<Node<V>>) -> Self {
        let mut list = SmallVec::new();
        list.push(child);
        ChildList::Sparse(list)
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            ChildList::Sparse(list) => list.len(),
            ChildList::Dense { len, .. } => *len,
        }
    }

    pub(crate) fn is_dense(&self) -> bool {
        matches!(self, ChildList::Dense { .. })
    }

    pub(crate) fn get(&self, byte: u8) -> Option<&Node<V>> {
        match self {
            ChildList::Sparse(list) => list
                .binary_search_by_key(&byte, |c| c.first_byte())
                .ok()
                .map(|i| &*list[i]),
            ChildList::Dense { slots, .. } => slots[byte as usize].as_deref(),
        }
    }

    pub(crate) fn get_mut(&mut self, byte: u8) -> Option<&mut Node<V>> {
        match self {
            ChildList::Sparse(list) => match list.binary_search_by_key(&byte, |c| c.first_byte()) {
                Ok(i) => Some(&mut *list[i]),
                Err(_) => None,
            },
            ChildList::Dense { slots, .. } => slots[byte as usize].as_deref_mut(),
        }
    }

    /// Return the child starting with `byte`, creating it with `make` if absent.
    pub(crate) fn get_or_insert_with(
        &mut self,
        byte: u8,
        make: impl FnOnce() -> Node<V>,
        max_sparse: usize,
    ) -> &mut Node<V> {
        if let ChildList::Sparse(list) = self {
            if list.len() >= max_sparse
                && list.binary_search_by_key(&byte, |c| c.first_byte()).is_err()
            {
                self.grow_to_dense();
            }
        }

        match self {
            ChildList::Sparse(list) => {
                let idx = match list.binary_search_by_key(&byte, |c| c.first_byte()) {
                    Ok(i) => i,
                    Err(i) => {
                        list.insert(i, Box::new(make()));
                        i
                    }
                };
                &mut *list[idx]
            }
            ChildList::Dense { slots, len } => {
                let slot = &mut slots[byte as usize];
                if slot.is_none() {
                    *len += 1;
                }
                &mut **slot.get_or_insert_with(|| Box::new(make()))
            }
        }
    }

    /// Unlink and return the child starting with `byte`.
    pub(crate) fn remove(&mut self, byte: u8, max_sparse: usize) -> Option<Box<Node<V>>> {
        let removed = match self {
            ChildList::Sparse(list) => {
                let i = list.binary_search_by_key(&byte, |c| c.first_byte()).ok()?;
                Some(list.remove(i))
            }
            ChildList::Dense { slots, len } => {
                let child = slots[byte as usize].take()?;
                *len -= 1;
                Some(child)
            }
        };

        if let ChildList::Dense { len, .. } = self {
            if *len <= max_sparse / 2 {
                self.shrink_to_sparse();
            }
        }
        removed
    }

    /// Take the only child out, leaving the list empty.
    pub(crate) fn take_only(&mut self) -> Option<Box<Node<V>>> {
        if self.len() != 1 {
            return None;
        }
        match std::mem::replace(self, ChildList::new()) {
            ChildList::Sparse(mut list) => list.pop(),
            ChildList::Dense { mut slots, .. } => slots.iter_mut().find_map(Option::take),
        }
    }

    /// Children in ascending first-byte order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Node<V>> + '_ {
        let (sparse, dense) = match self {
            ChildList::Sparse(list) => (Some(list.iter()), None),
            ChildList::Dense { slots, .. } => (None, Some(slots.iter().flatten())),
        };
        sparse
            .into_iter()
            .flatten()
            .chain(dense.into_iter().flatten())
            .map(|child| &**child)
    }

    /// Union of the children's masks.
    pub(crate) fn mask(&self) -> u64 {
        self.iter().fold(0, |mask, child| mask | child.mask)
    }

    fn grow_to_dense(&mut self) {
        if let ChildList::Sparse(list) = self {
            let mut slots: Box<[Option<Box<Node<V>>>; 256]> =
                Box::new(std::array::from_fn(|_| None));
            let len = list.len();
            for child in list.drain(..) {
                let byte = child.first_byte();
                slots[byte as usize] = Some(child);
            }
            log::trace!("child list grew to dense with {} children", len);
            *self = ChildList::Dense { slots, len };
        }
    }

    fn shrink_to_sparse(&mut self) {
        if let ChildList::Dense { slots, len } = self {
            let mut list = SmallVec::with_capacity(*len);
            list.extend(slots.iter_mut().filter_map(Option::take));
            log::trace!("child list shrank to sparse with {} children", list.len());
            *self = ChildList::Sparse(list);
        }
    }
}

/// A trie node. The trie's root is a node with an empty prefix.
#[derive(Clone)]
pub(crate) struct Node<V> {
    pub(crate) prefix: Prefix,
    pub(crate) value: Option<V>,
    pub(crate) children: ChildList<V>,
    /// Classes of every byte in `prefix` and below. May be wider than needed.
    pub(crate) mask: u64,
}

impl<V> Node<V> {
    pub(crate) fn root() -> Self {
        Self::with_prefix(&[])
    }

    /// A node with `prefix`, no value, no children and a zero mask.
    pub(crate) fn with_prefix(prefix: &[u8]) -> Self {
        Self {
            prefix: Prefix::from_slice(prefix),
            value: None,
            children: ChildList::new(),
            mask: 0,
        }
    }

    /// First byte of the prefix. Only meaningful for non-root nodes, whose
    /// prefix is never empty.
    #[inline]
    pub(crate) fn first_byte(&self) -> u8 {
        self.prefix[0]
    }

    pub(crate) fn recompute_mask(&mut self) {
        self.mask = mask_of(&self.prefix) | self.children.mask();
    }

    /// Number of values stored at or below this node.
    pub(crate) fn count(&self) -> usize {
        self.value.is_some() as usize + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Value slot for `key`, creating nodes (and splitting this one) as needed.
    ///
    /// `key` is relative to the start of this node's prefix. Every node on the
    /// path gets the mask of the key bytes it covers.
    pub(crate) fn slot(&mut self, key: &[u8], max_sparse: usize) -> &mut Option<V> {
        let common = common_prefix_len(&self.prefix, key);
        if common < self.prefix.len() {
            self.split(common);
        }
        self.mask |= mask_of(key);

        let rest = &key[common..];
        match rest.first() {
            None => &mut self.value,
            Some(&byte) => self
                .children
                .get_or_insert_with(byte, || Node::with_prefix(rest), max_sparse)
                .slot(rest, max_sparse),
        }
    }

    /// Cut the prefix at `at`. The tail moves into a new child that takes over
    /// this node's value and children.
    fn split(&mut self, at: usize) {
        let mut tail = Node {
            prefix: Prefix::from_slice(&self.prefix[at..]),
            value: self.value.take(),
            children: std::mem::replace(&mut self.children, ChildList::new()),
            mask: 0,
        };
        tail.recompute_mask();
        log::trace!(
            "split node at {} ({} + {} bytes)",
            at,
            at,
            tail.prefix.len()
        );

        self.prefix.truncate(at);
        self.children = ChildList::single(Box::new(tail));
        self.recompute_mask();
    }

    /// Take over the only child: concatenate prefixes and adopt its value and
    /// children.
    pub(crate) fn merge_with_only_child(&mut self) {
        if self.value.is_some() {
            return;
        }
        if let Some(child) = self.children.take_only() {
            let Node {
                prefix,
                value,
                children,
                ..
            } = *child;
            log::trace!(
                "merged node ({} bytes) with only child ({} bytes)",
                self.prefix.len(),
                prefix.len()
            );
            self.prefix.extend_from_slice(&prefix);
            self.value = value;
            self.children = children;
            self.recompute_mask();
        }
    }

    /// Restore minimality of the child at `byte` after its value or children
    /// changed. Returns `true` if the child was unlinked.
    pub(crate) fn compact_child(&mut self, byte: u8, max_sparse: usize) -> bool {
        let Some(child) = self.children.get_mut(byte) else {
            return false;
        };
        if child.value.is_some() {
            return false;
        }
        match child.children.len() {
            0 => {
                self.children.remove(byte, max_sparse);
                true
            }
            1 => {
                child.merge_with_only_child();
                false
            }
            _ => false,
        }
    }

    /// Remove the value for `key` (relative to the start of this node's
    /// prefix), compressing the path below this node.
    pub(crate) fn remove(&mut self, key: &[u8], max_sparse: usize) -> Option<V> {
        let rest = key.strip_prefix(self.prefix.as_slice())?;
        let Some(&byte) = rest.first() else {
            return self.value.take();
        };

        let removed = self.children.get_mut(byte)?.remove(rest, max_sparse)?;
        self.compact_child(byte, max_sparse);
        self.recompute_mask();
        Some(removed)
    }

    /// Remove every value below this node whose key continues with `rest`
    /// (`rest` is relative to the end of this node's prefix and non-empty).
    /// Returns the number of values removed.
    pub(crate) fn remove_subtree(&mut self, rest: &[u8], max_sparse: usize) -> usize {
        let Some(&byte) = rest.first() else {
            return 0;
        };
        let Some(child) = self.children.get_mut(byte) else {
            return 0;
        };

        let removed = if child.prefix.starts_with(rest) {
            let removed = child.count();
            self.children.remove(byte, max_sparse);
            removed
        } else if let Some(tail) = rest.strip_prefix(child.prefix.as_slice()) {
            let removed = child.remove_subtree(tail, max_sparse);
            if removed == 0 {
                return 0;
            }
            self.compact_child(byte, max_sparse);
            removed
        } else {
            return 0;
        };

        self.recompute_mask();
        removed
    }
}

impl<V> std::fmt::Debug for Node<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("value", &self.value)
            .field("mask", &format_args!("{:#018x}", self.mask))
            .field("children", &self.children.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
