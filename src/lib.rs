//! # patricia-rs
//!
//! A PATRICIA trie (compressed radix tree) over byte-string keys with
//! mask-pruned prefix, substring and fuzzy search.
//!
//! Each node summarises the character classes found in its subtree in a
//! 64-bit mask (see [`mask`]). The searches consult that mask to skip
//! subtrees that cannot contain a match.
//!
//! ## Example
//!
//! ```rust
//! use std::convert::Infallible;
//! use patricia_rs::Trie;
//!
//! let mut trie = Trie::new();
//! for name in ["Pepan", "Pepin", "Honza", "Pepanek"] {
//!     trie.insert(name.as_bytes(), name.len());
//! }
//!
//! let mut hits = Vec::new();
//! trie.visit_fuzzy(b"Ppn", false, |key, _, skipped| {
//!     hits.push((String::from_utf8_lossy(key).into_owned(), skipped));
//!     Ok::<_, Infallible>(())
//! })
//! .unwrap();
//! hits.sort();
//! assert_eq!(
//!     hits,
//!     vec![
//!         ("Pepan".to_string(), 2),
//!         ("Pepanek".to_string(), 2),
//!         ("Pepin".to_string(), 2),
//!     ]
//! );
//!
//! let mut found = Vec::new();
//! trie.visit_substring(b"epa", false, |key, _| {
//!     found.push(key.to_vec());
//!     Ok::<_, Infallible>(())
//! })
//! .unwrap();
//! assert_eq!(found, vec![b"Pepan".to_vec(), b"Pepanek".to_vec()]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod debug;
pub mod error;
pub mod mask;
mod node;
mod shared;
mod trie;
mod visit;

pub use config::TrieConfig;
pub use debug::TrieStats;
pub use error::{Error, Result};
pub use mask::{classify, mask_of};
pub use shared::SharedTrie;
pub use trie::Trie;
pub use visit::Walk;

#[cfg(test)]
mod proptests;
