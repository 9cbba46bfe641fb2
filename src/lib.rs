//! A prefix tree (trie) mapping byte-string keys to byte-string values.
//!
//! This crate provides [`ByteTrie`], where each byte of a key selects one
//! edge per trie level. It is not a radix trie: every key byte gets its own
//! node.
//!
//! # Features
//!
//! - Lookup, insertion and removal in O(k) where k is the key length
//! - Prune-on-remove: nodes that no longer lead to a value are dropped
//! - Pluggable child storage ([`HashChildren`] or [`ArrayChildren`])
//! - Iteration over all pairs or the pairs sharing a prefix
//!
//! The trie does no internal synchronization. Wrap it in a lock to share it
//! between threads.

mod byte_trie;
mod children;
mod error;
mod iter;
mod node;

pub use byte_trie::{ArrayTrie, ByteTrie, HashTrie};
pub use children::{ArrayChildren, Children, HashChildren};
pub use error::{Error, Result};
pub use iter::{Iter, Keys, PrefixIter, Values};
pub use node::Node;

#[cfg(test)]
mod proptest_trie;
