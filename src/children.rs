use std::collections::HashMap;
use std::fmt;

use crate::node::{clear_bit, count_bits, set_bit, test_bit, Node};

/// A byte-indexed container holding the children of a trie node.
///
/// `ByteTrie` is generic over this trait so the backing store is a choice
/// of strategy rather than a second copy of the trie. Implementations must
/// keep at most one child per byte.
pub trait Children: Default + Sized {
    /// Returns the child under `byte`.
    fn get(&self, byte: u8) -> Option<&Node<Self>>;

    /// Returns the child under `byte` mutably.
    fn get_mut(&mut self, byte: u8) -> Option<&mut Node<Self>>;

    /// Returns the child under `byte`, linking a new valueless node there
    /// first if none exists.
    fn get_or_insert(&mut self, byte: u8) -> &mut Node<Self>;

    /// Unlinks and returns the child under `byte`.
    fn remove(&mut self, byte: u8) -> Option<Node<Self>>;

    /// Number of children.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(byte, child)` pairs in no particular order.
    fn iter(&self) -> impl Iterator<Item = (u8, &Node<Self>)>;

    /// Unlinks every child, yielding `(byte, child)` pairs. If the iterator
    /// is dropped early, the children not yet yielded may or may not remain,
    /// but `len` and lookups stay consistent.
    fn drain(&mut self) -> impl Iterator<Item = (u8, Node<Self>)>;
}

/// Children stored in a `HashMap`. Compact for sparse fan-out.
#[derive(Default)]
pub struct HashChildren(HashMap<u8, Node<HashChildren>>);

impl fmt::Debug for HashChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl Children for HashChildren {
    #[inline]
    fn get(&self, byte: u8) -> Option<&Node<Self>> {
        self.0.get(&byte)
    }

    #[inline]
    fn get_mut(&mut self, byte: u8) -> Option<&mut Node<Self>> {
        self.0.get_mut(&byte)
    }

    #[inline]
    fn get_or_insert(&mut self, byte: u8) -> &mut Node<Self> {
        self.0.entry(byte).or_default()
    }

    fn remove(&mut self, byte: u8) -> Option<Node<Self>> {
        self.0.remove(&byte)
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn iter(&self) -> impl Iterator<Item = (u8, &Node<Self>)> {
        self.0.iter().map(|(&byte, node)| (byte, node))
    }

    fn drain(&mut self) -> impl Iterator<Item = (u8, Node<Self>)> {
        self.0.drain()
    }
}

type Slots = [Option<Box<Node<ArrayChildren>>>; 256];

/// Children stored in a fixed 256-slot array with a presence bitmap.
///
/// Lookups are a single index, at the cost of 2 KiB per container. Iteration
/// yields children in ascending byte order.
pub struct ArrayChildren {
    is_present: [u64; 4],
    slots: Box<Slots>,
}

impl Default for ArrayChildren {
    fn default() -> Self {
        ArrayChildren {
            is_present: [0; 4],
            slots: Box::new(std::array::from_fn(|_| None)),
        }
    }
}

impl fmt::Debug for ArrayChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|(byte, _)| byte))
            .finish()
    }
}

impl Children for ArrayChildren {
    #[inline]
    fn get(&self, byte: u8) -> Option<&Node<Self>> {
        if !test_bit(&self.is_present, byte) {
            return None;
        }
        self.slots[usize::from(byte)].as_deref()
    }

    #[inline]
    fn get_mut(&mut self, byte: u8) -> Option<&mut Node<Self>> {
        if !test_bit(&self.is_present, byte) {
            return None;
        }
        self.slots[usize::from(byte)].as_deref_mut()
    }

    #[inline]
    fn get_or_insert(&mut self, byte: u8) -> &mut Node<Self> {
        set_bit(&mut self.is_present, byte);
        self.slots[usize::from(byte)].get_or_insert_with(Box::default)
    }

    fn remove(&mut self, byte: u8) -> Option<Node<Self>> {
        clear_bit(&mut self.is_present, byte);
        self.slots[usize::from(byte)].take().map(|node| *node)
    }

    fn len(&self) -> usize {
        count_bits(&self.is_present)
    }

    fn iter(&self) -> impl Iterator<Item = (u8, &Node<Self>)> {
        (0..=255u8)
            .filter(move |&byte| test_bit(&self.is_present, byte))
            .filter_map(move |byte| self.slots[usize::from(byte)].as_deref().map(|node| (byte, node)))
    }

    fn drain(&mut self) -> impl Iterator<Item = (u8, Node<Self>)> {
        (0..=255u8).filter_map(move |byte| self.remove(byte).map(|node| (byte, node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise<C: Children>() {
        let mut children = C::default();
        assert!(children.is_empty());
        assert!(children.get(7).is_none());

        children.get_or_insert(7).value = Some(b"seven".to_vec());
        children.get_or_insert(255);
        children.get_or_insert(0);
        assert_eq!(children.len(), 3);

        // Existing children are returned, not replaced.
        assert_eq!(children.get_or_insert(7).value(), Some(&b"seven"[..]));
        assert_eq!(children.len(), 3);

        if let Some(node) = children.get_mut(255) {
            node.value = Some(Vec::new());
        }
        assert_eq!(children.get(255).and_then(|node| node.value()), Some(&[][..]));

        let mut bytes: Vec<u8> = children.iter().map(|(byte, _)| byte).collect();
        bytes.sort_unstable();
        assert_eq!(bytes, vec![0, 7, 255]);

        let removed = children.remove(7);
        assert_eq!(removed.as_ref().and_then(|node| node.value()), Some(&b"seven"[..]));
        assert!(children.remove(7).is_none());
        assert!(children.get(7).is_none());
        assert!(children.get_mut(7).is_none());
        assert_eq!(children.len(), 2);

        let mut drained: Vec<u8> = children.drain().map(|(byte, _)| byte).collect();
        drained.sort_unstable();
        assert_eq!(drained, vec![0, 255]);
        assert!(children.is_empty());
        assert!(children.get(0).is_none());

        // The container stays usable after a drain.
        children.get_or_insert(9);
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_hash_children() {
        exercise::<HashChildren>();
    }

    #[test]
    fn test_array_children() {
        exercise::<ArrayChildren>();
    }

    #[test]
    fn test_partial_drain_leaves_container_consistent() {
        let mut children = ArrayChildren::default();
        for byte in [1u8, 2, 3] {
            children.get_or_insert(byte);
        }

        let first = children.drain().next().map(|(byte, _)| byte);
        assert_eq!(first, Some(1));
        assert_eq!(children.len(), 2);
        assert!(children.get(1).is_none());
        assert!(children.get(2).is_some());

        let mut hashed = HashChildren::default();
        hashed.get_or_insert(1);
        hashed.get_or_insert(2);
        drop(hashed.drain().next());
        assert!(hashed.is_empty());
    }

    #[test]
    fn test_debug_lists_child_bytes() {
        let mut children = ArrayChildren::default();
        children.get_or_insert(7);
        children.get_or_insert(3);
        assert_eq!(format!("{:?}", children), "{3, 7}");
    }

    #[test]
    fn test_array_children_iterate_in_byte_order() {
        let mut children = ArrayChildren::default();
        for byte in [200u8, 3, 64, 128, 1] {
            children.get_or_insert(byte);
        }
        let bytes: Vec<u8> = children.iter().map(|(byte, _)| byte).collect();
        assert_eq!(bytes, vec![1, 3, 64, 128, 200]);
    }
}
