use std::fmt;

use crate::children::Children;

/// One position along some key's byte path.
///
/// A node that never had a child owns no children container; it is
/// allocated on the first child insert and released again when the last
/// child is pruned.
pub struct Node<C: Children> {
    pub(crate) value: Option<Vec<u8>>,
    pub(crate) children: Option<C>,
}

impl<C: Children> Default for Node<C> {
    fn default() -> Self {
        Node {
            value: None,
            children: None,
        }
    }
}

impl<C: Children> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("children", &self.child_count())
            .finish()
    }
}

/// Tears the subtree down from an explicit stack so that dropping a chain
/// as deep as the longest key does not recurse once per level.
impl<C: Children> Drop for Node<C> {
    fn drop(&mut self) {
        let Some(mut children) = self.children.take() else {
            return;
        };

        let mut stack: Vec<Node<C>> = children.drain().map(|(_, node)| node).collect();
        while let Some(mut node) = stack.pop() {
            if let Some(mut grandchildren) = node.children.take() {
                stack.extend(grandchildren.drain().map(|(_, child)| child));
            }
        }
    }
}

impl<C: Children> Node<C> {
    /// The value stored at this node, if a key terminates here.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// The children of this node, if any were ever linked.
    pub fn children(&self) -> Option<&C> {
        self.children.as_ref()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, C::len)
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Neither valued nor a waypoint: such a node must not stay reachable.
    pub(crate) fn is_vacant(&self) -> bool {
        self.value.is_none() && self.is_leaf()
    }

    pub(crate) fn children_or_init(&mut self) -> &mut C {
        self.children.get_or_insert_with(C::default)
    }

    pub(crate) fn release_empty_children(&mut self) {
        if self.children.as_ref().is_some_and(C::is_empty) {
            self.children = None;
        }
    }
}

// Bit manipulation utilities for the 256-bit presence bitmap
pub(crate) fn set_bit(a: &mut [u64; 4], k: u8) {
    a[(k / 64) as usize] |= 1u64 << (k % 64);
}

pub(crate) fn clear_bit(a: &mut [u64; 4], k: u8) {
    a[(k / 64) as usize] &= !(1u64 << (k % 64));
}

pub(crate) fn test_bit(a: &[u64; 4], k: u8) -> bool {
    (a[(k / 64) as usize] >> (k % 64)) & 0x01 != 0
}

pub(crate) fn count_bits(a: &[u64; 4]) -> usize {
    a.iter().map(|word| word.count_ones() as usize).sum()
}
