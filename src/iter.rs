use std::iter::FusedIterator;

use crate::children::Children;
use crate::node::Node;

/// Depth-first walk over a subtree, yielding every valued node with the key
/// that leads to it.
///
/// One key buffer is shared by the whole walk: each stack entry records the
/// key length of its parent, so the buffer is truncated back to it before the
/// entry's byte is pushed.
pub(crate) struct Walk<'a, C: Children> {
    key: Vec<u8>,
    stack: Vec<(usize, u8, &'a Node<C>)>,
}

impl<'a, C: Children> Walk<'a, C> {
    pub(crate) fn empty() -> Self {
        Walk {
            key: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub(crate) fn from_root(root: &'a C) -> Self {
        let stack = root.iter().map(|(byte, node)| (0, byte, node)).collect();
        Walk {
            key: Vec::new(),
            stack,
        }
    }

    /// Starts at `node`, which is reached by the non-empty `key`.
    pub(crate) fn from_node(mut key: Vec<u8>, node: &'a Node<C>) -> Self {
        let Some(byte) = key.pop() else {
            return Self::empty();
        };
        let depth = key.len();
        Walk {
            key,
            stack: vec![(depth, byte, node)],
        }
    }
}

impl<'a, C: Children> Iterator for Walk<'a, C> {
    type Item = (Vec<u8>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, byte, node)) = self.stack.pop() {
            self.key.truncate(depth);
            self.key.push(byte);

            if let Some(children) = &node.children {
                let depth = self.key.len();
                self.stack
                    .extend(children.iter().map(|(byte, child)| (depth, byte, child)));
            }

            if let Some(value) = node.value.as_deref() {
                return Some((self.key.clone(), value));
            }
        }
        None
    }
}

/// An iterator over the key-value pairs of a `ByteTrie`.
///
/// This struct is created by the [`iter`] method on [`ByteTrie`].
///
/// [`iter`]: crate::ByteTrie::iter
/// [`ByteTrie`]: crate::ByteTrie
pub struct Iter<'a, C: Children> {
    pub(crate) walk: Walk<'a, C>,
    pub(crate) remaining: usize,
}

impl<'a, C: Children> Iterator for Iter<'a, C> {
    type Item = (Vec<u8>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.walk.next()?;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<C: Children> ExactSizeIterator for Iter<'_, C> {}

impl<C: Children> FusedIterator for Iter<'_, C> {}

/// An iterator over the keys of a `ByteTrie`.
///
/// This struct is created by the [`keys`] method on [`ByteTrie`].
///
/// [`keys`]: crate::ByteTrie::keys
/// [`ByteTrie`]: crate::ByteTrie
pub struct Keys<'a, C: Children> {
    pub(crate) inner: Iter<'a, C>,
}

impl<C: Children> Iterator for Keys<'_, C> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C: Children> ExactSizeIterator for Keys<'_, C> {}

impl<C: Children> FusedIterator for Keys<'_, C> {}

/// An iterator over the values of a `ByteTrie`.
///
/// This struct is created by the [`values`] method on [`ByteTrie`].
///
/// [`values`]: crate::ByteTrie::values
/// [`ByteTrie`]: crate::ByteTrie
pub struct Values<'a, C: Children> {
    pub(crate) inner: Iter<'a, C>,
}

impl<'a, C: Children> Iterator for Values<'a, C> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C: Children> ExactSizeIterator for Values<'_, C> {}

impl<C: Children> FusedIterator for Values<'_, C> {}

/// An iterator over the key-value pairs whose key starts with a prefix.
///
/// This struct is created by the [`prefix_iter`] method on [`ByteTrie`].
///
/// [`prefix_iter`]: crate::ByteTrie::prefix_iter
/// [`ByteTrie`]: crate::ByteTrie
pub struct PrefixIter<'a, C: Children> {
    pub(crate) walk: Walk<'a, C>,
}

impl<'a, C: Children> Iterator for PrefixIter<'a, C> {
    type Item = (Vec<u8>, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }
}

impl<C: Children> FusedIterator for PrefixIter<'_, C> {}
