use std::fmt;

use tracing::trace;

use crate::children::{ArrayChildren, Children, HashChildren};
use crate::error::{Error, Result};
use crate::iter::{Iter, Keys, PrefixIter, Values, Walk};
use crate::node::Node;

/// A `ByteTrie` maps byte-string keys to byte-string values, one trie level
/// per key byte.
///
/// The children of every node are stored in a [`Children`] strategy chosen by
/// the `C` parameter: [`HashChildren`] (the default) or [`ArrayChildren`].
///
/// Every node reachable from the root either holds a value or has at least
/// one child. Removing a key prunes the nodes that only existed for it.
///
/// # Examples
///
/// ```
/// use bytetrie::ByteTrie;
///
/// let mut trie: ByteTrie = ByteTrie::new();
///
/// trie.insert("foo", "bar").unwrap();
/// assert_eq!(trie.get("foo"), Some(&b"bar"[..]));
///
/// trie.insert("baz", [1u8]).unwrap();
/// assert_eq!(trie.remove("foo"), Some(b"bar".to_vec()));
/// assert_eq!(trie.get("foo"), None);
/// assert_eq!(trie.get("baz"), Some(&[1][..]));
///
/// // The zero-length key can never hold a value.
/// assert!(trie.insert("", "nope").is_err());
/// ```
pub struct ByteTrie<C: Children = HashChildren> {
    root: C,
    len: usize,
}

/// A trie whose children live in hash maps.
pub type HashTrie = ByteTrie<HashChildren>;

/// A trie whose children live in 256-slot arrays.
pub type ArrayTrie = ByteTrie<ArrayChildren>;

/// What `remove` has to do once the value is taken.
enum Removal {
    /// The terminal node still has children and stays as a waypoint.
    ClearValue,
    /// Unlink the branch starting at this depth of the key.
    Detach(usize),
}

impl<C: Children> Default for ByteTrie<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A node whose copy is being assembled: its children are copied first,
/// then it is attached to its parent's copy.
struct CloneFrame<'a, C: Children> {
    byte: u8,
    value: Option<Vec<u8>>,
    pending: Vec<(u8, &'a Node<C>)>,
    copied: C,
}

impl<'a, C: Children> CloneFrame<'a, C> {
    fn new(byte: u8, value: Option<Vec<u8>>, children: Option<&'a C>) -> Self {
        CloneFrame {
            byte,
            value,
            pending: children.map_or_else(Vec::new, |children| children.iter().collect()),
            copied: C::default(),
        }
    }

    fn attach(&mut self, child: CloneFrame<'a, C>) {
        let node = self.copied.get_or_insert(child.byte);
        node.value = child.value;
        if !child.copied.is_empty() {
            node.children = Some(child.copied);
        }
    }
}

/// Copies the tree bottom-up from an explicit stack, so the depth of the
/// trie does not bound the call depth.
impl<C: Children> Clone for ByteTrie<C> {
    fn clone(&self) -> Self {
        let mut frames = vec![CloneFrame::new(0, None, Some(&self.root))];

        let root = loop {
            let next = frames.last_mut().and_then(|frame| frame.pending.pop());
            if let Some((byte, node)) = next {
                frames.push(CloneFrame::new(byte, node.value.clone(), node.children.as_ref()));
                continue;
            }

            let Some(done) = frames.pop() else {
                break C::default();
            };
            match frames.last_mut() {
                Some(parent) => parent.attach(done),
                None => break done.copied,
            }
        };

        ByteTrie {
            root,
            len: self.len,
        }
    }
}

impl<C: Children> fmt::Debug for ByteTrie<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map_debug = f.debug_map();

        for (key, value) in self.iter() {
            let key_display = match std::str::from_utf8(&key) {
                Ok(s) => s.to_string(),
                Err(_) => format!("{:?}", key),
            };

            map_debug.entry(&key_display, &value);
        }

        map_debug.finish()
    }
}

impl<C: Children> PartialEq for ByteTrie<C> {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }

        self.iter().all(|(key, value)| other.get(&key) == Some(value))
    }
}

impl<C: Children> Eq for ByteTrie<C> {}

impl<C: Children> ByteTrie<C> {
    /// Creates a new empty `ByteTrie`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::ArrayTrie;
    /// let trie = ArrayTrie::new();
    /// assert!(trie.is_empty());
    /// ```
    pub fn new() -> Self {
        ByteTrie {
            root: C::default(),
            len: 0,
        }
    }

    /// Returns the number of keys holding a value.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no key holds a value.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every key, emptying the root mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("a", "1").unwrap();
    /// trie.insert("ab", "2").unwrap();
    ///
    /// trie.clear();
    /// assert!(trie.is_empty());
    /// assert_eq!(trie.node_count(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.root = C::default();
        self.len = 0;
    }

    /// Returns the value stored under `key`.
    ///
    /// A stored empty value is `Some(&[])`, distinct from `None`. The
    /// zero-length key is never found, since nothing can be stored there.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("car", "A").unwrap();
    /// trie.insert("cart", "").unwrap();
    ///
    /// assert_eq!(trie.get("car"), Some(&b"A"[..]));
    /// assert_eq!(trie.get("cart"), Some(&[][..]));
    /// assert_eq!(trie.get("ca"), None);
    /// assert_eq!(trie.get(""), None);
    /// ```
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&[u8]> {
        self.find(key.as_ref())?.value.as_deref()
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("k", "v").unwrap();
    ///
    /// if let Some(value) = trie.get_mut("k") {
    ///     value.extend_from_slice(b"alue");
    /// }
    /// assert_eq!(trie.get("k"), Some(&b"value"[..]));
    /// ```
    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut Vec<u8>> {
        self.find_mut(key.as_ref())?.value.as_mut()
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Missing nodes along the key's path are created. Re-inserting an
    /// existing key only replaces the value at its node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyKey`] for a zero-length key, leaving the trie
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::{Error, HashTrie};
    /// let mut trie = HashTrie::new();
    /// trie.insert("a", "1").unwrap();
    /// trie.insert("a", "2").unwrap();
    /// assert_eq!(trie.get("a"), Some(&b"2"[..]));
    /// assert_eq!(trie.len(), 1);
    ///
    /// assert_eq!(trie.insert("", "x"), Err(Error::EmptyKey));
    /// assert_eq!(trie.len(), 1);
    /// ```
    #[doc(alias = "set")]
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Result<()>
    where
        K: AsRef<[u8]>,
        V: Into<Vec<u8>>,
    {
        let key = key.as_ref();
        let (node, created) = self.find_or_create(key)?;
        let replaced = node.value.replace(value.into()).is_some();
        if !replaced {
            self.len += 1;
        }

        trace!(key_len = key.len(), created, replaced, "stored value");
        Ok(())
    }

    /// Removes the value stored under `key` and returns it.
    ///
    /// A node left without a value and without children is unlinked from
    /// its parent, and so is every ancestor that only existed for it. A node
    /// that still has children keeps them and only loses its value. Removing
    /// a missing key changes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("car", "A").unwrap();
    /// trie.insert("cart", "B").unwrap();
    ///
    /// assert_eq!(trie.remove("car"), Some(b"A".to_vec()));
    /// assert_eq!(trie.get("car"), None);
    /// assert_eq!(trie.get("cart"), Some(&b"B"[..]));
    ///
    /// assert_eq!(trie.remove("car"), None);
    /// ```
    #[doc(alias = "del")]
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<Vec<u8>> {
        let key = key.as_ref();
        let removal = self.plan_removal(key)?;

        let value = self.find_mut(key)?.value.take();
        self.len -= 1;

        match removal {
            Removal::ClearValue => {
                trace!(key_len = key.len(), "cleared waypoint value");
            }
            Removal::Detach(depth) => {
                self.detach(&key[..=depth]);
                trace!(
                    key_len = key.len(),
                    pruned = key.len() - depth,
                    "pruned branch"
                );
            }
        }

        value
    }

    /// Returns the number of nodes reachable from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("ab", "1").unwrap();
    /// trie.insert("ac", "2").unwrap();
    /// assert_eq!(trie.node_count(), 3);
    ///
    /// trie.insert("ab", "3").unwrap();
    /// assert_eq!(trie.node_count(), 3);
    /// ```
    pub fn node_count(&self) -> usize {
        let mut stack: Vec<&Node<C>> = self.root.iter().map(|(_, node)| node).collect();
        let mut count = 0;

        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = &node.children {
                stack.extend(children.iter().map(|(_, child)| child));
            }
        }

        count
    }

    /// Returns an iterator over the key-value pairs of the trie.
    ///
    /// Order follows the children strategy and is not otherwise specified.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::ArrayTrie;
    /// let mut trie = ArrayTrie::new();
    /// trie.insert("b", "2").unwrap();
    /// trie.insert("a", "1").unwrap();
    ///
    /// let mut pairs: Vec<_> = trie.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, vec![(b"a".to_vec(), &b"1"[..]), (b"b".to_vec(), &b"2"[..])]);
    /// ```
    pub fn iter(&self) -> Iter<'_, C> {
        Iter {
            walk: Walk::from_root(&self.root),
            remaining: self.len,
        }
    }

    /// Returns an iterator over the keys of the trie.
    pub fn keys(&self) -> Keys<'_, C> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the trie.
    pub fn values(&self) -> Values<'_, C> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over the pairs whose key starts with `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("car", "A").unwrap();
    /// trie.insert("cart", "B").unwrap();
    /// trie.insert("dog", "C").unwrap();
    ///
    /// let mut keys: Vec<_> = trie.prefix_iter("car").map(|(key, _)| key).collect();
    /// keys.sort();
    /// assert_eq!(keys, vec![b"car".to_vec(), b"cart".to_vec()]);
    /// ```
    pub fn prefix_iter<K: AsRef<[u8]>>(&self, prefix: K) -> PrefixIter<'_, C> {
        let prefix = prefix.as_ref();
        let walk = if prefix.is_empty() {
            Walk::from_root(&self.root)
        } else {
            match self.find(prefix) {
                Some(node) => Walk::from_node(prefix.to_vec(), node),
                None => Walk::empty(),
            }
        };

        PrefixIter { walk }
    }

    /// Returns `true` if any stored key starts with `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bytetrie::HashTrie;
    /// let mut trie = HashTrie::new();
    /// trie.insert("apple", "1").unwrap();
    ///
    /// assert!(trie.starts_with("app"));
    /// assert!(!trie.starts_with("b"));
    /// ```
    pub fn starts_with<K: AsRef<[u8]>>(&self, prefix: K) -> bool {
        let prefix = prefix.as_ref();
        if prefix.is_empty() {
            return !self.is_empty();
        }
        // Every reachable node holds a value or leads to one.
        self.find(prefix).is_some()
    }

    fn find(&self, key: &[u8]) -> Option<&Node<C>> {
        let (&first, rest) = key.split_first()?;
        let mut node = self.root.get(first)?;

        for &byte in rest {
            node = node.children.as_ref()?.get(byte)?;
        }

        Some(node)
    }

    fn find_mut(&mut self, key: &[u8]) -> Option<&mut Node<C>> {
        let (&first, rest) = key.split_first()?;
        let mut node = self.root.get_mut(first)?;

        for &byte in rest {
            node = node.children.as_mut()?.get_mut(byte)?;
        }

        Some(node)
    }

    /// Descends along `key`, creating missing nodes, and returns the terminal
    /// node with the number of nodes created on the way.
    fn find_or_create(&mut self, key: &[u8]) -> Result<(&mut Node<C>, usize)> {
        let (&last, path) = key.split_last().ok_or(Error::EmptyKey)?;

        // Reachable nodes are never vacant, so a vacant one was just created.
        let mut created = 0;
        let mut children = &mut self.root;
        for &byte in path {
            let node = children.get_or_insert(byte);
            if node.is_vacant() {
                created += 1;
            }
            children = node.children_or_init();
        }

        let node = children.get_or_insert(last);
        if node.is_vacant() {
            created += 1;
        }
        Ok((node, created))
    }

    /// Walks `key` without mutating and decides how much of its path a
    /// removal frees. `None` when there is no value to remove.
    fn plan_removal(&self, key: &[u8]) -> Option<Removal> {
        let (&first, rest) = key.split_first()?;
        let mut node = self.root.get(first)?;
        let mut detach_from = 0;

        for (depth, &byte) in rest.iter().enumerate() {
            if node.value.is_some() || node.child_count() > 1 {
                detach_from = depth + 1;
            }
            node = node.children.as_ref()?.get(byte)?;
        }

        node.value.as_ref()?;

        if node.is_leaf() {
            Some(Removal::Detach(detach_from))
        } else {
            Some(Removal::ClearValue)
        }
    }

    /// Unlinks the node at the end of `path` from its parent.
    fn detach(&mut self, path: &[u8]) -> Option<Node<C>> {
        let (&byte, parent_path) = path.split_last()?;
        if parent_path.is_empty() {
            return self.root.remove(byte);
        }

        let parent = self.find_mut(parent_path)?;
        let detached = parent.children.as_mut()?.remove(byte);
        parent.release_empty_children();
        debug_assert!(!parent.is_vacant());

        detached
    }
}
