//! The key-sequence trie and its operations.

use std::collections::btree_map;

use crate::TrieNode;

/// What [`KeySequenceTrie::erase`] does with the subtree below the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErasePolicy {
    /// Remove the target node with its whole subtree, then prune ancestors
    /// left without payload or children.
    #[default]
    PruneSubtree,
    /// Clear only the target's payload. Nothing is removed from the tree.
    PreserveChildren,
}

/// Outcome of [`KeySequenceTrie::search_until`].
#[derive(Debug)]
pub struct SearchUntil<'a, K, V> {
    /// The deepest node reached: the terminal node when `found`, otherwise
    /// the last node whose child lookup failed.
    pub node: &'a TrieNode<K, V>,
    /// Number of keys consumed before the walk stopped.
    pub depth: usize,
    /// Whether every key of the sequence was present.
    pub found: bool,
}

/// A trie keyed by sequences of `K`, holding a payload `V` per sequence.
///
/// The empty sequence addresses the root, so it can hold a payload too.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySequenceTrie<K, V> {
    root: TrieNode<K, V>,
}

impl<K, V> KeySequenceTrie<K, V> {
    /// Create an empty trie.
    pub fn new() -> Self {
        KeySequenceTrie {
            root: TrieNode::new(),
        }
    }

    /// The root node (addressed by the empty key sequence).
    #[inline]
    pub fn root(&self) -> &TrieNode<K, V> {
        &self.root
    }

    /// Number of stored payloads.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Whether the trie stores no payload at all.
    ///
    /// After pruning erases this also means the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root.len() == 0
    }

    /// Drop every node and payload.
    pub fn clear(&mut self) {
        self.root = TrieNode::new();
    }

    /// Iterate over `(key sequence, payload)` pairs in key order, parents
    /// before their descendants.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            root: Some(&self.root),
            frames: Vec::new(),
            path: Vec::new(),
        }
    }
}

impl<K: Ord + Clone, V> KeySequenceTrie<K, V> {
    /// Walk `keys` from the root, creating missing nodes on the way.
    fn node_or_create(&mut self, keys: &[K]) -> &mut TrieNode<K, V> {
        let mut current = &mut self.root;
        for key in keys {
            current = current.children.entry(key.clone()).or_default();
        }
        current
    }

    /// Store `value` under `keys`, returning the payload it replaced.
    ///
    /// Intermediate nodes are created on demand. Existing children of the
    /// terminal node are left untouched.
    pub fn insert(&mut self, keys: &[K], value: V) -> Option<V> {
        self.node_or_create(keys).value.replace(value)
    }

    /// Graft a detached node at `keys`.
    ///
    /// The terminal node takes over `node`'s payload (clearing its own when
    /// `node` has none) and gains `node`'s children; a child key present on
    /// both sides is replaced by the incoming subtree. Grafting an empty node
    /// onto a childless leaf removes that leaf, so no empty node is left
    /// behind.
    pub fn insert_node(&mut self, keys: &[K], mut node: TrieNode<K, V>) {
        let target = self.node_or_create(keys);
        target.value = node.value.take();
        let incoming = std::mem::take(&mut node.children);
        target.children.extend(incoming);
        if target.is_empty() && !keys.is_empty() {
            self.erase(keys, ErasePolicy::PruneSubtree);
        }
    }

    /// The payload under `keys`, creating it with `default` when absent.
    pub fn get_or_insert_with(&mut self, keys: &[K], default: impl FnOnce() -> V) -> &mut V {
        self.node_or_create(keys).value.get_or_insert_with(default)
    }

    /// Remove the node at `keys` according to `policy`.
    ///
    /// With the empty sequence the root's payload is cleared and, under
    /// [`ErasePolicy::PruneSubtree`], all of its children as well; this always
    /// succeeds. Otherwise returns `false` (leaving the trie unchanged) when
    /// the path does not exist.
    pub fn erase(&mut self, keys: &[K], policy: ErasePolicy) -> bool {
        let Some((last, parent_keys)) = keys.split_last() else {
            self.root.value = None;
            if policy == ErasePolicy::PruneSubtree {
                self.root.children.clear();
            }
            return true;
        };

        if policy == ErasePolicy::PreserveChildren {
            return match self.search_mut(keys) {
                Some(node) => {
                    node.value = None;
                    true
                }
                None => false,
            };
        }

        // Find the shallowest ancestor that only exists to lead to the target:
        // every node from there down to the target's parent is payload-less
        // with a single child. Cutting above it prunes the whole chain.
        let mut cut = keys.len();
        let mut run_start: Option<usize> = None;
        let mut node = &self.root;
        for (depth, key) in parent_keys.iter().enumerate() {
            let Some(child) = node.children.get(key) else {
                return false;
            };
            let child_depth = depth + 1;
            if child.value.is_none() && child.children.len() == 1 {
                run_start.get_or_insert(child_depth);
            } else {
                run_start = None;
            }
            node = child;
        }
        if !node.children.contains_key(last) {
            return false;
        }
        if let Some(start) = run_start {
            cut = start;
        }

        let Some(parent) = self.search_mut(&keys[..cut - 1]) else {
            return false;
        };
        parent.children.remove(&keys[cut - 1]).is_some()
    }
}

impl<K: Ord, V> KeySequenceTrie<K, V> {
    /// The terminal node of `keys`, or `None` when any key is missing.
    ///
    /// A returned node may carry no payload; use [`get`](Self::get) when only
    /// payloads matter.
    pub fn search(&self, keys: &[K]) -> Option<&TrieNode<K, V>> {
        keys.iter()
            .try_fold(&self.root, |node, key| node.children.get(key))
    }

    /// Mutable variant of [`search`](Self::search).
    pub fn search_mut(&mut self, keys: &[K]) -> Option<&mut TrieNode<K, V>> {
        let mut current = &mut self.root;
        for key in keys {
            current = current.children.get_mut(key)?;
        }
        Some(current)
    }

    /// Walk `keys` as far as the trie allows.
    ///
    /// Unlike [`search`](Self::search) this reports the deepest existing
    /// prefix when the full path is absent.
    pub fn search_until(&self, keys: &[K]) -> SearchUntil<'_, K, V> {
        let mut node = &self.root;
        for (depth, key) in keys.iter().enumerate() {
            match node.children.get(key) {
                Some(child) => node = child,
                None => {
                    return SearchUntil {
                        node,
                        depth,
                        found: false,
                    }
                }
            }
        }
        SearchUntil {
            node,
            depth: keys.len(),
            found: true,
        }
    }

    /// The payload stored under exactly `keys`.
    pub fn get(&self, keys: &[K]) -> Option<&V> {
        self.search(keys).and_then(TrieNode::value)
    }

    /// Mutable access to the payload stored under exactly `keys`.
    pub fn get_mut(&mut self, keys: &[K]) -> Option<&mut V> {
        self.search_mut(keys).and_then(TrieNode::value_mut)
    }

    /// Whether a payload is stored under exactly `keys`.
    pub fn contains_key(&self, keys: &[K]) -> bool {
        self.get(keys).is_some()
    }

    /// The longest non-empty prefix of `input` that carries a payload.
    ///
    /// Returns the prefix length and the payload. This is the lookup a
    /// recognizer performs to resolve a multi-part name at the head of its
    /// remaining input.
    pub fn longest_match(&self, input: &[K]) -> Option<(usize, &V)> {
        let mut best = None;
        let mut node = &self.root;
        for (depth, key) in input.iter().enumerate() {
            let Some(child) = node.children.get(key) else {
                break;
            };
            if let Some(value) = child.value.as_ref() {
                best = Some((depth + 1, value));
            }
            node = child;
        }
        best
    }
}

impl<K, V> Default for KeySequenceTrie<K, V> {
    fn default() -> Self {
        KeySequenceTrie::new()
    }
}

impl<K: Ord + Clone, V> FromIterator<(Vec<K>, V)> for KeySequenceTrie<K, V> {
    fn from_iter<I: IntoIterator<Item = (Vec<K>, V)>>(iter: I) -> Self {
        let mut trie = KeySequenceTrie::new();
        trie.extend(iter);
        trie
    }
}

impl<K: Ord + Clone, V> Extend<(Vec<K>, V)> for KeySequenceTrie<K, V> {
    fn extend<I: IntoIterator<Item = (Vec<K>, V)>>(&mut self, iter: I) {
        for (keys, value) in iter {
            self.insert(&keys, value);
        }
    }
}

impl<'a, K: Clone, V> IntoIterator for &'a KeySequenceTrie<K, V> {
    type Item = (Vec<K>, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pre-order iterator over the payloads of a [`KeySequenceTrie`].
///
/// Created by [`KeySequenceTrie::iter`].
pub struct Iter<'a, K, V> {
    root: Option<&'a TrieNode<K, V>>,
    /// One child iterator per level of the current path.
    frames: Vec<btree_map::Iter<'a, K, TrieNode<K, V>>>,
    path: Vec<K>,
}

impl<'a, K: Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (Vec<K>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            self.frames.push(root.children.iter());
            if let Some(value) = root.value.as_ref() {
                return Some((Vec::new(), value));
            }
        }
        loop {
            let frame = self.frames.last_mut()?;
            if let Some((key, child)) = frame.next() {
                self.path.push(key.clone());
                self.frames.push(child.children.iter());
                if let Some(value) = child.value.as_ref() {
                    return Some((self.path.clone(), value));
                }
            } else {
                self.frames.pop();
                self.path.pop();
            }
        }
    }
}
