//! Trie nodes.
//!
//! A node owns its payload and its children outright. Children are kept in a
//! `BTreeMap` so iteration follows the ordering of `K`.

use std::collections::BTreeMap;

/// A single trie node: an optional payload and the owned subtrees below it.
///
/// A node without a payload may still exist when it has descendants; it is
/// simply an interior point of some longer key sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrieNode<K, V> {
    pub(crate) value: Option<V>,
    pub(crate) children: BTreeMap<K, TrieNode<K, V>>,
}

impl<K, V> TrieNode<K, V> {
    /// Create an empty node (no payload, no children).
    pub fn new() -> Self {
        TrieNode {
            value: None,
            children: BTreeMap::new(),
        }
    }

    /// Create a childless node holding `value`.
    pub fn with_value(value: V) -> Self {
        TrieNode {
            value: Some(value),
            children: BTreeMap::new(),
        }
    }

    /// The payload stored at this node, if any.
    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Mutable access to the payload stored at this node, if any.
    #[inline]
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.value.as_mut()
    }

    /// Whether a payload is stored at this node.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Replace the payload, returning the previous one.
    pub fn set_value(&mut self, value: V) -> Option<V> {
        self.value.replace(value)
    }

    /// Remove and return the payload, keeping the children.
    pub fn take_value(&mut self) -> Option<V> {
        self.value.take()
    }

    /// Iterate over the direct children in key order.
    pub fn children(&self) -> impl Iterator<Item = (&K, &TrieNode<K, V>)> {
        self.children.iter()
    }

    /// Number of direct children.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// A node with neither payload nor children.
    ///
    /// Such nodes are pruned on erase; only the root may stay in this state.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Number of payloads stored in this subtree, this node included.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += usize::from(node.value.is_some());
            pending.extend(node.children.values());
        }
        count
    }
}

impl<K: Ord, V> TrieNode<K, V> {
    /// Builder-style: attach `child` under `key`, replacing any subtree there.
    ///
    /// Used to assemble detached subtrees for
    /// [`KeySequenceTrie::insert_node`](crate::KeySequenceTrie::insert_node).
    pub fn with_child(mut self, key: K, child: TrieNode<K, V>) -> Self {
        self.children.insert(key, child);
        self
    }

    /// The direct child reached through `key`.
    #[inline]
    pub fn child(&self, key: &K) -> Option<&TrieNode<K, V>> {
        self.children.get(key)
    }

    /// Mutable access to the direct child reached through `key`.
    #[inline]
    pub fn child_mut(&mut self, key: &K) -> Option<&mut TrieNode<K, V>> {
        self.children.get_mut(key)
    }
}

impl<K, V> Default for TrieNode<K, V> {
    fn default() -> Self {
        TrieNode::new()
    }
}

// Children are detached level by level so dropping a long key chain does
// not recurse once per key.
impl<K, V> Drop for TrieNode<K, V> {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut pending = vec![std::mem::take(&mut self.children)];
        while let Some(children) = pending.pop() {
            for (_, mut child) in children {
                if !child.children.is_empty() {
                    pending.push(std::mem::take(&mut child.children));
                }
            }
        }
    }
}
