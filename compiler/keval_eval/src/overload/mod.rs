//! Overload tables: multi-part names to overloads keyed by arity.
//!
//! A name is a sequence of keys (`K`), so a grammar can register names made
//! of several characters, several words, or anything else its tokens are
//! made of. Each name maps to an [`OverloadSet`] holding at most one
//! descriptor per arity.

use std::collections::BTreeMap;
use std::fmt;

use keval_trie::{ErasePolicy, KeySequenceTrie};

use crate::FunctionDescriptor;

/// Overloads of a single name, keyed by arity.
pub type OverloadSet<T> = BTreeMap<usize, FunctionDescriptor<T>>;

/// Function overloads registered by one recognizer.
///
/// Sets are never left empty: removing the last arity of a name removes the
/// name from the table.
pub struct OverloadTable<T, K> {
    trie: KeySequenceTrie<K, OverloadSet<T>>,
}

impl<T, K> OverloadTable<T, K> {
    pub fn new() -> Self {
        OverloadTable {
            trie: KeySequenceTrie::new(),
        }
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Read access to the underlying trie, for walks the table does not
    /// wrap (incremental matching, `search_until`).
    #[inline]
    pub fn trie(&self) -> &KeySequenceTrie<K, OverloadSet<T>> {
        &self.trie
    }

    /// Remove every name.
    pub fn clear(&mut self) {
        self.trie.clear();
    }
}

impl<T, K: Ord + Clone> OverloadTable<T, K> {
    /// Register `callable` as the `arity` overload of `name`.
    ///
    /// Creates the name on first use. An existing overload with the same
    /// arity is replaced and returned.
    pub fn add_overload<F>(
        &mut self,
        name: &[K],
        arity: usize,
        priority: i32,
        callable: F,
    ) -> Option<FunctionDescriptor<T>>
    where
        F: Fn(&[T]) -> T + Send + Sync + 'static,
    {
        self.add_descriptor(name, arity, FunctionDescriptor::new(priority, callable))
    }

    /// Register a prepared descriptor, e.g. one sharing its callable with
    /// another name.
    pub fn add_descriptor(
        &mut self,
        name: &[K],
        arity: usize,
        descriptor: FunctionDescriptor<T>,
    ) -> Option<FunctionDescriptor<T>> {
        self.trie
            .get_or_insert_with(name, OverloadSet::new)
            .insert(arity, descriptor)
    }

    /// Remove the `arity` overload of `name`.
    ///
    /// Returns `false` when the name or that arity is not registered. Longer
    /// names sharing `name` as a prefix are unaffected.
    pub fn remove_overload(&mut self, name: &[K], arity: usize) -> bool {
        let Some(set) = self.trie.get_mut(name) else {
            return false;
        };
        if set.remove(&arity).is_none() {
            return false;
        }
        if set.is_empty() {
            self.erase_name(name);
        }
        true
    }

    /// Remove every overload of `name`. Returns `false` if it had none.
    pub fn remove_name(&mut self, name: &[K]) -> bool {
        if !self.trie.contains_key(name) {
            return false;
        }
        self.erase_name(name);
        true
    }

    fn erase_name(&mut self, name: &[K]) {
        // Keep the subtree when longer names continue through this node.
        let policy = if self
            .trie
            .search(name)
            .is_some_and(|node| node.child_count() > 0)
        {
            ErasePolicy::PreserveChildren
        } else {
            ErasePolicy::PruneSubtree
        };
        self.trie.erase(name, policy);
    }

    /// Iterate over `(name, overloads)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<K>, &OverloadSet<T>)> {
        self.trie.iter()
    }
}

impl<T, K: Ord> OverloadTable<T, K> {
    /// All overloads of exactly `name`.
    pub fn overloads(&self, name: &[K]) -> Option<&OverloadSet<T>> {
        self.trie.get(name)
    }

    /// The overload of `name` taking exactly `arity` operands.
    pub fn resolve(&self, name: &[K], arity: usize) -> Option<&FunctionDescriptor<T>> {
        self.overloads(name)?.get(&arity)
    }

    /// The overload of `name` with the highest priority, with its arity.
    ///
    /// Ties go to the smaller arity.
    pub fn preferred(&self, name: &[K]) -> Option<(usize, &FunctionDescriptor<T>)> {
        preferred_overload(self.overloads(name)?)
    }

    /// The longest registered name at the head of `input`.
    ///
    /// Returns how many keys the name spans and its overloads.
    pub fn longest_match(&self, input: &[K]) -> Option<(usize, &OverloadSet<T>)> {
        self.trie.longest_match(input)
    }

    pub fn contains_name(&self, name: &[K]) -> bool {
        self.trie.contains_key(name)
    }
}

/// The highest-priority overload of a set; ties go to the smaller arity.
pub(crate) fn preferred_overload<T>(
    set: &OverloadSet<T>,
) -> Option<(usize, &FunctionDescriptor<T>)> {
    set.iter()
        .map(|(arity, descriptor)| (*arity, descriptor))
        .reduce(|best, next| {
            if next.1.priority() > best.1.priority() {
                next
            } else {
                best
            }
        })
}

impl<T, K> Default for OverloadTable<T, K> {
    fn default() -> Self {
        OverloadTable::new()
    }
}

impl<T, K: Clone> Clone for OverloadTable<T, K> {
    fn clone(&self) -> Self {
        OverloadTable {
            trie: self.trie.clone(),
        }
    }
}

impl<T, K: fmt::Debug> fmt::Debug for OverloadTable<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverloadTable")
            .field("trie", &self.trie)
            .finish()
    }
}
