//! Keval Trie - key-sequence trie for the keval evaluation core.
//!
//! Maps an ordered sequence of key elements (`K`) to a payload (`V`). The
//! evaluation engine stores function overloads under multi-part names in this
//! structure, but nothing here knows about functions: any totally ordered
//! key type works (characters, words, interned symbols).
//!
//! # Structure
//!
//! - [`TrieNode`]: an optional payload plus an ordered map of owned children.
//! - [`KeySequenceTrie`]: owns the root node and exposes the operations.
//!
//! # Operations
//!
//! | Operation | Behavior |
//! |-----------|----------|
//! | [`insert`](KeySequenceTrie::insert) | Create the path on demand, overwrite the payload |
//! | [`insert_node`](KeySequenceTrie::insert_node) | Overwrite the payload and merge in a detached subtree |
//! | [`search`](KeySequenceTrie::search) | Terminal node of an existing path |
//! | [`search_until`](KeySequenceTrie::search_until) | Deepest node reached and how far the walk got |
//! | [`erase`](KeySequenceTrie::erase) | Clear a payload, optionally pruning empty ancestors |
//! | [`longest_match`](KeySequenceTrie::longest_match) | Deepest payload-bearing prefix of an input slice |
//!
//! # Invariant
//!
//! Apart from the root, no node is both payload-less and childless after an
//! insert or a pruning erase. `ErasePolicy::PreserveChildren` clears only the
//! payload and never prunes, so callers that use it on leaves accept empty
//! leaves until the next pruning erase along that path.
//!
//! Lookups borrow from the trie; the borrow checker keeps them from
//! outliving the next mutation.

mod node;
mod trie;

pub use node::TrieNode;
pub use trie::{ErasePolicy, Iter, KeySequenceTrie, SearchUntil};
