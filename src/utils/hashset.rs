//! The hash-set used for membership tests.

/// Hashset using [`hashbrown::HashSet`].
pub type HashSet<K> = hashbrown::hash_set::HashSet<K>;
