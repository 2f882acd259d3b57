//! The hash-map used for keyed lookups.
//!
//! Its iteration order is unspecified: algorithms that must be deterministic
//! only use it for lookups, never to drive an ordering.

pub use hashbrown::hash_map::Entry;

/// Hashmap using [`hashbrown::HashMap`].
pub type HashMap<K, V> = hashbrown::hash_map::HashMap<K, V>;
