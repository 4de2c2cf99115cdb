//! Hash collections used for identifier lookups.
//!
//! Lookups only: nothing in the engine iterates these maps to produce output,
//! so the edit scripts stay deterministic whichever hasher is active.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
    pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
}

#[inline]
pub(crate) fn map_with_capacity<K, V>(capacity: usize) -> map::HashMap<K, V> {
    map::HashMap::with_capacity_and_hasher(capacity, Default::default())
}
