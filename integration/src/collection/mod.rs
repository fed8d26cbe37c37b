//! Collection types used across the engine for small, hot-path maps.
//!
//! - [`FnvIndexMap`] / [`FnvIndexSet`] — `indexmap` collections keyed with the FNV hasher, used
//!   wherever keys are short (instrument symbols, broker ids, strategy instance ids) and
//!   insertion order matters for deterministic iteration (subscription registries, order books).

/// Fast IndexMap using FNV hasher for better performance with small keys.
pub type FnvIndexMap<K, V> = indexmap::IndexMap<K, V, fnv::FnvBuildHasher>;

/// Fast IndexSet using FNV hasher for better performance with small keys.
pub type FnvIndexSet<T> = indexmap::IndexSet<T, fnv::FnvBuildHasher>;
