//! Fast hash map and hash set type aliases.
//!
//! This module provides type aliases for [`FxHashMap`] and [`FxHashSet`]
//! from the `rustc-hash` crate. These use the Fx hash algorithm which is
//! approximately 2x faster than the standard library's `HashMap` and
//! `HashSet` for string keys, which is what the scanner's observed-path
//! bookkeeping is made of.
//!
//! Denial-of-service resistance is not required here: every key comes from
//! the local filesystem, not from the network.

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new empty [`FxHashSet`].
///
/// Equivalent to `FxHashSet::default()` but more ergonomic in contexts
/// where type inference needs a nudge.
///
/// # Examples
///
/// ```
/// use shelf_core::hash::fx_hash_set;
///
/// let set: shelf_core::FxHashSet<String> = fx_hash_set();
/// assert!(set.is_empty());
/// ```
#[inline]
#[must_use]
pub fn fx_hash_set<V>() -> FxHashSet<V> {
    FxHashSet::default()
}
