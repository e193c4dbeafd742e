#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Map keyed by item ids (or context keys).
#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// A stable item identity.
///
/// With `std` this is any `Clone + Hash + Eq` type (ids are looked up in a `HashMap`); without it,
/// any `Clone + Ord` type (ids live in a `BTreeMap`).
#[cfg(feature = "std")]
pub trait ItemKey: Clone + core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: Clone + core::hash::Hash + Eq> ItemKey for K {}

#[cfg(not(feature = "std"))]
pub trait ItemKey: Clone + Ord {}
#[cfg(not(feature = "std"))]
impl<K: Clone + Ord> ItemKey for K {}
