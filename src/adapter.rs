//! ValueAdapter: injected hash/equals/deep_copy for opaque host values.
//!
//! The map bridges two independently managed heaps (the caller's and the
//! per-entry regions), so it never interprets a value itself. Hashing,
//! equality and copying are supplied by the host through this trait.

use crate::arena::{AllocError, Region};
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

pub trait ValueAdapter {
    /// The opaque host value type, used for both keys and values.
    type Value;

    /// Hash a value. Must be consistent with `equals`: values that compare
    /// equal must hash equal. Only ever invoked on keys the caller passes
    /// in; keys already stored keep the hash computed when they were copied.
    fn hash(&self, value: &Self::Value) -> u64;

    fn equals(&self, a: &Self::Value, b: &Self::Value) -> bool;

    /// Produce a copy of `value` owned by `target`. Implementations must
    /// charge the copy's footprint via [`Region::reserve`] before
    /// materializing it; a reservation failure aborts the copy and must
    /// leave `value` untouched.
    fn deep_copy(
        &self,
        value: &Self::Value,
        target: &mut Region<Self::Value>,
    ) -> Result<Self::Value, AllocError>;
}

/// Adapter for host values that already carry `Clone + Hash + Eq`.
///
/// Copies charge the shallow size of `V` against the target region;
/// adapters for values with large heap payloads should charge their true
/// footprint instead.
pub struct CloneAdapter<V, S = RandomState> {
    hasher: S,
    _marker: PhantomData<fn(V) -> V>,
}

impl<V> CloneAdapter<V> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<V> Default for CloneAdapter<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> CloneAdapter<V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            _marker: PhantomData,
        }
    }
}

impl<V, S: Clone> Clone for CloneAdapter<V, S> {
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<V, S> ValueAdapter for CloneAdapter<V, S>
where
    V: Clone + Hash + Eq,
    S: BuildHasher,
{
    type Value = V;

    fn hash(&self, value: &V) -> u64 {
        self.hasher.hash_one(value)
    }

    fn equals(&self, a: &V, b: &V) -> bool {
        a == b
    }

    fn deep_copy(&self, value: &V, target: &mut Region<V>) -> Result<V, AllocError> {
        target.reserve(core::mem::size_of::<V>())?;
        Ok(value.clone())
    }
}
