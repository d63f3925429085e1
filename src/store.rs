//! Store: the externally visible handle combining table and access guard.
//!
//! All public operations enter through the guard, drive the table, and
//! release the guard on every exit path. The table sits in an
//! `UnsafeCell`; the `AccessPermit` is the proof that dereferencing it is
//! exclusive for the duration of one operation.

use crate::adapter::ValueAdapter;
use crate::arena::AllocError;
use crate::guard::{AccessDenied, AccessGuard, OwnerToken};
use crate::table::TableEngine;
use core::cell::UnsafeCell;
use thiserror::Error;

/// Store format version, recorded on every store for host upgrade hooks.
pub const STORE_VERSION: u32 = 0;

/// Failure taxonomy of the operation surface. A key miss is not a
/// failure; see [`Lookup`] and [`Removal`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    #[error(transparent)]
    Allocation(#[from] AllocError),
}

/// Outcome of [`Store::lookup`]. A miss is an expected result, never an
/// error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Lookup<V> {
    Found(V),
    NotFound,
}

/// Outcome of [`Store::del`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Removal {
    Removed,
    NotFound,
}

/// Creation options. `shared` selects the mutex discipline; absent, the
/// store is bound to the creating context's identity. `region_limit`
/// bounds the bytes one entry's arena may hold.
#[derive(Copy, Clone, Debug, Default)]
pub struct StoreOptions {
    pub shared: bool,
    pub region_limit: Option<usize>,
}

impl StoreOptions {
    pub fn shared() -> Self {
        Self {
            shared: true,
            ..Self::default()
        }
    }
}

pub struct Store<A: ValueAdapter> {
    version: u32,
    table: UnsafeCell<TableEngine<A>>,
    guard: AccessGuard,
}

// SAFETY: the table behind the UnsafeCell is only dereferenced while an
// AccessPermit is held. In Shared mode the permit is the mutex guard, so
// table access is serialized. In Exclusive mode only the creating thread
// ever receives a permit (owner tokens are unique per thread and never
// reused); every other thread is rejected before the cell is touched.
// `A: Send + Sync` because the adapter is invoked from whichever thread
// holds the permit; `A::Value: Send` because copies move across the
// boundary in both directions.
unsafe impl<A: ValueAdapter> Send for Store<A>
where
    A: Send,
    A::Value: Send,
{
}
unsafe impl<A: ValueAdapter> Sync for Store<A>
where
    A: Send + Sync,
    A::Value: Send,
{
}

impl<A: ValueAdapter> Store<A> {
    pub fn new(adapter: A, options: StoreOptions) -> Self {
        Self {
            version: STORE_VERSION,
            table: UnsafeCell::new(TableEngine::new(adapter, options.region_limit)),
            guard: AccessGuard::new(options.shared),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_shared(&self) -> bool {
        self.guard.is_shared()
    }

    /// The identity an exclusive-mode store is bound to; `None` in Shared
    /// mode.
    pub fn owner(&self) -> Option<OwnerToken> {
        self.guard.owner()
    }

    /// Insert or overwrite the pair for `key`, deep-copying both key and
    /// value into the entry's private region.
    pub fn put(&self, key: &A::Value, value: &A::Value) -> Result<(), StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &mut *self.table.get() };
        table.upsert(key, value)?;
        Ok(())
    }

    /// A fresh copy of the stored value, or `Lookup::NotFound`.
    pub fn lookup(&self, key: &A::Value) -> Result<Lookup<A::Value>, StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &*self.table.get() };
        match table.copy_value(key)? {
            Some(value) => Ok(Lookup::Found(value)),
            None => Ok(Lookup::NotFound),
        }
    }

    /// Like [`Store::lookup`], but substitutes `default` on a miss. Never
    /// reports a miss.
    pub fn get(&self, key: &A::Value, default: A::Value) -> Result<A::Value, StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &*self.table.get() };
        match table.copy_value(key)? {
            Some(value) => Ok(value),
            None => Ok(default),
        }
    }

    /// Remove the entry for `key`, freeing its region.
    pub fn del(&self, key: &A::Value) -> Result<Removal, StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &mut *self.table.get() };
        if table.remove(key) {
            Ok(Removal::Removed)
        } else {
            Ok(Removal::NotFound)
        }
    }

    /// Exact number of live entries.
    pub fn size(&self) -> Result<usize, StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &*self.table.get() };
        Ok(table.len())
    }

    /// Snapshot of every current pair as fresh caller-owned copies, in
    /// unspecified order. The guard is held for the whole materialization.
    pub fn to_list(&self) -> Result<Vec<(A::Value, A::Value)>, StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &*self.table.get() };
        Ok(table.scan()?)
    }

    /// Free every entry's region and empty the table; the store stays
    /// usable afterward.
    pub fn clear(&self) -> Result<(), StoreError> {
        let _permit = self.guard.enter()?;
        // SAFETY: permit held, see the Send/Sync impls.
        let table = unsafe { &mut *self.table.get() };
        table.clear();
        Ok(())
    }
}
