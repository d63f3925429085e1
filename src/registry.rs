//! Registry: the host-side lifecycle collaborator.
//!
//! Models a reference-counted host runtime as an explicit handle registry:
//! stores are held in slotmap slots behind generational ids, each with a
//! strong count, and the destructor registered with the [`ResourceType`]
//! runs exactly once when the last reference is released. Stale ids never
//! resolve, so a destroyed store cannot be reached again.
//!
//! Operation dispatch takes the registry's read lock while create/retain/
//! release take the write lock, so teardown can never interleave with an
//! in-flight operation on the same store.

use crate::adapter::ValueAdapter;
use crate::store::{Lookup, Removal, Store, StoreError, StoreOptions};
use parking_lot::RwLock;
use slotmap::{DefaultKey, SlotMap};

const BAD_HANDLE: &str = "handle does not resolve to a live store";

/// Registration record for the store resource: a stable type name and the
/// destructor invoked exactly once per store, right before it is dropped.
pub struct ResourceType<A: ValueAdapter> {
    name: &'static str,
    destructor: fn(&mut Store<A>),
}

impl<A: ValueAdapter> ResourceType<A> {
    pub fn new(name: &'static str, destructor: fn(&mut Store<A>)) -> Self {
        Self { name, destructor }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Generational handle to a registered store. Ids from released stores
/// are never reused for new ones.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StoreId(DefaultKey);

struct Slot<A: ValueAdapter> {
    store: Store<A>,
    strong: usize,
}

pub struct Registry<A: ValueAdapter> {
    resource: ResourceType<A>,
    stores: RwLock<SlotMap<DefaultKey, Slot<A>>>,
}

impl<A: ValueAdapter> Registry<A> {
    pub fn new(resource: ResourceType<A>) -> Self {
        Self {
            resource,
            stores: RwLock::new(SlotMap::with_key()),
        }
    }

    pub fn resource_name(&self) -> &'static str {
        self.resource.name
    }

    /// Build a store and register it with a strong count of one. In
    /// Exclusive mode the store is bound to the calling context.
    pub fn create(&self, adapter: A, options: StoreOptions) -> StoreId {
        let store = Store::new(adapter, options);
        let id = StoreId(self.stores.write().insert(Slot { store, strong: 1 }));
        tracing::debug!(resource = self.resource.name, store = ?id, shared = options.shared, "store created");
        id
    }

    /// Add a strong reference. Lifecycle calls bypass the access guard:
    /// any context may retain or release, including for an exclusive
    /// store whose owner is gone.
    pub fn retain(&self, id: StoreId) -> Result<(), StoreError> {
        let mut stores = self.stores.write();
        let slot = stores
            .get_mut(id.0)
            .ok_or(StoreError::InvalidArgument(BAD_HANDLE))?;
        slot.strong += 1;
        tracing::trace!(store = ?id, strong = slot.strong, "store retained");
        Ok(())
    }

    /// Drop a strong reference. At zero the slot is removed, the id stops
    /// resolving, and the registered destructor runs exactly once, outside
    /// the registry lock.
    pub fn release(&self, id: StoreId) -> Result<(), StoreError> {
        let mut stores = self.stores.write();
        let slot = stores
            .get_mut(id.0)
            .ok_or(StoreError::InvalidArgument(BAD_HANDLE))?;
        slot.strong -= 1;
        if slot.strong > 0 {
            tracing::trace!(store = ?id, strong = slot.strong, "store released");
            return Ok(());
        }
        let mut slot = stores
            .remove(id.0)
            .expect("slot just resolved under the write lock");
        drop(stores);
        (self.resource.destructor)(&mut slot.store);
        tracing::debug!(resource = self.resource.name, store = ?id, "store destroyed");
        Ok(())
    }

    pub fn strong_count(&self, id: StoreId) -> Result<usize, StoreError> {
        let stores = self.stores.read();
        let slot = stores
            .get(id.0)
            .ok_or(StoreError::InvalidArgument(BAD_HANDLE))?;
        Ok(slot.strong)
    }

    fn with<R>(
        &self,
        id: StoreId,
        f: impl FnOnce(&Store<A>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let stores = self.stores.read();
        let slot = stores
            .get(id.0)
            .ok_or(StoreError::InvalidArgument(BAD_HANDLE))?;
        f(&slot.store)
    }

    // The per-operation surface, dispatched by handle. A stale handle is
    // an InvalidArgument, same as the host reports a dead resource.

    pub fn put(&self, id: StoreId, key: &A::Value, value: &A::Value) -> Result<(), StoreError> {
        self.with(id, |s| s.put(key, value))
    }

    pub fn lookup(&self, id: StoreId, key: &A::Value) -> Result<Lookup<A::Value>, StoreError> {
        self.with(id, |s| s.lookup(key))
    }

    pub fn get(
        &self,
        id: StoreId,
        key: &A::Value,
        default: A::Value,
    ) -> Result<A::Value, StoreError> {
        self.with(id, |s| s.get(key, default))
    }

    pub fn del(&self, id: StoreId, key: &A::Value) -> Result<Removal, StoreError> {
        self.with(id, |s| s.del(key))
    }

    pub fn size(&self, id: StoreId) -> Result<usize, StoreError> {
        self.with(id, |s| s.size())
    }

    pub fn to_list(&self, id: StoreId) -> Result<Vec<(A::Value, A::Value)>, StoreError> {
        self.with(id, |s| s.to_list())
    }

    pub fn clear(&self, id: StoreId) -> Result<(), StoreError> {
        self.with(id, |s| s.clear())
    }
}
