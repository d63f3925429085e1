//! TableEngine: structural layer mapping opaque keys to arena-backed entries.
//!
//! A hashbrown index over slotmap storage, probed with the adapter's hash
//! and equality. Each live slot owns one [`Region`] holding the private
//! key/value copies for that entry.

use crate::adapter::ValueAdapter;
use crate::arena::{AllocError, Region};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Entry<V> {
    region: Region<V>,
    // Adapter hash of the stored key, computed once per copy; index
    // maintenance reuses it so the adapter never re-hashes a stored key.
    hash: u64,
}

/// Outcome of [`TableEngine::upsert`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Upsert {
    Inserted,
    Updated,
}

pub struct TableEngine<A: ValueAdapter> {
    adapter: A,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<A::Value>>, // storage using generational keys
    region_limit: Option<usize>,
}

impl<A: ValueAdapter> TableEngine<A> {
    pub fn new(adapter: A, region_limit: Option<usize>) -> Self {
        Self {
            adapter,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            region_limit,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn find_slot(&self, hash: u64, key: &A::Value) -> Option<DefaultKey> {
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .and_then(|e| e.region.key())
                    .map(|stored| self.adapter.equals(stored, key))
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Insert or overwrite the pair for `key`. Both key and value are
    /// deep-copied into a fresh region first; on update the fresh region
    /// replaces the old one, so the previous copies are freed and the key
    /// representation is normalized to the caller's latest spelling. A
    /// failed copy aborts before the table is touched.
    pub fn upsert(&mut self, key: &A::Value, value: &A::Value) -> Result<Upsert, AllocError> {
        let hash = self.adapter.hash(key);
        let mut region = Region::new(self.region_limit);
        let key_copy = self.adapter.deep_copy(key, &mut region)?;
        let value_copy = self.adapter.deep_copy(value, &mut region)?;
        region.install(key_copy, value_copy);

        if let Some(k) = self.find_slot(hash, key) {
            let entry = self
                .slots
                .get_mut(k)
                .expect("index points at a live slot");
            entry.region = region;
            entry.hash = hash;
            Ok(Upsert::Updated)
        } else {
            let k = self.slots.insert(Entry { region, hash });
            let slots = &self.slots;
            self.index.insert_unique(hash, k, |&kk| slots[kk].hash);
            Ok(Upsert::Inserted)
        }
    }

    /// Borrow the stored value for `key`, if present. Internal reads only;
    /// values handed to callers go through [`TableEngine::copy_value`].
    pub fn value(&self, key: &A::Value) -> Option<&A::Value> {
        let hash = self.adapter.hash(key);
        let k = self.find_slot(hash, key)?;
        self.slots[k].region.value()
    }

    /// A fresh caller-owned copy of the value for `key`, or `None`.
    pub fn copy_value(&self, key: &A::Value) -> Result<Option<A::Value>, AllocError> {
        let hash = self.adapter.hash(key);
        let Some(k) = self.find_slot(hash, key) else {
            return Ok(None);
        };
        let stored = self.slots[k]
            .region
            .value()
            .expect("live entry always holds a key/value pair");
        let mut out = Region::unbounded();
        Ok(Some(self.adapter.deep_copy(stored, &mut out)?))
    }

    /// Remove the entry for `key`, freeing its region. Returns whether an
    /// entry was present.
    pub fn remove(&mut self, key: &A::Value) -> bool {
        let hash = self.adapter.hash(key);
        let Some(k) = self.find_slot(hash, key) else {
            return false;
        };
        let entry = match self.slots.remove(k) {
            Some(e) => e,
            None => return false,
        };
        // Unlink from index via occupied entry removal, reusing the stored hash.
        self.index
            .find_entry(entry.hash, |&kk| kk == k)
            .expect("index entry must exist for a removed slot")
            .remove();
        true
    }

    /// Snapshot every current entry as fresh caller-owned copies, in
    /// unspecified order. Not a live cursor; call again to recompute.
    pub fn scan(&self) -> Result<Vec<(A::Value, A::Value)>, AllocError> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut scratch = Region::unbounded();
        for (_k, entry) in self.slots.iter() {
            let (key, value) = entry
                .region
                .pair()
                .expect("live entry always holds a key/value pair");
            out.push((
                self.adapter.deep_copy(key, &mut scratch)?,
                self.adapter.deep_copy(value, &mut scratch)?,
            ));
        }
        Ok(out)
    }

    /// Free every entry's region and empty the table. The table stays
    /// usable afterward.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}
