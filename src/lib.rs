//! shmap: a shared in-process map whose entries live in private per-entry
//! arenas, with a choice of owner-checked or mutex-serialized access.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: let multiple execution contexts reference and mutate one
//!   long-lived map without ever aliasing each other's memory. Every
//!   key/value that enters the map is deep-copied into a region owned by
//!   its entry; every key/value that leaves is a fresh caller-owned copy.
//! - Layers:
//!   - ValueAdapter: injected hash/equals/deep_copy for opaque host
//!     values the map never interprets.
//!   - Region<V>: the private arena backing one entry; sole owner of the
//!     key/value copies, with byte accounting and an optional budget.
//!   - TableEngine<A>: structural map from opaque keys to entries, a
//!     hashbrown index over slotmap storage with adapter-driven probing.
//!   - AccessGuard: per-store concurrency discipline — Exclusive
//!     (owner-token comparison, lock-free) or Shared (mutex-serialized) —
//!     entered through an RAII permit.
//!   - Store<A>: the externally visible handle combining table and guard;
//!     the full operation surface (put/lookup/get/del/size/to_list/clear).
//!   - Registry<A>: host-side lifecycle collaborator; strong-counted
//!     generational store ids and an exactly-once destructor callback.
//!
//! Constraints
//! - No entry memory is ever shared between two entries or with a caller.
//! - Exclusive mode never blocks; a token comparison substitutes for the
//!   lock and any non-owner caller is rejected before the table is touched.
//! - Shared mode holds its mutex for the whole operation, deep copies
//!   included, and releases it on every exit path.
//! - NotFound is an expected outcome, never an error.
//!
//! Why this split?
//! - Localize invariants: the table never checks identities, the guard
//!   never touches entries, the registry never reaches into regions.
//! - Isolate unsafety: the one `UnsafeCell` sits in `Store`, entered only
//!   through an `AccessPermit`.
//! - Clear failure boundaries: a failed copy aborts one operation and
//!   leaves the table exactly as it was.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the `u64` adapter hash computed when its key copy
//!   was made; index maintenance always reuses the stored hash, so the
//!   adapter's `hash` is never re-invoked for a key already in the table.

pub mod adapter;
pub mod arena;
pub mod guard;
pub mod registry;
pub mod store;
pub mod table;

mod table_proptest;

// Public surface
pub use adapter::{CloneAdapter, ValueAdapter};
pub use arena::{AllocError, Region};
pub use guard::{AccessDenied, OwnerToken};
pub use registry::{Registry, ResourceType, StoreId};
pub use store::{Lookup, Removal, Store, StoreError, StoreOptions, STORE_VERSION};
pub use table::{TableEngine, Upsert};
