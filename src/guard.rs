//! Access guard: the per-store concurrency discipline.
//!
//! A store is either Exclusive — bound to the identity that created it,
//! checked by comparison, never blocking — or Shared, serialized by a
//! mutex held for the whole operation. Both disciplines are entered
//! through an RAII permit so every exit path, error paths included,
//! releases the guard.

use core::num::NonZeroU64;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Exclusive-mode rejection: the caller is not the identity the store was
/// created under. Fail-fast; the table has not been touched. Callers
/// treat this as "operation not permitted", the same class as an invalid
/// argument, not a system fault.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("caller is not the owner of this exclusive-mode store")]
pub struct AccessDenied;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Opaque, equality-comparable identity of an execution context.
///
/// Tokens are minted from a global counter, one per OS thread, and never
/// reused. A store orphaned by its owner's termination therefore keeps
/// rejecting every caller; reclaiming it goes through the registry, which
/// does not consult the guard.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OwnerToken(NonZeroU64);

impl OwnerToken {
    /// The token of the calling thread, minted on first use.
    pub fn current() -> Self {
        thread_local! {
            static TOKEN: OwnerToken = OwnerToken(
                NonZeroU64::new(NEXT_OWNER.fetch_add(1, Ordering::Relaxed))
                    .expect("owner token counter wrapped"),
            );
        }
        TOKEN.with(|t| *t)
    }
}

pub(crate) enum AccessGuard {
    Exclusive { owner: OwnerToken },
    Shared { lock: Mutex<()> },
}

/// Proof of admission for one operation. Holds the mutex in Shared mode;
/// in Exclusive mode it is the verified identity check.
pub(crate) enum AccessPermit<'a> {
    Owner,
    Locked { _held: MutexGuard<'a, ()> },
}

impl AccessGuard {
    pub(crate) fn new(shared: bool) -> Self {
        if shared {
            AccessGuard::Shared {
                lock: Mutex::new(()),
            }
        } else {
            AccessGuard::Exclusive {
                owner: OwnerToken::current(),
            }
        }
    }

    /// Admit the calling context, blocking on the mutex in Shared mode.
    /// Exclusive mode never blocks: a token mismatch is rejected
    /// immediately, before any table access.
    pub(crate) fn enter(&self) -> Result<AccessPermit<'_>, AccessDenied> {
        match self {
            AccessGuard::Shared { lock } => Ok(AccessPermit::Locked { _held: lock.lock() }),
            AccessGuard::Exclusive { owner } => {
                if OwnerToken::current() == *owner {
                    Ok(AccessPermit::Owner)
                } else {
                    Err(AccessDenied)
                }
            }
        }
    }

    pub(crate) fn is_shared(&self) -> bool {
        matches!(self, AccessGuard::Shared { .. })
    }

    pub(crate) fn owner(&self) -> Option<OwnerToken> {
        match self {
            AccessGuard::Exclusive { owner } => Some(*owner),
            AccessGuard::Shared { .. } => None,
        }
    }
}
