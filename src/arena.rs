//! Region: the private arena owned by exactly one entry.
//!
//! A region is the sole owner of the key/value copies stored for one
//! entry. It accounts every byte an adapter charges against it and can
//! enforce an optional budget; dropping the region frees the copies it
//! holds. Regions are never shared between entries.

use thiserror::Error;

/// Arena budget exhaustion. Fatal to the single operation that hit it;
/// the table the region belongs to is left untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[error("arena allocation of {requested} bytes exceeds the {remaining} bytes remaining")]
pub struct AllocError {
    pub requested: usize,
    pub remaining: usize,
}

#[derive(Debug)]
pub struct Region<V> {
    pair: Option<(V, V)>,
    used: usize,
    limit: Option<usize>,
}

impl<V> Region<V> {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            pair: None,
            used: 0,
            limit,
        }
    }

    /// A region with no byte budget, e.g. standing in for the caller's
    /// own heap when copying values out of the map.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Charge `bytes` against this region. Adapters must reserve the
    /// footprint of a copy before materializing it, so a rejected copy
    /// never ends up owned by the region.
    pub fn reserve(&mut self, bytes: usize) -> Result<(), AllocError> {
        if let Some(limit) = self.limit {
            let remaining = limit.saturating_sub(self.used);
            if bytes > remaining {
                return Err(AllocError {
                    requested: bytes,
                    remaining,
                });
            }
        }
        self.used += bytes;
        Ok(())
    }

    /// Move a key/value pair into the region, making it their owner.
    /// Any previous pair is dropped first.
    pub(crate) fn install(&mut self, key: V, value: V) {
        self.pair = Some((key, value));
    }

    /// Drop the owned pair and reset the byte accounting. The region
    /// itself stays usable for a fresh pair.
    pub fn clear(&mut self) {
        self.pair = None;
        self.used = 0;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.pair.is_none()
    }

    pub fn key(&self) -> Option<&V> {
        self.pair.as_ref().map(|(k, _)| k)
    }

    pub fn value(&self) -> Option<&V> {
        self.pair.as_ref().map(|(_, v)| v)
    }

    pub fn pair(&self) -> Option<(&V, &V)> {
        self.pair.as_ref().map(|(k, v)| (k, v))
    }
}
