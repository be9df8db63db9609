//! Certificate revocation vector (CRV) of a CA.
//!
//! The CA tracks revocations for the current period in `current`. `pre_update`
//! holds the state at the end of the previous period and is the baseline of the
//! delta published in the next revocation announcement. Archived snapshots are
//! kept per period label, bounded by a retention count.
use crate::bitvector::BitVector;
use crate::errors::Error;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

/// Number of archived periods kept when nothing else is configured.
pub const DEFAULT_CACHE_RETENTION: usize = 16;

/// Revocation state of a CA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationVector {
    pre_update: BitVector,
    current: BitVector,
    cache: BTreeMap<String, BitVector>,
    archive_order: VecDeque<String>,
    retention: usize,
}

impl RevocationVector {
    /// Zeroed vectors of `size` slots and an empty cache.
    pub fn new(size: usize) -> Self {
        Self::with_retention(size, DEFAULT_CACHE_RETENTION)
    }

    /// Same as [`RevocationVector::new`], keeping at most `retention` archived periods
    /// (at least one).
    pub fn with_retention(size: usize, retention: usize) -> Self {
        Self {
            pre_update: BitVector::new(size),
            current: BitVector::new(size),
            cache: BTreeMap::new(),
            archive_order: VecDeque::new(),
            retention: retention.max(1),
        }
    }

    /// Number of revocation slots.
    pub fn size(&self) -> usize {
        self.current.len()
    }

    /// Revocation state of the running period.
    pub fn current(&self) -> &BitVector {
        &self.current
    }

    /// Revocation state at the last period rollover.
    pub fn pre_update(&self) -> &BitVector {
        &self.pre_update
    }

    /// Whether revocation identifier `index` is revoked in the running period.
    pub fn is_revoked(&self, index: usize) -> bool {
        self.current.get(index)
    }

    /// Revoke by revocation identifier. Revoking twice is a no-op.
    pub fn revoke(&mut self, index: usize) -> Result<(), Error> {
        self.current.set(index)?;
        debug!(index, "certificate revoked");
        Ok(())
    }

    /// Archive the running state under `period` and make it the baseline of the next delta.
    pub fn archive(&mut self, period: &str) {
        if self.cache.insert(period.to_owned(), self.current.clone()).is_some() {
            self.archive_order.retain(|p| p != period);
        }
        self.archive_order.push_back(period.to_owned());

        while self.archive_order.len() > self.retention {
            if let Some(evicted) = self.archive_order.pop_front() {
                self.cache.remove(&evicted);
                warn!(period = %evicted, "evicted archived revocation snapshot");
            }
        }

        self.pre_update = self.current.clone();
        info!(period, revoked = self.current.count_ones(), "revocation vector archived");
    }

    /// Periods currently held in the snapshot cache, oldest first.
    pub fn archived_periods(&self) -> impl Iterator<Item = &str> {
        self.archive_order.iter().map(String::as_str)
    }

    /// Encoding of the running state.
    pub fn encoded_current(&self) -> Vec<u8> {
        self.current.to_bytes()
    }

    /// Compute the encoded delta between `pre_update` and `current`.
    pub fn delta_vs_pre_update(&self) -> Result<Vec<u8>, Error> {
        let delta = self.current.symmetric_difference(&self.pre_update)?;
        Ok(delta.to_bytes())
    }

    /// Compute the encoded delta between the snapshot archived under `period` and `current`.
    pub fn delta_vs_cache(&self, period: &str) -> Result<Vec<u8>, Error> {
        let snapshot = self
            .cache
            .get(period)
            .ok_or_else(|| Error::NotFound(period.to_owned()))?;
        let delta = self.current.symmetric_difference(snapshot)?;
        Ok(delta.to_bytes())
    }
}

impl Default for RevocationVector {
    fn default() -> Self {
        Self::new(crate::common::DEFAULT_CRV_SIZE)
    }
}
