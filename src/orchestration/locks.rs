//! Per-campaign mutual exclusion. Exactly one active processor advances a
//! campaign's contact index; appends to `results` and the counters are
//! read-modify-write, so single-owner execution is a design constraint,
//! not an incidental property. The registry makes it explicit for both
//! execution paths.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Advisory locks keyed by campaign id
#[derive(Debug, Default)]
pub struct CampaignLockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl CampaignLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the campaign's lock. The direct path holds it for a whole
    /// run; queue handlers hold it per read-modify-write.
    pub async fn acquire(&self, campaign_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(campaign_id)
            .or_default()
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Non-blocking variant; `None` means another processor owns the campaign
    pub fn try_acquire(&self, campaign_id: Uuid) -> Option<OwnedMutexGuard<()>> {
        let lock = self
            .locks
            .entry(campaign_id)
            .or_default()
            .value()
            .clone();
        lock.try_lock_owned().ok()
    }
}
