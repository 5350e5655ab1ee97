//! In-memory job queue with delayed visibility. Used by tests to exercise
//! the queue path without a database, and by single-process deployments
//! that still want queue-shaped execution.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{JobEnvelope, JobQueue, QueueError, QueuedJob};

#[derive(Debug, Clone)]
struct Slot {
    msg_id: i64,
    visible_at: Instant,
    envelope: JobEnvelope,
}

/// Tokio-friendly delayed queue; delivery order follows visibility time,
/// which is how the scheduler's artificial per-contact delays enforce
/// contact ordering
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    queues: Mutex<HashMap<String, Vec<Slot>>>,
    archived: Mutex<HashMap<String, Vec<JobEnvelope>>>,
    next_id: AtomicI64,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending (unacked, unarchived) job count, for tests and diagnostics
    pub fn pending_len(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .get(queue)
            .map(|slots| slots.len())
            .unwrap_or(0)
    }

    /// Abandoned jobs kept for inspection
    pub fn archived_len(&self, queue: &str) -> usize {
        self.archived
            .lock()
            .get(queue)
            .map(|jobs| jobs.len())
            .unwrap_or(0)
    }

    /// Snapshot of abandoned jobs, for inspection in tests
    pub fn archived_jobs(&self, queue: &str) -> Vec<JobEnvelope> {
        self.archived
            .lock()
            .get(queue)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(
        &self,
        queue: &str,
        envelope: &JobEnvelope,
        delay: Duration,
    ) -> Result<i64, QueueError> {
        let msg_id = self.next_id.fetch_add(1, Ordering::AcqRel) + 1;
        let slot = Slot {
            msg_id,
            visible_at: Instant::now() + delay,
            envelope: envelope.clone(),
        };
        self.queues.lock().entry(queue.to_string()).or_default().push(slot);
        Ok(msg_id)
    }

    async fn poll(
        &self,
        queue: &str,
        visibility_timeout: Duration,
    ) -> Result<Option<QueuedJob>, QueueError> {
        let now = Instant::now();
        let mut queues = self.queues.lock();
        let Some(slots) = queues.get_mut(queue) else {
            return Ok(None);
        };

        // Earliest-visible first, msg_id as the tiebreak, matching the
        // delay-ordered delivery of the durable backend
        let candidate = slots
            .iter_mut()
            .filter(|slot| slot.visible_at <= now)
            .min_by_key(|slot| (slot.visible_at, slot.msg_id));

        match candidate {
            Some(slot) => {
                slot.visible_at = now + visibility_timeout;
                Ok(Some(QueuedJob {
                    msg_id: slot.msg_id,
                    envelope: slot.envelope.clone(),
                }))
            }
            None => Ok(None),
        }
    }

    async fn ack(&self, queue: &str, msg_id: i64) -> Result<(), QueueError> {
        let mut queues = self.queues.lock();
        if let Some(slots) = queues.get_mut(queue) {
            slots.retain(|slot| slot.msg_id != msg_id);
        }
        Ok(())
    }

    async fn abandon(&self, queue: &str, msg_id: i64) -> Result<(), QueueError> {
        let removed = {
            let mut queues = self.queues.lock();
            match queues.get_mut(queue) {
                Some(slots) => {
                    let position = slots.iter().position(|slot| slot.msg_id == msg_id);
                    position.map(|idx| slots.remove(idx).envelope)
                }
                None => None,
            }
        };

        if let Some(envelope) = removed {
            self.archived
                .lock()
                .entry(queue.to_string())
                .or_default()
                .push(envelope);
        }
        Ok(())
    }
}
