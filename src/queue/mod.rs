//! # Durable Job Queue
//!
//! The preferred execution path queues one fan-out job per campaign and one
//! job per contact, relying on the backend's delayed delivery for pacing and
//! on the worker's retry policy for job-level failures. The abstraction is
//! deliberately small: enqueue with delay, poll with a visibility timeout,
//! ack, or abandon (archive for inspection, never silently discard).

use async_trait::async_trait;
use std::time::Duration;

pub mod health;
pub mod memory;
pub mod messages;
#[cfg(feature = "postgres")]
pub mod pgmq;
pub mod retry;
pub mod worker;

pub use health::{QueueHealth, QueueHealthState};
pub use memory::InMemoryJobQueue;
pub use messages::{CampaignJob, JobEnvelope, JobMetadata};
#[cfg(feature = "postgres")]
pub use pgmq::PgmqJobQueue;
pub use retry::RetryPolicy;
pub use worker::{HandlerOutcome, JobHandler, QueueWorker};

/// Errors surfaced by queue backends
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The backend cannot be reached at all (connection refused, pool down).
    /// The dispatcher reacts by switching to the direct execution path.
    #[error("Queue backend unreachable: {0}")]
    Unreachable(String),

    #[error("Queue backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QueueError {
    pub fn is_connection_error(&self) -> bool {
        matches!(self, QueueError::Unreachable(_))
    }
}

/// A job read from the queue, still invisible to other consumers until
/// acked, abandoned, or its visibility timeout lapses
#[derive(Debug, Clone)]
pub struct QueuedJob {
    pub msg_id: i64,
    pub envelope: JobEnvelope,
}

/// Minimal durable queue contract shared by the pgmq backend and the
/// in-memory implementation
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Submit a job, visible after `delay`. Returns the backend message id.
    async fn enqueue(
        &self,
        queue: &str,
        envelope: &JobEnvelope,
        delay: Duration,
    ) -> Result<i64, QueueError>;

    /// Read at most one visible job, hiding it for `visibility_timeout`
    async fn poll(
        &self,
        queue: &str,
        visibility_timeout: Duration,
    ) -> Result<Option<QueuedJob>, QueueError>;

    /// Delete a completed job
    async fn ack(&self, queue: &str, msg_id: i64) -> Result<(), QueueError>;

    /// Move an exhausted job to the archive; kept for inspection
    async fn abandon(&self, queue: &str, msg_id: i64) -> Result<(), QueueError>;
}
