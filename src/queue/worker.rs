//! Polling queue worker. One worker consumes the campaign jobs queue,
//! dispatches each job to the handler, and applies the retry policy to
//! handler failures: delete-and-re-enqueue with exponential backoff while
//! attempts remain, archive once they are exhausted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use super::{JobQueue, QueuedJob, RetryPolicy};
use crate::config::QueueConfig;
use crate::constants::events;
use crate::error::Result;
use crate::logging::log_queue_operation;

/// What the handler wants done with a job it accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Work finished (or intentionally skipped); ack the job
    Done,
    /// Not processable yet (e.g. a predecessor's result is missing);
    /// redeliver after the delay without consuming a retry attempt
    RetryAfter(Duration),
}

/// Job execution seam between the worker and the orchestration layer
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &QueuedJob) -> Result<HandlerOutcome>;

    /// Called after a job is archived with no attempts left, so the handler
    /// can park whatever the job was advancing. Best-effort; the job itself
    /// is already out of the queue.
    async fn on_abandoned(&self, _job: &QueuedJob) {}
}

/// Polls one queue and drives jobs through the handler until stopped
pub struct QueueWorker {
    queue: Arc<dyn JobQueue>,
    handler: Arc<dyn JobHandler>,
    policy: RetryPolicy,
    config: QueueConfig,
    queue_name: String,
    running: AtomicBool,
    shutdown: Notify,
}

impl QueueWorker {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        handler: Arc<dyn JobHandler>,
        policy: RetryPolicy,
        config: QueueConfig,
        queue_name: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            handler,
            policy,
            config,
            queue_name: queue_name.into(),
            running: AtomicBool::new(false),
            shutdown: Notify::new(),
        })
    }

    /// Run the polling loop on a detached task
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let worker = Arc::clone(self);
        tokio::spawn(async move { worker.run().await })
    }

    /// Poll until stopped; sleeps the configured interval between empty polls
    pub async fn run(&self) {
        self.running.store(true, Ordering::Release);
        info!(queue = %self.queue_name, "Queue worker started");

        while self.running.load(Ordering::Acquire) {
            match self
                .queue
                .poll(&self.queue_name, self.config.visibility_timeout())
                .await
            {
                Ok(Some(job)) => self.dispatch(job).await,
                Ok(None) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval()) => {}
                        _ = self.shutdown.notified() => {}
                    }
                }
                Err(e) => {
                    error!(queue = %self.queue_name, error = %e, "Queue poll failed");
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_interval()) => {}
                        _ = self.shutdown.notified() => {}
                    }
                }
            }
        }

        info!(queue = %self.queue_name, "Queue worker stopped");
    }

    /// Signal the loop to exit; an in-flight job finishes first
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.shutdown.notify_waiters();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    async fn dispatch(&self, job: QueuedJob) {
        let kind = job.envelope.job.kind();
        debug!(
            queue = %self.queue_name,
            msg_id = job.msg_id,
            kind = kind,
            retry_count = job.envelope.metadata.retry_count,
            "Dispatching job"
        );

        match self.handler.handle(&job).await {
            Ok(HandlerOutcome::Done) => {
                if let Err(e) = self.queue.ack(&self.queue_name, job.msg_id).await {
                    // The visibility timeout will redeliver; the handler's
                    // idempotence checks absorb the duplicate
                    warn!(msg_id = job.msg_id, error = %e, "Failed to ack completed job");
                }
            }
            Ok(HandlerOutcome::RetryAfter(delay)) => {
                // Ordering hold, not a failure: redeliver without touching
                // the retry count
                if let Err(e) = self.redeliver(&job, delay, false).await {
                    warn!(msg_id = job.msg_id, error = %e, "Failed to reschedule held job");
                }
            }
            Err(handler_error) => {
                let retry_count = job.envelope.metadata.retry_count;
                if self.policy.should_retry(retry_count) {
                    let delay = self.policy.backoff_delay(retry_count);
                    log_queue_operation(
                        events::JOB_RETRY_SCHEDULED,
                        &self.queue_name,
                        Some(job.msg_id),
                        "retry",
                        Some(&handler_error.to_string()),
                    );
                    if let Err(e) = self.redeliver(&job, delay, true).await {
                        warn!(msg_id = job.msg_id, error = %e, "Failed to schedule retry");
                    }
                } else {
                    log_queue_operation(
                        events::JOB_ABANDONED,
                        &self.queue_name,
                        Some(job.msg_id),
                        "abandoned",
                        Some(&handler_error.to_string()),
                    );
                    if let Err(e) = self.queue.abandon(&self.queue_name, job.msg_id).await {
                        error!(msg_id = job.msg_id, error = %e, "Failed to archive exhausted job");
                    }
                    self.handler.on_abandoned(&job).await;
                }
            }
        }
    }

    /// Re-enqueue-then-delete so the delay and (optionally) the incremented
    /// retry count are durable in the backend. The replacement goes in
    /// first: a crash between the two calls leaves a duplicate for the
    /// handler's idempotence checks to absorb, never a lost job.
    async fn redeliver(
        &self,
        job: &QueuedJob,
        delay: Duration,
        count_attempt: bool,
    ) -> Result<()> {
        let envelope = if count_attempt {
            job.envelope.next_attempt()
        } else {
            job.envelope.clone()
        };

        self.queue.enqueue(&self.queue_name, &envelope, delay).await?;
        self.queue.ack(&self.queue_name, job.msg_id).await?;
        Ok(())
    }
}
