//! pgmq-backed durable queue. Calls the pgmq extension's SQL functions
//! through sqlx runtime queries, so the crate builds without a live
//! database and the queue gets pgmq's delayed delivery, visibility
//! timeouts, and archive table.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use super::{JobEnvelope, JobQueue, QueueError, QueuedJob};

/// Durable job queue on top of the pgmq Postgres extension
#[derive(Debug, Clone)]
pub struct PgmqJobQueue {
    pool: PgPool,
}

impl PgmqJobQueue {
    /// Connect with a small dedicated pool
    pub async fn connect(database_url: &str) -> Result<Self, QueueError> {
        info!("🚀 Connecting to pgmq backend");

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| QueueError::Unreachable(e.to_string()))?;

        info!("✅ Connected to pgmq backend");
        Ok(Self { pool })
    }

    /// Reuse an existing connection pool
    pub fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the queue if it doesn't exist
    pub async fn ensure_queue(&self, queue: &str) -> Result<(), QueueError> {
        debug!("📋 Creating queue: {}", queue);

        sqlx::query("SELECT pgmq.create($1)")
            .bind(queue)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        info!("✅ Queue created: {}", queue);
        Ok(())
    }
}

/// Pool-level failures mean the backend is unreachable; everything else is
/// a backend error the retry policy may absorb
fn classify(error: sqlx::Error) -> QueueError {
    match &error {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => QueueError::Unreachable(error.to_string()),
        _ => QueueError::Backend(error.to_string()),
    }
}

#[async_trait]
impl JobQueue for PgmqJobQueue {
    async fn enqueue(
        &self,
        queue: &str,
        envelope: &JobEnvelope,
        delay: Duration,
    ) -> Result<i64, QueueError> {
        let message = serde_json::to_value(envelope)?;

        let msg_id: i64 = sqlx::query_scalar("SELECT pgmq.send($1, $2, $3)")
            .bind(queue)
            .bind(&message)
            .bind(delay.as_secs() as i32)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;

        debug!(
            "📤 Job {} sent to queue: {} with id: {}",
            envelope.job.kind(),
            queue,
            msg_id
        );
        Ok(msg_id)
    }

    async fn poll(
        &self,
        queue: &str,
        visibility_timeout: Duration,
    ) -> Result<Option<QueuedJob>, QueueError> {
        let row = sqlx::query("SELECT msg_id, message FROM pgmq.read($1, $2, 1)")
            .bind(queue)
            .bind(visibility_timeout.as_secs() as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        match row {
            Some(row) => {
                let msg_id: i64 = row.try_get("msg_id").map_err(classify)?;
                let message: serde_json::Value = row.try_get("message").map_err(classify)?;
                let envelope: JobEnvelope = serde_json::from_value(message)?;

                debug!("📥 Read job {} from queue: {}", msg_id, queue);
                Ok(Some(QueuedJob { msg_id, envelope }))
            }
            None => Ok(None),
        }
    }

    async fn ack(&self, queue: &str, msg_id: i64) -> Result<(), QueueError> {
        sqlx::query("SELECT pgmq.delete($1, $2)")
            .bind(queue)
            .bind(msg_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        debug!("🗑️ Job deleted: {}", msg_id);
        Ok(())
    }

    async fn abandon(&self, queue: &str, msg_id: i64) -> Result<(), QueueError> {
        sqlx::query("SELECT pgmq.archive($1, $2)")
            .bind(queue)
            .bind(msg_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        debug!("📦 Job archived for inspection: {}", msg_id);
        Ok(())
    }
}
