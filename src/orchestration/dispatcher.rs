//! # Dispatch Scheduler
//!
//! The entry point for `start_campaign` and `pause_campaign`. Start
//! validates the lifecycle transition, persists `running` before any
//! processing (making the start itself durable and idempotent against
//! immediate re-invocation), then hands execution to the queue path or,
//! when the backend is unreachable, to a detached in-process run. Queue
//! unavailability never blocks or fails the start call.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::constants::{events, system};
use crate::error::{EngineError, Result};
use crate::logging::{log_campaign_operation, log_error, log_queue_operation};
use crate::models::Campaign;
use crate::orchestration::orchestrator::CampaignOrchestrator;
use crate::queue::{CampaignJob, JobEnvelope, JobQueue, QueueHealth};
use crate::state_machine::{next_status, CampaignEvent};
use crate::store::CampaignStore;

/// Which adapter accepted the work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPath {
    /// Durable job queue; pacing and retries belong to the backend
    Queue,
    /// Detached in-process orchestrator run
    Direct,
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionPath::Queue => write!(f, "queue"),
            ExecutionPath::Direct => write!(f, "direct"),
        }
    }
}

/// Synchronous acknowledgement for an accepted start; processing is
/// asynchronous and observed by polling the campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartReceipt {
    pub campaign_id: Uuid,
    pub accepted: bool,
    pub path: ExecutionPath,
    pub job_id: Option<i64>,
}

/// Acknowledgement for an accepted pause; takes effect at the next
/// contact boundary, not immediately
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseReceipt {
    pub campaign_id: Uuid,
    pub accepted: bool,
}

/// Chooses and drives the execution adapter for start/pause requests
pub struct DispatchScheduler {
    store: Arc<dyn CampaignStore>,
    orchestrator: Arc<CampaignOrchestrator>,
    queue: Option<Arc<dyn JobQueue>>,
    queue_name: String,
    health: Arc<QueueHealth>,
    config: EngineConfig,
}

impl DispatchScheduler {
    /// Scheduler without a queue backend; every start runs direct
    pub fn new(
        store: Arc<dyn CampaignStore>,
        orchestrator: Arc<CampaignOrchestrator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            orchestrator,
            queue: None,
            queue_name: system::CAMPAIGN_JOBS_QUEUE.to_string(),
            health: Arc::new(QueueHealth::new()),
            config,
        }
    }

    /// Attach a durable queue backend as the preferred path
    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Override the queue name (defaults to the system campaign jobs queue)
    pub fn with_queue_name(mut self, queue_name: impl Into<String>) -> Self {
        self.queue_name = queue_name.into();
        self
    }

    /// Shared health flag, for observability and tests
    pub fn queue_health(&self) -> Arc<QueueHealth> {
        Arc::clone(&self.health)
    }

    async fn load_owned(&self, campaign_id: Uuid, user_id: Uuid) -> Result<Campaign> {
        let campaign = self
            .store
            .find_by_id(campaign_id)
            .await?
            .ok_or_else(|| EngineError::CampaignNotFound(campaign_id.to_string()))?;

        if campaign.user_id != user_id {
            return Err(EngineError::ValidationError(format!(
                "campaign {campaign_id} is not owned by user {user_id}"
            )));
        }
        Ok(campaign)
    }

    /// Accept a start (or resume) request and return immediately.
    ///
    /// Rejected with `Conflict` when the campaign is already running or
    /// completed; rejected with `ValidationError` before any processing
    /// when the campaign data is structurally invalid.
    pub async fn start_campaign(&self, campaign_id: Uuid, user_id: Uuid) -> Result<StartReceipt> {
        log_campaign_operation(
            events::CAMPAIGN_START_REQUESTED,
            campaign_id,
            Some(user_id),
            "requested",
            None,
        );

        let mut campaign = self.load_owned(campaign_id, user_id).await?;
        campaign.validate()?;

        campaign.status = next_status(campaign.status, &CampaignEvent::Start)?;
        // Durable before any processing begins
        self.store.save(&campaign).await?;

        log_campaign_operation(
            events::CAMPAIGN_STARTED,
            campaign_id,
            Some(user_id),
            "running",
            None,
        );

        if let Some(queue) = &self.queue {
            if self.health.is_available() {
                match self.enqueue_start(queue, campaign_id, user_id).await {
                    Ok(job_id) => {
                        return Ok(StartReceipt {
                            campaign_id,
                            accepted: true,
                            path: ExecutionPath::Queue,
                            job_id: Some(job_id),
                        });
                    }
                    Err(error) => {
                        // Unavailability must never fail the start call;
                        // record the transition once and fall back
                        if error.is_connection_error() {
                            if self.health.mark_unavailable() {
                                log_queue_operation(
                                    events::QUEUE_BACKEND_UNAVAILABLE,
                                    &self.queue_name,
                                    None,
                                    "unavailable",
                                    Some("switching to direct execution"),
                                );
                            }
                        } else {
                            log_error(
                                "dispatcher",
                                "enqueue_start",
                                &error.to_string(),
                                Some("falling back to direct execution"),
                            );
                        }
                    }
                }
            }
        }

        self.spawn_direct(campaign_id, user_id);
        Ok(StartReceipt {
            campaign_id,
            accepted: true,
            path: ExecutionPath::Direct,
            job_id: None,
        })
    }

    /// Accept a pause request; valid only while running
    pub async fn pause_campaign(&self, campaign_id: Uuid, user_id: Uuid) -> Result<PauseReceipt> {
        log_campaign_operation(
            events::CAMPAIGN_PAUSE_REQUESTED,
            campaign_id,
            Some(user_id),
            "requested",
            None,
        );

        let mut campaign = self.load_owned(campaign_id, user_id).await?;
        campaign.status = next_status(campaign.status, &CampaignEvent::Pause)?;
        self.store.save(&campaign).await?;

        log_campaign_operation(
            events::CAMPAIGN_PAUSED,
            campaign_id,
            Some(user_id),
            "paused",
            None,
        );

        Ok(PauseReceipt {
            campaign_id,
            accepted: true,
        })
    }

    async fn enqueue_start(
        &self,
        queue: &Arc<dyn JobQueue>,
        campaign_id: Uuid,
        user_id: Uuid,
    ) -> std::result::Result<i64, crate::queue::QueueError> {
        let envelope = JobEnvelope::new(
            CampaignJob::StartCampaign {
                campaign_id,
                user_id,
            },
            self.config.retry.max_attempts,
        );
        queue
            .enqueue(&self.queue_name, &envelope, Duration::ZERO)
            .await
    }

    fn spawn_direct(&self, campaign_id: Uuid, user_id: Uuid) {
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            if let Err(error) = orchestrator.run(campaign_id, user_id).await {
                // run() already forced the campaign to paused; this is the
                // last surface for the failure
                log_error("dispatcher", "direct_run", &error.to_string(), None);
            }
        });
    }
}
