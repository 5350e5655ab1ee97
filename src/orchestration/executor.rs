//! # Campaign Job Executor (queue path)
//!
//! Handlers for the two job kinds. `StartCampaign` fans out one
//! `ProcessContact` job per unprocessed contact, spacing them with
//! monotonically increasing delays so the queue's own scheduler enforces
//! the inter-contact pacing. Each `ProcessContact` job independently
//! re-checks pause status and appends exactly one result, under the
//! campaign's lock.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::constants::events;
use crate::error::{EngineError, Result};
use crate::logging::{log_contact_operation, log_error};
use crate::models::Campaign;
use crate::orchestration::locks::CampaignLockRegistry;
use crate::processor::ContactProcessor;
use crate::queue::{CampaignJob, HandlerOutcome, JobEnvelope, JobHandler, JobQueue, QueuedJob};
use crate::state_machine::{next_status, CampaignEvent, CampaignStatus};
use crate::store::CampaignStore;

/// Executes queued campaign jobs against the store and gateway
pub struct CampaignJobExecutor {
    store: Arc<dyn CampaignStore>,
    processor: Arc<ContactProcessor>,
    queue: Arc<dyn JobQueue>,
    locks: Arc<CampaignLockRegistry>,
    config: EngineConfig,
    queue_name: String,
}

impl CampaignJobExecutor {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        processor: Arc<ContactProcessor>,
        queue: Arc<dyn JobQueue>,
        locks: Arc<CampaignLockRegistry>,
        config: EngineConfig,
        queue_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processor,
            queue,
            locks,
            config,
            queue_name: queue_name.into(),
        }
    }

    async fn load(&self, campaign_id: Uuid) -> Result<Campaign> {
        self.store
            .find_by_id(campaign_id)
            .await?
            .ok_or_else(|| EngineError::CampaignNotFound(campaign_id.to_string()))
    }

    /// Fan out one `ProcessContact` job per unprocessed contact with
    /// `position × inter_contact_delay` scheduling
    async fn handle_start_campaign(
        &self,
        campaign_id: Uuid,
        user_id: Uuid,
    ) -> Result<HandlerOutcome> {
        let campaign = self.load(campaign_id).await?;

        if !campaign.status.is_active() {
            // Paused or completed between enqueue and execution
            return Ok(HandlerOutcome::Done);
        }

        if campaign.is_complete() {
            self.try_complete(campaign).await?;
            return Ok(HandlerOutcome::Done);
        }

        let first_pending = campaign.next_contact_index();
        let spacing = self.config.pacing.inter_contact_delay();

        for index in first_pending..campaign.total_contacts {
            let envelope = JobEnvelope::new(
                CampaignJob::ProcessContact {
                    campaign_id,
                    user_id,
                    contact_index: index,
                },
                self.config.retry.max_attempts,
            );
            let delay = spacing * (index - first_pending) as u32;
            self.queue.enqueue(&self.queue_name, &envelope, delay).await?;
        }

        info!(
            campaign_id = %campaign_id,
            contacts = campaign.total_contacts - first_pending,
            first_index = first_pending,
            "Campaign fan-out enqueued"
        );
        Ok(HandlerOutcome::Done)
    }

    /// Process one contact under the campaign lock, idempotently
    async fn handle_process_contact(
        &self,
        campaign_id: Uuid,
        contact_index: usize,
    ) -> Result<HandlerOutcome> {
        let _guard = self.locks.acquire(campaign_id).await;

        let campaign = self.load(campaign_id).await?;

        // Same pause semantics as the direct loop, re-checked per job
        if campaign.status == CampaignStatus::Paused {
            debug!(
                campaign_id = %campaign_id,
                contact_index,
                "Campaign paused; skipping contact job"
            );
            return Ok(HandlerOutcome::Done);
        }
        if campaign.status.is_terminal() {
            return Ok(HandlerOutcome::Done);
        }

        let recorded = campaign.results.len();
        if recorded > contact_index {
            // Redelivered after a lost ack; the result already exists
            return Ok(HandlerOutcome::Done);
        }
        if recorded < contact_index {
            // Predecessor's result is missing; hold to preserve append order
            return Ok(HandlerOutcome::RetryAfter(
                self.config.queue.ordering_retry_delay(),
            ));
        }

        let contact = campaign
            .contacts
            .get(contact_index)
            .cloned()
            .ok_or_else(|| {
                EngineError::ValidationError(format!(
                    "contact index {contact_index} out of bounds for campaign {campaign_id}"
                ))
            })?;

        let result = self
            .processor
            .process_contact(
                &contact,
                contact_index,
                campaign.campaign_type.channels(),
                &campaign.template,
                &campaign.voice,
            )
            .await;

        log_contact_operation(
            events::CONTACT_COMPLETED,
            campaign_id,
            contact_index,
            &contact.name,
            &result.overall_status.to_string(),
            None,
        );

        // Re-read before the write so a pause issued while the contact's
        // channels were in flight survives this save; the lock keeps the
        // result list itself stable
        let mut campaign = self.load(campaign_id).await?;
        campaign.record_result(result);

        // Completion detection by count, folded into the same durable write
        if campaign.is_complete() && campaign.status.is_active() {
            campaign.status = next_status(campaign.status, &CampaignEvent::Complete)?;
            info!(
                campaign_id = %campaign_id,
                success_count = campaign.success_count,
                failure_count = campaign.failure_count,
                "Campaign completed"
            );
        }
        self.store.save(&campaign).await?;

        Ok(HandlerOutcome::Done)
    }

    async fn try_complete(&self, mut campaign: Campaign) -> Result<()> {
        if campaign.status.is_active() {
            campaign.status = next_status(campaign.status, &CampaignEvent::Complete)?;
            self.store.save(&campaign).await?;
        }
        Ok(())
    }

    /// Best-effort transition to paused after a job gave up. Without this
    /// the campaign would sit running forever while every successor contact
    /// job holds waiting for a result that will never be recorded; once
    /// paused, those jobs ack as no-ops at the pause check.
    async fn force_pause(&self, campaign_id: Uuid, reason: &str) {
        log_error(
            "executor",
            events::CAMPAIGN_FAILED,
            reason,
            Some("forcing campaign to paused"),
        );

        match self.store.find_by_id(campaign_id).await {
            Ok(Some(mut campaign)) if campaign.status.is_active() => {
                if let Ok(status) =
                    next_status(campaign.status, &CampaignEvent::Fail(reason.to_string()))
                {
                    campaign.status = status;
                    if let Err(save_error) = self.store.save(&campaign).await {
                        log_error(
                            "executor",
                            events::CAMPAIGN_FAILED,
                            &save_error.to_string(),
                            Some("could not persist forced pause"),
                        );
                    }
                }
            }
            Ok(_) => {}
            Err(load_error) => {
                log_error(
                    "executor",
                    events::CAMPAIGN_FAILED,
                    &load_error.to_string(),
                    Some("could not reload campaign for forced pause"),
                );
            }
        }
    }
}

#[async_trait]
impl JobHandler for CampaignJobExecutor {
    async fn handle(&self, job: &QueuedJob) -> Result<HandlerOutcome> {
        match &job.envelope.job {
            CampaignJob::StartCampaign {
                campaign_id,
                user_id,
            } => self.handle_start_campaign(*campaign_id, *user_id).await,
            CampaignJob::ProcessContact {
                campaign_id,
                contact_index,
                ..
            } => {
                self.handle_process_contact(*campaign_id, *contact_index)
                    .await
            }
        }
    }

    async fn on_abandoned(&self, job: &QueuedJob) {
        let campaign_id = job.envelope.job.campaign_id();
        let reason = format!(
            "{} job abandoned after retry exhaustion",
            job.envelope.job.kind()
        );
        self.force_pause(campaign_id, &reason).await;
    }
}
