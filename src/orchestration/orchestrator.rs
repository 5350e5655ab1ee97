//! # Campaign Orchestrator (direct path)
//!
//! The in-process per-contact loop: pace, check for pause, process, append,
//! checkpoint. Used when no queue backend is configured or the backend is
//! unreachable. A fatal error (campaign unreadable/unwritable mid-run)
//! forces the campaign back to `paused` so every started campaign ends in
//! `completed` or `paused`, never stranded `running`.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::constants::events;
use crate::error::{EngineError, Result};
use crate::logging::{log_campaign_operation, log_contact_operation, log_error};
use crate::models::Campaign;
use crate::orchestration::locks::CampaignLockRegistry;
use crate::processor::ContactProcessor;
use crate::state_machine::{next_status, CampaignEvent, CampaignStatus};
use crate::store::CampaignStore;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every contact has a result; campaign marked completed
    Completed,
    /// A pause request took effect at a contact boundary
    Paused,
}

/// Drives one campaign's contacts sequentially against the store and gateway
pub struct CampaignOrchestrator {
    store: Arc<dyn CampaignStore>,
    processor: Arc<ContactProcessor>,
    locks: Arc<CampaignLockRegistry>,
    config: EngineConfig,
}

impl CampaignOrchestrator {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        processor: Arc<ContactProcessor>,
        locks: Arc<CampaignLockRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            processor,
            locks,
            config,
        }
    }

    /// Process the campaign's remaining contacts to completion or pause.
    ///
    /// Holds the campaign's advisory lock for the whole run; a second
    /// invocation for the same campaign waits rather than interleaving.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn run(&self, campaign_id: Uuid, user_id: Uuid) -> Result<RunOutcome> {
        let _guard = self.locks.acquire(campaign_id).await;

        // Absent campaign fails before any work
        self.load(campaign_id).await?;

        match self.drive(campaign_id).await {
            Ok(outcome) => {
                let (event, status) = match outcome {
                    RunOutcome::Completed => (events::CAMPAIGN_COMPLETED, "completed"),
                    RunOutcome::Paused => (events::CAMPAIGN_PAUSED, "paused"),
                };
                log_campaign_operation(event, campaign_id, Some(user_id), status, None);
                Ok(outcome)
            }
            Err(error) => {
                self.force_pause(campaign_id, &error).await;
                Err(EngineError::OrchestrationError(format!(
                    "campaign {campaign_id} run failed: {error}"
                )))
            }
        }
    }

    async fn load(&self, campaign_id: Uuid) -> Result<Campaign> {
        self.store
            .find_by_id(campaign_id)
            .await?
            .ok_or_else(|| EngineError::CampaignNotFound(campaign_id.to_string()))
    }

    /// The per-contact loop. Any error escaping here is fatal for the run.
    async fn drive(&self, campaign_id: Uuid) -> Result<RunOutcome> {
        loop {
            let mut campaign = self.load(campaign_id).await?;

            if campaign.status == CampaignStatus::Paused {
                return Ok(RunOutcome::Paused);
            }
            if campaign.is_complete() {
                return self.finish(campaign).await;
            }
            if !campaign.status.is_active() {
                return Err(EngineError::OrchestrationError(format!(
                    "campaign is {} mid-run, expected running",
                    campaign.status
                )));
            }

            let index = campaign.next_contact_index();
            if index > 0 {
                // Primary throttle against provider rate limits; the pause
                // check below re-reads status after the wait
                tokio::time::sleep(self.config.pacing.inter_contact_delay()).await;

                campaign = self.load(campaign_id).await?;
                if campaign.status == CampaignStatus::Paused {
                    return Ok(RunOutcome::Paused);
                }
            }

            // An out-of-band edit can leave total_contacts ahead of the
            // actual list; treat it as fatal rather than panicking the task
            let contact = campaign.contacts.get(index).cloned().ok_or_else(|| {
                EngineError::ValidationError(format!(
                    "contact index {index} out of bounds for campaign {campaign_id}"
                ))
            })?;
            let result = self
                .processor
                .process_contact(
                    &contact,
                    index,
                    campaign.campaign_type.channels(),
                    &campaign.template,
                    &campaign.voice,
                )
                .await;

            log_contact_operation(
                events::CONTACT_COMPLETED,
                campaign_id,
                index,
                &contact.name,
                &result.overall_status.to_string(),
                None,
            );

            // Re-read before the checkpoint so a pause issued while the
            // contact's channels were in flight survives this save
            let mut campaign = self.load(campaign_id).await?;
            campaign.record_result(result);
            // Resumability checkpoint: a crash past this save loses nothing
            self.store.save(&campaign).await?;
        }
    }

    /// Mark a fully-resulted campaign completed (once)
    async fn finish(&self, mut campaign: Campaign) -> Result<RunOutcome> {
        if campaign.status.is_active() {
            campaign.status = next_status(campaign.status, &CampaignEvent::Complete)?;
            self.store.save(&campaign).await?;
            info!(
                campaign_id = %campaign.id,
                success_count = campaign.success_count,
                failure_count = campaign.failure_count,
                "Campaign completed"
            );
        }
        Ok(RunOutcome::Completed)
    }

    /// Best-effort transition to paused after a fatal error; failures here
    /// are logged, not propagated, so the original error surfaces
    async fn force_pause(&self, campaign_id: Uuid, error: &EngineError) {
        log_error(
            "orchestrator",
            events::CAMPAIGN_FAILED,
            &error.to_string(),
            Some("forcing campaign to paused"),
        );

        match self.store.find_by_id(campaign_id).await {
            Ok(Some(mut campaign)) if campaign.status.is_active() => {
                if let Ok(status) =
                    next_status(campaign.status, &CampaignEvent::Fail(error.to_string()))
                {
                    campaign.status = status;
                    if let Err(save_error) = self.store.save(&campaign).await {
                        log_error(
                            "orchestrator",
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
                    "orchestrator",
                    events::CAMPAIGN_FAILED,
                    &load_error.to_string(),
                    Some("could not reload campaign for forced pause"),
                );
            }
        }
    }
}
