//! Queue message types. The retry count travels inside the message itself,
//! so a re-enqueued job carries its own attempt history across backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One unit of queued work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CampaignJob {
    /// Fan out one `ProcessContact` job per unprocessed contact
    StartCampaign { campaign_id: Uuid, user_id: Uuid },
    /// Process a single contact and record its result
    ProcessContact {
        campaign_id: Uuid,
        user_id: Uuid,
        contact_index: usize,
    },
}

impl CampaignJob {
    pub fn campaign_id(&self) -> Uuid {
        match self {
            CampaignJob::StartCampaign { campaign_id, .. }
            | CampaignJob::ProcessContact { campaign_id, .. } => *campaign_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CampaignJob::StartCampaign { .. } => "start_campaign",
            CampaignJob::ProcessContact { .. } => "process_contact",
        }
    }
}

/// Delivery metadata carried alongside the job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub enqueued_at: DateTime<Utc>,
    /// Number of failed deliveries so far; zero on first enqueue
    pub retry_count: u32,
    pub max_retries: u32,
}

/// Envelope persisted in the queue backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub job: CampaignJob,
    pub metadata: JobMetadata,
}

impl JobEnvelope {
    pub fn new(job: CampaignJob, max_retries: u32) -> Self {
        Self {
            job,
            metadata: JobMetadata {
                enqueued_at: Utc::now(),
                retry_count: 0,
                max_retries,
            },
        }
    }

    /// The envelope for the next delivery attempt after a failure
    pub fn next_attempt(&self) -> Self {
        Self {
            job: self.job.clone(),
            metadata: JobMetadata {
                enqueued_at: Utc::now(),
                retry_count: self.metadata.retry_count + 1,
                max_retries: self.metadata.max_retries,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_serde_is_kind_tagged() {
        let job = CampaignJob::ProcessContact {
            campaign_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            contact_index: 4,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "process_contact");
        assert_eq!(json["contact_index"], 4);

        let parsed: CampaignJob = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn test_envelope_retry_accounting() {
        let job = CampaignJob::StartCampaign {
            campaign_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        let envelope = JobEnvelope::new(job, 3);
        assert_eq!(envelope.metadata.retry_count, 0);

        let second = envelope.next_attempt();
        assert_eq!(second.metadata.retry_count, 1);

        let third = second.next_attempt();
        assert_eq!(third.metadata.retry_count, 2);
        assert_eq!(third.metadata.max_retries, 3);
        assert_eq!(third.job, envelope.job);
    }
}
