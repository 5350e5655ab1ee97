//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! campaign execution engine: queue names, lifecycle event names, and the
//! default pacing/retry values mirrored by [`crate::config`].

// Re-export status types for convenience
pub use crate::models::{CampaignStatus, CampaignType, MethodStatus, OverallStatus};

/// Lifecycle events emitted through structured logging as campaigns progress
pub mod events {
    // Campaign lifecycle events
    pub const CAMPAIGN_START_REQUESTED: &str = "campaign.start_requested";
    pub const CAMPAIGN_STARTED: &str = "campaign.started";
    pub const CAMPAIGN_PAUSE_REQUESTED: &str = "campaign.pause_requested";
    pub const CAMPAIGN_PAUSED: &str = "campaign.paused";
    pub const CAMPAIGN_COMPLETED: &str = "campaign.completed";
    pub const CAMPAIGN_FAILED: &str = "campaign.failed";

    // Contact lifecycle events
    pub const CONTACT_PROCESSING_REQUESTED: &str = "contact.processing_requested";
    pub const CONTACT_COMPLETED: &str = "contact.completed";
    pub const CONTACT_FAILED: &str = "contact.failed";

    // Queue infrastructure events
    pub const QUEUE_BACKEND_UNAVAILABLE: &str = "queue.backend_unavailable";
    pub const JOB_RETRY_SCHEDULED: &str = "queue.job_retry_scheduled";
    pub const JOB_ABANDONED: &str = "queue.job_abandoned";
}

/// Queue and worker identifiers
pub mod system {
    /// Single queue carrying both campaign fan-out and per-contact jobs.
    /// One consumer per queue keeps per-campaign processing single-owner.
    pub const CAMPAIGN_JOBS_QUEUE: &str = "campaign_jobs";

    /// Dead-letter destination for jobs abandoned after retry exhaustion
    pub const CAMPAIGN_JOBS_ARCHIVE: &str = "campaign_jobs_archive";
}

/// Hard defaults for pacing and retry, overridable through [`crate::config::EngineConfig`]
pub mod defaults {
    /// Primary throttle against provider rate limits (spacing between contacts)
    pub const INTER_CONTACT_DELAY_MS: u64 = 1000;

    /// Spacing between channel sends for one contact
    pub const INTER_CHANNEL_DELAY_MS: u64 = 500;

    /// Maximum delivery attempts for one queued job
    pub const MAX_JOB_ATTEMPTS: u32 = 3;

    /// Base delay for exponential job backoff
    pub const RETRY_BASE_DELAY_SECONDS: u64 = 2;

    /// Backoff growth factor per attempt
    pub const RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;

    /// Upper bound on any single backoff delay
    pub const MAX_RETRY_DELAY_SECONDS: u64 = 60;

    /// How long a polled job stays invisible to other consumers
    pub const VISIBILITY_TIMEOUT_SECONDS: u64 = 30;

    /// Worker sleep between empty polls
    pub const WORKER_POLL_INTERVAL_MS: u64 = 100;

    /// Requeue delay when a contact job arrives before its predecessor's result
    pub const ORDERING_RETRY_DELAY_MS: u64 = 500;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(events::CAMPAIGN_START_REQUESTED, "campaign.start_requested");
        assert_eq!(events::CAMPAIGN_COMPLETED, "campaign.completed");
        assert_eq!(events::CONTACT_FAILED, "contact.failed");
        assert_eq!(events::QUEUE_BACKEND_UNAVAILABLE, "queue.backend_unavailable");
    }

    #[test]
    fn test_pacing_defaults() {
        assert_eq!(defaults::INTER_CONTACT_DELAY_MS, 1000);
        assert_eq!(defaults::INTER_CHANNEL_DELAY_MS, 500);
        assert_eq!(defaults::MAX_JOB_ATTEMPTS, 3);
        assert_eq!(defaults::RETRY_BASE_DELAY_SECONDS, 2);
    }
}
