#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Campaign Core
//!
//! The campaign execution engine behind a multi-tenant CRM: takes a batch of
//! contacts and drives each one through one or more outbound channels (SMS,
//! email, voice call), tracking per-contact, per-method outcomes.
//!
//! ## Architecture
//!
//! Execution flows through the **Dispatch Scheduler**, which prefers a
//! durable job queue (pgmq) and falls back to an in-process orchestrator
//! run when the backend is unreachable. Both paths share the **Contact
//! Processor** and converge on the same observable behavior: contacts
//! processed in order, one append-only result per contact, completion
//! detected by count, and cooperative pause at contact boundaries.
//!
//! ## Key Guarantees
//!
//! - **Resumable checkpoints**: the campaign document is persisted after
//!   every contact; a paused or crashed run resumes from the next index.
//! - **Liveness**: a started campaign always ends `completed` or `paused`,
//!   never stranded `running` — fatal orchestration errors force a pause.
//! - **Single-owner execution**: exactly one active processor advances a
//!   campaign, made explicit by per-campaign advisory locks.
//! - **Absorbed channel failures**: a failed send (or missing contact
//!   field) is recorded as a failed method result, never campaign-fatal.
//!
//! ## Module Organization
//!
//! - [`models`] - Campaign document and append-only result records
//! - [`state_machine`] - Campaign lifecycle transitions
//! - [`gateway`] - Channel gateway boundary (SMS/email/call sends)
//! - [`store`] - Campaign persistence boundary
//! - [`processor`] - Per-contact channel execution
//! - [`queue`] - Durable job queue, retry policy, worker
//! - [`orchestration`] - Dispatcher, direct orchestrator, queue executor
//! - [`config`] - Pacing/retry/queue configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use campaign_core::config::EngineConfig;
//! use campaign_core::orchestration::{CampaignLockRegistry, CampaignOrchestrator, DispatchScheduler};
//! use campaign_core::processor::ContactProcessor;
//! use campaign_core::store::InMemoryCampaignStore;
//! use campaign_core::test_helpers::MockGateway;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::from_env()?;
//! let store = Arc::new(InMemoryCampaignStore::new());
//! let locks = Arc::new(CampaignLockRegistry::new());
//! let processor = Arc::new(ContactProcessor::new(
//!     Arc::new(MockGateway::new()),
//!     config.pacing.clone(),
//! ));
//! let orchestrator = Arc::new(CampaignOrchestrator::new(
//!     store.clone(),
//!     processor,
//!     locks,
//!     config.clone(),
//! ));
//! let scheduler = DispatchScheduler::new(store, orchestrator, config);
//!
//! let receipt = scheduler
//!     .start_campaign(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
//!     .await?;
//! println!("accepted via {} path", receipt.path);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod processor;
pub mod queue;
pub mod state_machine;
pub mod store;
pub mod test_helpers;

pub use config::{EngineConfig, PacingConfig, QueueConfig, RetryConfig};
pub use error::{EngineError, Result};
pub use gateway::{Channel, ChannelGateway, GatewayError, ProviderResponse, VoiceConfig};
pub use models::{
    Campaign, CampaignResult, CampaignStatus, CampaignType, Contact, MessageTemplate, MethodResult,
    MethodStatus, OverallStatus,
};
pub use orchestration::{
    CampaignJobExecutor, CampaignLockRegistry, CampaignOrchestrator, DispatchScheduler,
    ExecutionPath, PauseReceipt, RunOutcome, StartReceipt,
};
pub use processor::ContactProcessor;
pub use queue::{
    CampaignJob, HandlerOutcome, InMemoryJobQueue, JobEnvelope, JobHandler, JobQueue, QueueError,
    QueueHealth, QueueWorker, QueuedJob, RetryPolicy,
};
pub use store::{CampaignStore, InMemoryCampaignStore, StoreError};
