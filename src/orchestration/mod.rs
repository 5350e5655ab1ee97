//! # Campaign Orchestration
//!
//! Two adapters over the same per-contact semantics:
//!
//! ```text
//! ┌──────────────────┐    queue healthy    ┌──────────────┐    ┌─────────────────┐
//! │ DispatchScheduler│───────────────────▶│ JobQueue     │───▶│ CampaignJob     │
//! │ (start/pause)    │                     │ (pgmq/memory)│    │ Executor        │
//! │                  │    backend down     └──────────────┘    └─────────────────┘
//! │                  │───────────────────▶ CampaignOrchestrator (detached task)
//! └──────────────────┘
//! ```
//!
//! The queue path relies on the backend's delayed delivery for pacing and
//! the worker's retry policy for resilience; the direct path runs the same
//! loop in-process with explicit sleeps. Both converge on the same
//! observable behavior: contacts processed in order, one result per
//! contact, completion by count, pause at contact boundaries.

pub mod dispatcher;
pub mod executor;
pub mod locks;
pub mod orchestrator;

pub use dispatcher::{DispatchScheduler, ExecutionPath, PauseReceipt, StartReceipt};
pub use executor::CampaignJobExecutor;
pub use locks::CampaignLockRegistry;
pub use orchestrator::{CampaignOrchestrator, RunOutcome};
