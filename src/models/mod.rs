//! # Data Model
//!
//! The campaign document and its append-only result entries. The document is
//! serde-serializable end to end so the store can persist it as a single
//! JSONB value per campaign.

pub mod campaign;
pub mod result;

pub use campaign::{Campaign, CampaignType, Contact, MessageTemplate};
pub use result::{CampaignResult, MethodResult, MethodStatus, OverallStatus};

// Lifecycle status lives with the state machine; re-exported here so model
// consumers get the whole vocabulary from one place.
pub use crate::state_machine::CampaignStatus;
