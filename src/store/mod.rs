//! # Campaign Store Boundary
//!
//! The engine reads and mutates persisted campaign documents but does not
//! own their schema. A completed [`CampaignStore::save`] implies the
//! appended result is durable before the next iteration re-reads status;
//! that property is what makes the per-contact checkpoint resumable.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Campaign;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryCampaignStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCampaignStore;

/// Errors surfaced by campaign persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to persisted campaign documents
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError>;

    /// Durable write; returning `Ok` means the document is persisted
    async fn save(&self, campaign: &Campaign) -> Result<(), StoreError>;
}
