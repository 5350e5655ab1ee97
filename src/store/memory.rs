//! In-memory campaign store. The reference implementation for tests and
//! single-process deployments that have no external document store.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{CampaignStore, StoreError};
use crate::models::Campaign;

/// DashMap-backed store; each save replaces the whole document atomically
#[derive(Debug, Default)]
pub struct InMemoryCampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        Ok(self.campaigns.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), StoreError> {
        self.campaigns.insert(campaign.id, campaign.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CampaignType, Contact};

    #[tokio::test]
    async fn test_save_and_find_roundtrip() {
        let store = InMemoryCampaignStore::new();
        let campaign = Campaign::new(Uuid::new_v4(), "Roundtrip", CampaignType::Email)
            .with_contacts(vec![Contact::new("Ada").with_email("ada@example.com")]);

        store.save(&campaign).await.unwrap();
        let loaded = store.find_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(loaded, campaign);
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let store = InMemoryCampaignStore::new();
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_document() {
        let store = InMemoryCampaignStore::new();
        let mut campaign = Campaign::new(Uuid::new_v4(), "Original", CampaignType::Sms);
        store.save(&campaign).await.unwrap();

        campaign.name = "Updated".to_string();
        store.save(&campaign).await.unwrap();

        let loaded = store.find_by_id(campaign.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Updated");
        assert_eq!(store.len(), 1);
    }
}
