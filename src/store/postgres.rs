//! Postgres-backed campaign store: one JSONB document per campaign row,
//! upserted on every checkpoint. Runtime queries only, so the crate builds
//! without a live database.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::{CampaignStore, StoreError};
use crate::models::Campaign;

/// sqlx-backed store for the `campaigns` document table
#[derive(Debug, Clone)]
pub struct PostgresCampaignStore {
    pool: PgPool,
}

impl PostgresCampaignStore {
    /// Connect with a small dedicated pool
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("🗄️ Connecting campaign store to Postgres");

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Reuse an existing connection pool
    pub fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the campaigns table if it does not exist
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                document JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!("Campaign schema ensured");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CampaignStore for PostgresCampaignStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Campaign>, StoreError> {
        let row = sqlx::query("SELECT document FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let document: serde_json::Value = row
                    .try_get("document")
                    .map_err(|e| StoreError::Database(e.to_string()))?;
                Ok(Some(serde_json::from_value(document)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, campaign: &Campaign) -> Result<(), StoreError> {
        let document = serde_json::to_value(campaign)?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (id, user_id, document, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (id)
            DO UPDATE SET document = EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(campaign.id)
        .bind(campaign.user_id)
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(campaign_id = %campaign.id, "Campaign checkpoint saved");
        Ok(())
    }
}
