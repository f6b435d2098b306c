//! Campaign repository.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::campaign::{Campaign, CampaignStatus, CampaignType};
use crate::pipeline::{campaign_transition, CampaignEvent};

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn create_campaign(&self, campaign: &Campaign) -> Result<()>;
    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>>;
    async fn list_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<Campaign>>;
    async fn list_active_by_type(&self, campaign_type: CampaignType) -> Result<Vec<Campaign>>;
    /// Flips an active campaign to completed, but only while it has no
    /// candidate left in the pipeline. Returns whether the row changed.
    async fn mark_completed(&self, id: Uuid) -> Result<bool>;
}

/// Share-locks the campaign row for the rest of the transaction and refuses a
/// completed campaign. `mark_completed` takes the exclusive lock on the same
/// row, so a write guarded here and a completion never interleave.
pub(crate) async fn lock_active_campaign(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    let status: Option<CampaignStatus> =
        sqlx::query_scalar("SELECT status FROM campaigns WHERE id = $1 FOR SHARE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    let status = status.ok_or_else(|| Error::not_found("Campaign", id))?;
    campaign_transition(status, CampaignEvent::Mutate)?;
    Ok(())
}

pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn create_campaign(&self, campaign: &Campaign) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (id, name, campaign_type, status, created_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.name)
        .bind(campaign.campaign_type)
        .bind(campaign.status)
        .bind(campaign.created_at)
        .bind(campaign.created_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(campaign)
    }

    async fn list_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT * FROM campaigns
            WHERE ($1::campaign_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }

    async fn list_active_by_type(&self, campaign_type: CampaignType) -> Result<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT * FROM campaigns
            WHERE status = 'active' AND campaign_type = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(campaign_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(campaigns)
    }

    async fn mark_completed(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // Waits out in-flight inserts into the campaign; the UPDATE below then
        // sees every candidate they committed.
        sqlx::query("SELECT id FROM campaigns WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let res = sqlx::query(
            r#"
            UPDATE campaigns SET status = 'completed'
            WHERE id = $1
              AND status = 'active'
              AND NOT EXISTS (
                  SELECT 1 FROM candidates
                  WHERE campaign_id = $1 AND status = 'in_pipeline'
              )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(res.rows_affected() == 1)
    }
}
