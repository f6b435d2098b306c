//! Interviewer availability slots.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::slot::InterviewerSlot;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Returns `false` if the interviewer already published this hour.
    async fn add_slot(&self, slot: &InterviewerSlot) -> Result<bool>;
    async fn get_slot(&self, id: Uuid) -> Result<Option<InterviewerSlot>>;
    async fn remove_slot(&self, id: Uuid) -> Result<bool>;
    async fn list_slots(&self, campaign_id: Uuid) -> Result<Vec<InterviewerSlot>>;
}

pub struct PgSlotRepository {
    pool: PgPool,
}

impl PgSlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotRepository for PgSlotRepository {
    async fn add_slot(&self, slot: &InterviewerSlot) -> Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO interviewer_slots (id, campaign_id, interviewer_id, start_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (interviewer_id, campaign_id, start_time) DO NOTHING
            "#,
        )
        .bind(slot.id)
        .bind(slot.campaign_id)
        .bind(slot.interviewer_id)
        .bind(slot.start_time)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<InterviewerSlot>> {
        let slot =
            sqlx::query_as::<_, InterviewerSlot>("SELECT * FROM interviewer_slots WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(slot)
    }

    async fn remove_slot(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM interviewer_slots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn list_slots(&self, campaign_id: Uuid) -> Result<Vec<InterviewerSlot>> {
        let slots = sqlx::query_as::<_, InterviewerSlot>(
            r#"
            SELECT * FROM interviewer_slots
            WHERE campaign_id = $1
            ORDER BY start_time ASC, interviewer_id ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }
}
