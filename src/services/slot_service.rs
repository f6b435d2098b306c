use uuid::Uuid;

use crate::database::Repositories;
use crate::dto::slot_dto::AddSlotPayload;
use crate::error::{Error, Result};
use crate::models::slot::InterviewerSlot;
use crate::models::user::{Actor, Role};
use crate::services::campaign_service::{load_active_campaign, load_campaign};

/// Advisory interviewer availability for experienced campaigns.
#[derive(Clone)]
pub struct SlotService {
    repos: Repositories,
}

impl SlotService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Publishes an hour of availability. Publishing the same hour twice is
    /// a no-op that returns the stored slot.
    pub async fn add(
        &self,
        actor: &Actor,
        campaign_id: Uuid,
        payload: AddSlotPayload,
    ) -> Result<InterviewerSlot> {
        if actor.role != Role::Interviewer {
            return Err(Error::Forbidden(
                "Only interviewers may publish availability".to_string(),
            ));
        }
        let campaign = load_active_campaign(&self.repos, campaign_id).await?;
        if !campaign.is_experienced() {
            return Err(Error::BadRequest(
                "availability slots exist only for experienced campaigns".to_string(),
            ));
        }

        let slot = InterviewerSlot::new(campaign_id, actor.user_id, payload.start_time);
        if self.repos.slots.add_slot(&slot).await? {
            tracing::info!(
                slot_id = %slot.id,
                campaign_id = %campaign_id,
                interviewer_id = %actor.user_id,
                start_time = %slot.start_time,
                "Interviewer slot added"
            );
            return Ok(slot);
        }

        self.repos
            .slots
            .list_slots(campaign_id)
            .await?
            .into_iter()
            .find(|s| s.interviewer_id == slot.interviewer_id && s.start_time == slot.start_time)
            .ok_or_else(|| Error::Internal("slot vanished after a duplicate insert".to_string()))
    }

    pub async fn remove(&self, actor: &Actor, slot_id: Uuid) -> Result<()> {
        let slot = self
            .repos
            .slots
            .get_slot(slot_id)
            .await?
            .ok_or_else(|| Error::not_found("Slot", slot_id))?;
        if slot.interviewer_id != actor.user_id {
            return Err(Error::Forbidden(
                "Only the owning interviewer may remove a slot".to_string(),
            ));
        }
        if !self.repos.slots.remove_slot(slot_id).await? {
            return Err(Error::not_found("Slot", slot_id));
        }
        tracing::info!(slot_id = %slot_id, "Interviewer slot removed");
        Ok(())
    }

    pub async fn list(&self, campaign_id: Uuid) -> Result<Vec<InterviewerSlot>> {
        load_campaign(&self.repos, campaign_id).await?;
        self.repos.slots.list_slots(campaign_id).await
    }
}
