use chrono::{DateTime, Utc};

use crate::database::Repositories;
use crate::error::Result;
use crate::models::campaign::CampaignType;
use crate::models::user::Actor;
use crate::pipeline::{detect_stuck, StuckCandidate};
use crate::services::campaign_service::load_aggregates;

#[derive(Clone)]
pub struct StuckService {
    repos: Repositories,
}

impl StuckService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn stuck_candidates(&self, actor: &Actor) -> Result<Vec<StuckCandidate>> {
        actor.require_admin("view stuck candidates")?;
        self.stuck_candidates_at(Utc::now()).await
    }

    /// Stalled candidates across every active fresher campaign as of `now`,
    /// longest wait first.
    pub async fn stuck_candidates_at(&self, now: DateTime<Utc>) -> Result<Vec<StuckCandidate>> {
        let campaigns = self
            .repos
            .campaigns
            .list_active_by_type(CampaignType::Fresher)
            .await?;

        let mut aggregates = Vec::new();
        for campaign in &campaigns {
            aggregates.extend(load_aggregates(&self.repos, campaign.id).await?);
        }
        let stuck = detect_stuck(&aggregates, now);
        tracing::debug!(
            campaigns = campaigns.len(),
            stuck = stuck.len(),
            "Stuck candidate scan finished"
        );
        Ok(stuck)
    }
}
