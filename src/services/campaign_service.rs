use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strum::IntoEnumIterator;
use uuid::Uuid;
use validator::Validate;

use crate::database::Repositories;
use crate::dto::campaign_dto::CreateCampaignPayload;
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditAction, EntityType};
use crate::models::campaign::{Campaign, CampaignStatus};
use crate::models::candidate::{BlockingCandidate, CandidateStatus};
use crate::models::interview::InterviewRecord;
use crate::models::user::Actor;
use crate::pipeline::{campaign_transition, CampaignEvent, CandidateAggregate, DisplayStatus};
use crate::services::audit_service::AuditService;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignStats {
    pub campaign_id: Uuid,
    pub total_candidates: usize,
    pub candidates_by_status: BTreeMap<DisplayStatus, usize>,
    pub interviews_by_status: BTreeMap<String, usize>,
    /// Rejected candidates keyed by the round their verdict landed in.
    pub rejections_per_round: BTreeMap<u32, usize>,
}

#[derive(Clone)]
pub struct CampaignService {
    repos: Repositories,
    audit: AuditService,
}

impl CampaignService {
    pub fn new(repos: Repositories, audit: AuditService) -> Self {
        Self { repos, audit }
    }

    pub async fn create(&self, actor: &Actor, payload: CreateCampaignPayload) -> Result<Campaign> {
        actor.require_admin("create campaigns")?;
        payload.validate()?;

        let campaign = Campaign {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            campaign_type: payload.campaign_type,
            status: CampaignStatus::Active,
            created_at: Utc::now(),
            created_by: actor.user_id,
        };
        self.repos.campaigns.create_campaign(&campaign).await?;

        tracing::info!(
            campaign_id = %campaign.id,
            campaign_type = %campaign.campaign_type,
            "Campaign created"
        );
        self.audit
            .log(
                actor,
                AuditAction::CampaignCreate,
                EntityType::Campaign,
                campaign.id,
                Some(json!({ "name": campaign.name, "type": campaign.campaign_type })),
            )
            .await;
        Ok(campaign)
    }

    pub async fn get(&self, id: Uuid) -> Result<Campaign> {
        load_campaign(&self.repos, id).await
    }

    pub async fn list(&self, status: Option<CampaignStatus>) -> Result<Vec<Campaign>> {
        self.repos.campaigns.list_campaigns(status).await
    }

    /// Closes the campaign once nobody is left in its pipeline. A blocked
    /// attempt returns the candidates still in the pipeline.
    pub async fn complete(&self, actor: &Actor, id: Uuid) -> Result<Campaign> {
        actor.require_admin("complete campaigns")?;
        let campaign = load_campaign(&self.repos, id).await?;
        campaign_transition(campaign.status, CampaignEvent::Complete)?;
        self.ensure_pipeline_empty(id).await?;

        if !self.repos.campaigns.mark_completed(id).await? {
            // Another request changed the campaign between the check and the
            // write; report whatever is true now.
            let campaign = load_campaign(&self.repos, id).await?;
            campaign_transition(campaign.status, CampaignEvent::Complete)?;
            self.ensure_pipeline_empty(id).await?;
            return Err(Error::InvalidTransition(
                "campaign changed concurrently, retry the request".to_string(),
            ));
        }

        tracing::info!(campaign_id = %id, "Campaign completed");
        self.audit
            .log(actor, AuditAction::CampaignComplete, EntityType::Campaign, id, None)
            .await;
        load_campaign(&self.repos, id).await
    }

    pub async fn stats(&self, id: Uuid) -> Result<CampaignStats> {
        load_campaign(&self.repos, id).await?;
        let aggregates = load_aggregates(&self.repos, id).await?;

        let mut candidates_by_status: BTreeMap<DisplayStatus, usize> =
            DisplayStatus::iter().map(|s| (s, 0)).collect();
        let mut interviews_by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut rejections_per_round: BTreeMap<u32, usize> = BTreeMap::new();

        for aggregate in &aggregates {
            *candidates_by_status.entry(aggregate.display_status()).or_default() += 1;
            for record in &aggregate.interviews {
                *interviews_by_status.entry(record.status().to_string()).or_default() += 1;
            }
            if aggregate.candidate.status == CandidateStatus::Rejected {
                *rejections_per_round.entry(aggregate.rejection_round()).or_default() += 1;
            }
        }

        Ok(CampaignStats {
            campaign_id: id,
            total_candidates: aggregates.len(),
            candidates_by_status,
            interviews_by_status,
            rejections_per_round,
        })
    }

    async fn ensure_pipeline_empty(&self, id: Uuid) -> Result<()> {
        let blocking = self
            .repos
            .candidates
            .list_by_status(id, CandidateStatus::InPipeline)
            .await?;
        if blocking.is_empty() {
            return Ok(());
        }
        tracing::info!(
            campaign_id = %id,
            blocking = blocking.len(),
            "Campaign completion blocked by pipeline candidates"
        );
        Err(Error::PipelineNotEmpty(
            blocking.iter().map(BlockingCandidate::from).collect(),
        ))
    }
}

pub(crate) async fn load_campaign(repos: &Repositories, id: Uuid) -> Result<Campaign> {
    repos
        .campaigns
        .get_campaign(id)
        .await?
        .ok_or_else(|| Error::not_found("Campaign", id))
}

/// Loads the campaign and rejects the call if it no longer accepts changes.
pub(crate) async fn load_active_campaign(repos: &Repositories, id: Uuid) -> Result<Campaign> {
    let campaign = load_campaign(repos, id).await?;
    campaign_transition(campaign.status, CampaignEvent::Mutate)?;
    Ok(campaign)
}

/// Every candidate of the campaign with its interview history.
pub(crate) async fn load_aggregates(
    repos: &Repositories,
    campaign_id: Uuid,
) -> Result<Vec<CandidateAggregate>> {
    let candidates = repos.candidates.list_candidates(campaign_id).await?;
    let interviews = repos.interviews.list_for_campaign(campaign_id).await?;

    let mut by_candidate: HashMap<Uuid, Vec<InterviewRecord>> = HashMap::new();
    for record in interviews {
        by_candidate
            .entry(record.interview.candidate_id)
            .or_default()
            .push(record);
    }

    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let interviews = by_candidate.remove(&candidate.id).unwrap_or_default();
            CandidateAggregate::new(candidate, interviews)
        })
        .collect())
}
