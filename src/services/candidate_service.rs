use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::database::Repositories;
use crate::dto::candidate_dto::{CandidatePayload, NoShowAction, StatusChange};
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditAction, EntityType};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::interview::InterviewRecord;
use crate::models::user::Actor;
use crate::pipeline::{candidate_transition, CandidateAggregate, CandidateEvent, DisplayStatus};
use crate::services::audit_service::AuditService;
use crate::services::campaign_service::{load_active_campaign, load_aggregates, load_campaign};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSummary {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub display_status: DisplayStatus,
    pub current_round: u32,
}

impl From<&CandidateAggregate> for CandidateSummary {
    fn from(aggregate: &CandidateAggregate) -> Self {
        Self {
            candidate: aggregate.candidate.clone(),
            display_status: aggregate.display_status(),
            current_round: aggregate.current_round(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDetail {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub display_status: DisplayStatus,
    pub current_round: u32,
    pub interviews: Vec<InterviewRecord>,
}

impl From<CandidateAggregate> for CandidateDetail {
    fn from(aggregate: CandidateAggregate) -> Self {
        let display_status = aggregate.display_status();
        let current_round = aggregate.current_round();
        Self {
            candidate: aggregate.candidate,
            display_status,
            current_round,
            interviews: aggregate.interviews,
        }
    }
}

#[derive(Clone)]
pub struct CandidateService {
    repos: Repositories,
    audit: AuditService,
}

impl CandidateService {
    pub fn new(repos: Repositories, audit: AuditService) -> Self {
        Self { repos, audit }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        campaign_id: Uuid,
        payload: CandidatePayload,
    ) -> Result<Candidate> {
        actor.require_admin("add candidates")?;
        payload.validate()?;
        load_active_campaign(&self.repos, campaign_id).await?;

        let candidate = Candidate::new(campaign_id, payload.into_profile(), Utc::now());
        self.repos.candidates.insert_candidate(&candidate).await?;

        tracing::info!(
            candidate_id = %candidate.id,
            campaign_id = %campaign_id,
            "Candidate created"
        );
        self.audit
            .log(
                actor,
                AuditAction::CandidateCreate,
                EntityType::Candidate,
                candidate.id,
                Some(json!({ "campaign_id": campaign_id, "email": candidate.email })),
            )
            .await;
        Ok(candidate)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        payload: CandidatePayload,
    ) -> Result<Candidate> {
        actor.require_admin("edit candidates")?;
        payload.validate()?;
        let existing = self.load(id).await?;
        load_active_campaign(&self.repos, existing.campaign_id).await?;

        let profile = payload.into_profile();
        let candidate = self
            .repos
            .candidates
            .update_details(id, &profile, Utc::now())
            .await?;

        tracing::info!(candidate_id = %id, "Candidate details updated");
        self.audit
            .log(
                actor,
                AuditAction::CandidateUpdate,
                EntityType::Candidate,
                id,
                Some(json!({ "before": existing.profile(), "after": profile })),
            )
            .await;
        Ok(candidate)
    }

    /// Admin decision on a candidate: hire, reject, or bring back into the
    /// pipeline.
    pub async fn change_status(
        &self,
        actor: &Actor,
        id: Uuid,
        change: StatusChange,
    ) -> Result<Candidate> {
        actor.require_admin("change candidate status")?;
        let existing = self.load(id).await?;
        load_active_campaign(&self.repos, existing.campaign_id).await?;

        let (event, hired_role) = match change {
            StatusChange::Hire { hired_role } => {
                let role = hired_role.trim();
                if role.is_empty() {
                    return Err(Error::BadRequest(
                        "hired_role is required to select a candidate".to_string(),
                    ));
                }
                (CandidateEvent::Hire, Some(role.to_string()))
            }
            StatusChange::Reject => (CandidateEvent::Reject, None),
            StatusChange::Reinclude => (CandidateEvent::Reinclude, None),
        };
        let next = candidate_transition(existing.status, event)?;
        self.apply_status(actor, existing, next, hired_role).await
    }

    /// Resolves a no-show by putting the candidate back in the pipeline for
    /// the same round, or rejecting them.
    pub async fn resolve_no_show(
        &self,
        actor: &Actor,
        id: Uuid,
        action: NoShowAction,
    ) -> Result<Candidate> {
        actor.require_admin("resolve no-shows")?;
        let existing = self.load(id).await?;
        load_active_campaign(&self.repos, existing.campaign_id).await?;

        let event = match action {
            NoShowAction::Reschedule => CandidateEvent::NoShowRescheduled,
            NoShowAction::Reject => CandidateEvent::NoShowRejected,
        };
        let next = candidate_transition(existing.status, event)?;
        self.apply_status(actor, existing, next, None).await
    }

    pub async fn detail(&self, id: Uuid) -> Result<CandidateDetail> {
        let candidate = self.load(id).await?;
        let interviews = self.repos.interviews.list_for_candidate(id).await?;
        Ok(CandidateAggregate::new(candidate, interviews).into())
    }

    pub async fn list(&self, campaign_id: Uuid) -> Result<Vec<CandidateSummary>> {
        load_campaign(&self.repos, campaign_id).await?;
        let aggregates = load_aggregates(&self.repos, campaign_id).await?;
        Ok(aggregates.iter().map(CandidateSummary::from).collect())
    }

    async fn load(&self, id: Uuid) -> Result<Candidate> {
        self.repos
            .candidates
            .get_candidate(id)
            .await?
            .ok_or_else(|| Error::not_found("Candidate", id))
    }

    async fn apply_status(
        &self,
        actor: &Actor,
        existing: Candidate,
        next: CandidateStatus,
        hired_role: Option<String>,
    ) -> Result<Candidate> {
        let candidate = self
            .repos
            .candidates
            .set_status(existing.id, next, hired_role, Utc::now())
            .await?;

        tracing::info!(
            candidate_id = %candidate.id,
            from = %existing.status,
            to = %candidate.status,
            "Candidate status changed"
        );
        self.audit
            .log(
                actor,
                AuditAction::CandidateStatusChange,
                EntityType::Candidate,
                candidate.id,
                Some(json!({
                    "from": existing.status,
                    "to": candidate.status,
                    "hired_role": candidate.hired_role,
                })),
            )
            .await;
        Ok(candidate)
    }
}
