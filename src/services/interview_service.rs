use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::database::repositories::{CompletionWrite, FeedbackRevision};
use crate::database::Repositories;
use crate::dto::interview_dto::{AssignInterviewPayload, FeedbackPayload, ReassignInterviewPayload};
use crate::error::{Error, Result};
use crate::models::audit_log::{AuditAction, EntityType};
use crate::models::candidate::Candidate;
use crate::models::feedback::{Feedback, FeedbackResult};
use crate::models::interview::{Interview, InterviewRecord, InterviewStatus};
use crate::models::user::{Actor, User};
use crate::pipeline::{
    candidate_transition, current_round, interview_transition, CandidateEvent, InterviewEvent,
    InterviewOutcome,
};
use crate::services::audit_service::AuditService;
use crate::services::campaign_service::load_active_campaign;

/// Result of an assignment. A repeated assignment for a pair that already has
/// an active interview returns that interview with `created = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignOutcome {
    pub interview: Interview,
    pub created: bool,
}

/// An interview as seen from the interviewer's queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewerAssignment {
    #[serde(flatten)]
    pub record: InterviewRecord,
    pub campaign_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_round: u32,
}

#[derive(Clone)]
pub struct InterviewService {
    repos: Repositories,
    audit: AuditService,
}

impl InterviewService {
    pub fn new(repos: Repositories, audit: AuditService) -> Self {
        Self { repos, audit }
    }

    pub async fn assign(
        &self,
        actor: &Actor,
        candidate_id: Uuid,
        payload: AssignInterviewPayload,
    ) -> Result<AssignOutcome> {
        actor.require_admin("assign interviews")?;
        let candidate = self.load_candidate(candidate_id).await?;
        load_active_campaign(&self.repos, candidate.campaign_id).await?;
        candidate_transition(candidate.status, CandidateEvent::Schedule)?;
        self.load_user(payload.interviewer_id).await?;

        let now = Utc::now();
        let interview = Interview::scheduled(
            candidate_id,
            payload.interviewer_id,
            payload.scheduled_at.unwrap_or(now),
            now,
        );

        if !self.repos.interviews.insert_interview(&interview).await? {
            tracing::warn!(
                candidate_id = %candidate_id,
                interviewer_id = %payload.interviewer_id,
                "Duplicate assignment ignored"
            );
            let existing = self
                .repos
                .interviews
                .list_for_candidate(candidate_id)
                .await?
                .into_iter()
                .map(|r| r.interview)
                .find(|i| i.interviewer_id == payload.interviewer_id && i.status.is_active());
            return match existing {
                Some(interview) => Ok(AssignOutcome {
                    interview,
                    created: false,
                }),
                None => Err(Error::InvalidTransition(
                    "interview changed concurrently, retry the request".to_string(),
                )),
            };
        }

        tracing::info!(
            interview_id = %interview.id,
            candidate_id = %candidate_id,
            interviewer_id = %interview.interviewer_id,
            "Interview assigned"
        );
        self.audit
            .log(
                actor,
                AuditAction::InterviewAssign,
                EntityType::Interview,
                interview.id,
                Some(json!({
                    "candidate_id": candidate_id,
                    "interviewer_id": interview.interviewer_id,
                    "scheduled_at": interview.scheduled_at,
                })),
            )
            .await;
        Ok(AssignOutcome {
            interview,
            created: true,
        })
    }

    pub async fn start(&self, actor: &Actor, interview_id: Uuid) -> Result<Interview> {
        let interview = self.load_interview(interview_id).await?;
        ensure_assigned(actor, &interview)?;
        let candidate = self.load_candidate(interview.candidate_id).await?;
        load_active_campaign(&self.repos, candidate.campaign_id).await?;
        interview_transition(interview.status, InterviewEvent::Start)?;

        if !self
            .repos
            .interviews
            .mark_started(interview_id, Utc::now())
            .await?
        {
            return Err(self.stale(interview_id, InterviewEvent::Start).await);
        }

        tracing::info!(interview_id = %interview_id, "Interview started");
        self.audit
            .log(actor, AuditAction::InterviewStart, EntityType::Interview, interview_id, None)
            .await;
        self.load_interview(interview_id).await
    }

    /// Records the verdict. Feedback, the interview state change and any
    /// candidate cascade commit together.
    pub async fn complete(
        &self,
        actor: &Actor,
        interview_id: Uuid,
        payload: FeedbackPayload,
    ) -> Result<InterviewRecord> {
        let interview = self.load_interview(interview_id).await?;
        ensure_assigned(actor, &interview)?;
        payload.validate()?;
        let candidate = self.load_candidate(interview.candidate_id).await?;
        let campaign = load_active_campaign(&self.repos, candidate.campaign_id).await?;
        interview_transition(interview.status, InterviewEvent::Complete)?;

        if payload.result == FeedbackResult::NoShow && !campaign.is_experienced() {
            return Err(Error::BadRequest(
                "NO_SHOW can only be recorded in experienced campaigns".to_string(),
            ));
        }

        let next = candidate_transition(
            candidate.status,
            CandidateEvent::InterviewConcluded(payload.result),
        )?;
        let now = Utc::now();
        let feedback = Feedback::new(
            interview_id,
            payload.result,
            payload.feedback.trim().to_string(),
            payload.pointers(),
            payload.skill_ratings(),
            now,
        );
        let write = CompletionWrite {
            interview_id,
            candidate_id: candidate.id,
            feedback,
            completed_at: now,
            candidate_status: (next != candidate.status).then_some(next),
        };

        if !self.repos.interviews.record_completion(&write).await? {
            return Err(self.stale(interview_id, InterviewEvent::Complete).await);
        }

        tracing::info!(
            interview_id = %interview_id,
            candidate_id = %candidate.id,
            result = %payload.result,
            candidate_status = %next,
            "Interview completed"
        );
        self.audit
            .log(
                actor,
                AuditAction::InterviewComplete,
                EntityType::Interview,
                interview_id,
                Some(json!({ "result": payload.result, "candidate_status": next })),
            )
            .await;
        self.load_record(interview_id).await
    }

    /// Revises WEAK_HIRE feedback while no later round is underway. Revising
    /// to NO_HIRE rejects the candidate.
    pub async fn edit_feedback(
        &self,
        actor: &Actor,
        interview_id: Uuid,
        payload: FeedbackPayload,
    ) -> Result<Feedback> {
        let interview = self.load_interview(interview_id).await?;
        if !actor.is_admin() && interview.interviewer_id != actor.user_id {
            return Err(Error::Forbidden(
                "Only the original interviewer or an admin may edit feedback".to_string(),
            ));
        }
        payload.validate()?;
        interview_transition(interview.status, InterviewEvent::ReviseFeedback)?;

        let existing = self
            .repos
            .interviews
            .get_feedback(interview_id)
            .await?
            .ok_or_else(|| Error::not_found("Feedback for interview", interview_id))?;
        if existing.result != FeedbackResult::WeakHire {
            return Err(Error::InvalidTransition(format!(
                "only WEAK_HIRE feedback can be edited, this interview was {}",
                existing.result
            )));
        }
        if payload.result == FeedbackResult::NoShow {
            return Err(Error::BadRequest(
                "feedback can only be revised to HIRE, NO_HIRE or WEAK_HIRE".to_string(),
            ));
        }

        let candidate = self.load_candidate(interview.candidate_id).await?;
        let history = self.repos.interviews.list_for_candidate(candidate.id).await?;
        if history.iter().any(|r| r.status().is_active()) {
            return Err(Error::InvalidTransition(
                "feedback cannot be edited while the candidate has an active interview"
                    .to_string(),
            ));
        }

        let next = candidate_transition(
            candidate.status,
            CandidateEvent::FeedbackRevised(payload.result),
        )?;
        let revision = FeedbackRevision {
            interview_id,
            candidate_id: candidate.id,
            result: payload.result,
            feedback: payload.feedback.trim().to_string(),
            pointers_for_next_interviewer: payload.pointers(),
            skill_ratings: payload.skill_ratings(),
            updated_at: Utc::now(),
            candidate_status: (next != candidate.status).then_some(next),
        };
        if !self.repos.interviews.revise_feedback(&revision).await? {
            return Err(Error::InvalidTransition(
                "feedback is no longer eligible for revision".to_string(),
            ));
        }

        tracing::info!(
            interview_id = %interview_id,
            from = %existing.result,
            to = %payload.result,
            "Feedback revised"
        );
        self.audit
            .log(
                actor,
                AuditAction::FeedbackEdit,
                EntityType::Feedback,
                existing.id,
                Some(json!({
                    "interview_id": interview_id,
                    "from": existing.result,
                    "to": payload.result,
                })),
            )
            .await;
        self.repos
            .interviews
            .get_feedback(interview_id)
            .await?
            .ok_or_else(|| Error::not_found("Feedback for interview", interview_id))
    }

    /// Hands a scheduled or ongoing interview to another interviewer.
    pub async fn reassign(
        &self,
        actor: &Actor,
        interview_id: Uuid,
        payload: ReassignInterviewPayload,
    ) -> Result<Interview> {
        actor.require_admin("reassign interviews")?;
        let interview = self.load_interview(interview_id).await?;
        interview_transition(interview.status, InterviewEvent::Reassign)?;
        if interview.interviewer_id == payload.interviewer_id {
            return Err(Error::InvalidTransition(
                "interview is already assigned to this interviewer".to_string(),
            ));
        }
        self.load_user(payload.interviewer_id).await?;

        if !self
            .repos
            .interviews
            .reassign(interview_id, payload.interviewer_id)
            .await?
        {
            return Err(self.stale(interview_id, InterviewEvent::Reassign).await);
        }

        tracing::info!(
            interview_id = %interview_id,
            from = %interview.interviewer_id,
            to = %payload.interviewer_id,
            "Interview reassigned"
        );
        self.audit
            .log(
                actor,
                AuditAction::InterviewReassign,
                EntityType::Interview,
                interview_id,
                Some(json!({
                    "from": interview.interviewer_id,
                    "to": payload.interviewer_id,
                })),
            )
            .await;
        self.load_interview(interview_id).await
    }

    /// Withdraws the candidate's single scheduled interview in an
    /// experienced campaign. Returns the removed interview.
    pub async fn cancel(&self, actor: &Actor, candidate_id: Uuid) -> Result<Interview> {
        actor.require_admin("cancel interviews")?;
        let candidate = self.load_candidate(candidate_id).await?;
        let campaign = load_active_campaign(&self.repos, candidate.campaign_id).await?;
        if !campaign.is_experienced() {
            return Err(Error::InvalidTransition(
                "interviews can only be cancelled in experienced campaigns".to_string(),
            ));
        }

        let history = self.repos.interviews.list_for_candidate(candidate_id).await?;
        if history.iter().any(|r| r.status() == InterviewStatus::Ongoing) {
            return Err(Error::InvalidTransition(
                "candidate has an ongoing interview, which cannot be cancelled".to_string(),
            ));
        }
        let scheduled: Vec<&Interview> = history
            .iter()
            .map(|r| &r.interview)
            .filter(|i| i.status == InterviewStatus::Scheduled)
            .collect();
        let interview = match scheduled.as_slice() {
            [only] => (*only).clone(),
            other => {
                return Err(Error::InvalidTransition(format!(
                    "candidate must have exactly one scheduled interview to cancel, found {}",
                    other.len()
                )))
            }
        };

        match interview_transition(interview.status, InterviewEvent::Cancel)? {
            InterviewOutcome::Voided => {}
            InterviewOutcome::Becomes(_) => {
                return Err(Error::Internal("cancel must void the interview".to_string()))
            }
        }
        if !self.repos.interviews.delete_scheduled(interview.id).await? {
            return Err(self.stale(interview.id, InterviewEvent::Cancel).await);
        }

        tracing::info!(
            interview_id = %interview.id,
            candidate_id = %candidate_id,
            "Interview cancelled"
        );
        self.audit
            .log(
                actor,
                AuditAction::InterviewCancel,
                EntityType::Interview,
                interview.id,
                Some(json!({
                    "candidate_id": candidate_id,
                    "interviewer_id": interview.interviewer_id,
                })),
            )
            .await;
        Ok(interview)
    }

    /// The actor's own interviews, with the candidate context needed to run
    /// them.
    pub async fn list_mine(&self, actor: &Actor) -> Result<Vec<InterviewerAssignment>> {
        let records = self
            .repos
            .interviews
            .list_for_interviewer(actor.user_id)
            .await?;

        let mut candidates: HashMap<Uuid, (Candidate, u32)> = HashMap::new();
        let mut assignments = Vec::with_capacity(records.len());
        for record in records {
            let candidate_id = record.interview.candidate_id;
            if !candidates.contains_key(&candidate_id) {
                let candidate = self.load_candidate(candidate_id).await?;
                let history = self.repos.interviews.list_for_candidate(candidate_id).await?;
                candidates.insert(candidate_id, (candidate, current_round(&history)));
            }
            let Some((candidate, round)) = candidates.get(&candidate_id) else {
                continue;
            };
            assignments.push(InterviewerAssignment {
                campaign_id: candidate.campaign_id,
                candidate_name: candidate.name.clone(),
                candidate_email: candidate.email.clone(),
                candidate_round: *round,
                record,
            });
        }
        Ok(assignments)
    }

    async fn load_interview(&self, id: Uuid) -> Result<Interview> {
        self.repos
            .interviews
            .get_interview(id)
            .await?
            .ok_or_else(|| Error::not_found("Interview", id))
    }

    async fn load_record(&self, id: Uuid) -> Result<InterviewRecord> {
        let interview = self.load_interview(id).await?;
        let feedback = self.repos.interviews.get_feedback(id).await?;
        Ok(InterviewRecord { interview, feedback })
    }

    async fn load_candidate(&self, id: Uuid) -> Result<Candidate> {
        self.repos
            .candidates
            .get_candidate(id)
            .await?
            .ok_or_else(|| Error::not_found("Candidate", id))
    }

    async fn load_user(&self, id: Uuid) -> Result<User> {
        self.repos
            .users
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("Interviewer", id))
    }

    /// Explains why a conditional write matched nothing: the interview moved
    /// on between the read and the write.
    async fn stale(&self, id: Uuid, event: InterviewEvent) -> Error {
        match self.repos.interviews.get_interview(id).await {
            Ok(Some(current)) => match interview_transition(current.status, event) {
                Err(err) => err.into(),
                Ok(_) => Error::InvalidTransition(
                    "interview changed concurrently, retry the request".to_string(),
                ),
            },
            Ok(None) => Error::not_found("Interview", id),
            Err(err) => err,
        }
    }
}

fn ensure_assigned(actor: &Actor, interview: &Interview) -> Result<()> {
    if interview.interviewer_id != actor.user_id {
        return Err(Error::Forbidden(
            "Only the assigned interviewer may run this interview".to_string(),
        ));
    }
    Ok(())
}
