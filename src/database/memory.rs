//! In-process implementation of every repository trait.
//!
//! Each atomic write runs against a clone of the current state and is swapped
//! in only when it finishes, mirroring transaction commit and rollback. Used
//! by the test suite and for running the service without Postgres.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::repositories::interview::attach_feedback;
use crate::database::repositories::{
    conflict_from_constraint, AuditRepository, CampaignRepository,
    CandidateRepository, CompletionWrite, FeedbackRevision, InterviewRepository, ReplayBatch,
    ReplayOutcome, SlotRepository, UserRepository, EMAIL_CONSTRAINT, PHONE_CONSTRAINT,
};
use crate::error::{Error, Result};
use crate::models::audit_log::AuditLog;
use crate::models::campaign::{Campaign, CampaignStatus, CampaignType};
use crate::models::candidate::{Candidate, CandidateProfile, CandidateStatus};
use crate::models::feedback::{Feedback, FeedbackResult};
use crate::models::interview::{Interview, InterviewRecord, InterviewStatus};
use crate::models::slot::InterviewerSlot;
use crate::models::user::{Role, User};
use crate::pipeline::{campaign_transition, CampaignEvent};

#[derive(Debug, Clone, Default)]
struct State {
    users: Vec<User>,
    campaigns: Vec<Campaign>,
    candidates: Vec<Candidate>,
    interviews: Vec<Interview>,
    feedback: Vec<Feedback>,
    slots: Vec<InterviewerSlot>,
    audit: Vec<AuditLog>,
}

impl State {
    fn records(&self, interviews: Vec<Interview>) -> Vec<InterviewRecord> {
        let ids: Vec<Uuid> = interviews.iter().map(|i| i.id).collect();
        let feedback = self
            .feedback
            .iter()
            .filter(|f| ids.contains(&f.interview_id))
            .cloned()
            .collect();
        attach_feedback(interviews, feedback)
    }

    fn has_active_pair(&self, candidate_id: Uuid, interviewer_id: Uuid, skip: Option<Uuid>) -> bool {
        self.interviews.iter().any(|i| {
            Some(i.id) != skip
                && i.candidate_id == candidate_id
                && i.interviewer_id == interviewer_id
                && i.status.is_active()
        })
    }

    /// Name of the candidate uniqueness constraint `candidate` would violate.
    fn violated_candidate_constraint(&self, candidate: &Candidate) -> Option<&'static str> {
        let others = self
            .candidates
            .iter()
            .filter(|c| c.id != candidate.id && c.campaign_id == candidate.campaign_id);
        for other in others {
            if other.email == candidate.email {
                return Some(EMAIL_CONSTRAINT);
            }
            if candidate.phone.is_some() && other.phone == candidate.phone {
                return Some(PHONE_CONSTRAINT);
            }
        }
        None
    }

    fn ensure_campaign_accepts_changes(&self, campaign_id: Uuid) -> Result<()> {
        let campaign = self
            .campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .ok_or_else(|| Error::not_found("Campaign", campaign_id))?;
        campaign_transition(campaign.status, CampaignEvent::Mutate)?;
        Ok(())
    }

    fn ensure_candidate_campaign_accepts_changes(&self, candidate_id: Uuid) -> Result<()> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| c.id == candidate_id)
            .ok_or_else(|| Error::not_found("Candidate", candidate_id))?;
        self.ensure_campaign_accepts_changes(candidate.campaign_id)
    }

    fn candidate_mut(&mut self, id: Uuid) -> Result<&mut Candidate> {
        self.candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::not_found("Candidate", id))
    }

    fn set_candidate_status(&mut self, id: Uuid, status: CandidateStatus, at: DateTime<Utc>) -> Result<()> {
        let candidate = self.candidate_mut(id)?;
        candidate.status = status;
        candidate.updated_at = at;
        Ok(())
    }
}

/// Working copy of the state for one atomic write.
struct Stage {
    state: State,
    steps: usize,
    fail_after: Option<usize>,
}

impl Stage {
    /// Accounts for one statement of the write, failing if a fault was
    /// injected at this point.
    fn step(&mut self) -> Result<()> {
        if self.fail_after == Some(self.steps) {
            return Err(Error::Database(sqlx::Error::Protocol(format!(
                "simulated storage failure after {} step(s)",
                self.steps
            ))));
        }
        self.steps += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_after: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next atomic write fail once it has applied `after_steps`
    /// statements. Nothing from that write is kept.
    pub fn inject_failure(&self, after_steps: usize) {
        if let Ok(mut fail_after) = self.fail_after.lock() {
            *fail_after = Some(after_steps);
        }
    }

    /// Every audit entry recorded so far, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditLog> {
        self.lock().map(|s| s.audit.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T> {
        let state = self.lock()?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Stage) -> Result<T>) -> Result<T> {
        let mut state = self.lock()?;
        let fail_after = self
            .fail_after
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))?
            .take();
        let mut stage = Stage {
            state: state.clone(),
            steps: 0,
            fail_after,
        };
        let out = f(&mut stage)?;
        *state = stage.state;
        Ok(out)
    }
}

#[async_trait]
impl CampaignRepository for MemoryStore {
    async fn create_campaign(&self, campaign: &Campaign) -> Result<()> {
        self.write(|stage| {
            stage.step()?;
            stage.state.campaigns.push(campaign.clone());
            Ok(())
        })
    }

    async fn get_campaign(&self, id: Uuid) -> Result<Option<Campaign>> {
        self.read(|s| s.campaigns.iter().find(|c| c.id == id).cloned())
    }

    async fn list_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<Campaign>> {
        self.read(|s| {
            let mut campaigns: Vec<Campaign> = s
                .campaigns
                .iter()
                .filter(|c| status.map_or(true, |st| c.status == st))
                .cloned()
                .collect();
            campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            campaigns
        })
    }

    async fn list_active_by_type(&self, campaign_type: CampaignType) -> Result<Vec<Campaign>> {
        self.read(|s| {
            let mut campaigns: Vec<Campaign> = s
                .campaigns
                .iter()
                .filter(|c| c.is_active() && c.campaign_type == campaign_type)
                .cloned()
                .collect();
            campaigns.sort_by_key(|c| c.created_at);
            campaigns
        })
    }

    async fn mark_completed(&self, id: Uuid) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let blocked = stage
                .state
                .candidates
                .iter()
                .any(|c| c.campaign_id == id && c.status == CandidateStatus::InPipeline);
            match stage.state.campaigns.iter_mut().find(|c| c.id == id) {
                Some(campaign) if campaign.is_active() && !blocked => {
                    campaign.status = CampaignStatus::Completed;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }
}

#[async_trait]
impl CandidateRepository for MemoryStore {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        self.write(|stage| {
            stage.step()?;
            stage.state.ensure_campaign_accepts_changes(candidate.campaign_id)?;
            if let Some(constraint) = stage.state.violated_candidate_constraint(candidate) {
                return Err(conflict_from_constraint(constraint)
                    .unwrap_or_else(|| Error::Internal(constraint.to_string())));
            }
            stage.state.candidates.push(candidate.clone());
            Ok(())
        })
    }

    async fn insert_candidates_skipping_duplicates(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>> {
        self.write(|stage| {
            for candidate in candidates {
                stage.state.ensure_campaign_accepts_changes(candidate.campaign_id)?;
            }
            let mut inserted = Vec::new();
            for candidate in candidates {
                stage.step()?;
                if stage.state.violated_candidate_constraint(candidate).is_some() {
                    continue;
                }
                stage.state.candidates.push(candidate.clone());
                inserted.push(candidate.clone());
            }
            Ok(inserted)
        })
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        self.read(|s| s.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_emails(&self, campaign_id: Uuid, emails: &[String]) -> Result<Vec<Candidate>> {
        self.read(|s| {
            s.candidates
                .iter()
                .filter(|c| c.campaign_id == campaign_id && emails.contains(&c.email))
                .cloned()
                .collect()
        })
    }

    async fn list_candidates(&self, campaign_id: Uuid) -> Result<Vec<Candidate>> {
        self.read(|s| {
            let mut candidates: Vec<Candidate> = s
                .candidates
                .iter()
                .filter(|c| c.campaign_id == campaign_id)
                .cloned()
                .collect();
            candidates.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
            candidates
        })
    }

    async fn list_by_status(
        &self,
        campaign_id: Uuid,
        status: CandidateStatus,
    ) -> Result<Vec<Candidate>> {
        let candidates = self.list_candidates(campaign_id).await?;
        Ok(candidates.into_iter().filter(|c| c.status == status).collect())
    }

    async fn update_details(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
        at: DateTime<Utc>,
    ) -> Result<Candidate> {
        self.write(|stage| {
            stage.step()?;
            let mut updated = stage
                .state
                .candidates
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| Error::not_found("Candidate", id))?;
            updated.name = profile.name.clone();
            updated.email = profile.email.clone();
            updated.phone = profile.phone.clone();
            updated.college = profile.college.clone();
            updated.department = profile.department.clone();
            updated.resume_link = profile.resume_link.clone();
            updated.current_role = profile.current_role.clone();
            updated.updated_at = at;
            if let Some(constraint) = stage.state.violated_candidate_constraint(&updated) {
                return Err(conflict_from_constraint(constraint)
                    .unwrap_or_else(|| Error::Internal(constraint.to_string())));
            }
            *stage.state.candidate_mut(id)? = updated.clone();
            Ok(updated)
        })
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
        hired_role: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Candidate> {
        self.write(|stage| {
            stage.step()?;
            if status == CandidateStatus::Selected && hired_role.is_none() {
                return Err(Error::Database(sqlx::Error::Protocol(
                    "candidates_selected_requires_role violated".to_string(),
                )));
            }
            let candidate = stage.state.candidate_mut(id)?;
            candidate.status = status;
            candidate.hired_role = hired_role;
            candidate.updated_at = at;
            Ok(candidate.clone())
        })
    }
}

#[async_trait]
impl InterviewRepository for MemoryStore {
    async fn insert_interview(&self, interview: &Interview) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            stage
                .state
                .ensure_candidate_campaign_accepts_changes(interview.candidate_id)?;
            if stage
                .state
                .has_active_pair(interview.candidate_id, interview.interviewer_id, None)
            {
                return Ok(false);
            }
            stage.state.interviews.push(interview.clone());
            Ok(true)
        })
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>> {
        self.read(|s| s.interviews.iter().find(|i| i.id == id).cloned())
    }

    async fn get_feedback(&self, interview_id: Uuid) -> Result<Option<Feedback>> {
        self.read(|s| s.feedback.iter().find(|f| f.interview_id == interview_id).cloned())
    }

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewRecord>> {
        self.read(|s| {
            let mut interviews: Vec<Interview> = s
                .interviews
                .iter()
                .filter(|i| i.candidate_id == candidate_id)
                .cloned()
                .collect();
            interviews.sort_by_key(|i| i.created_at);
            s.records(interviews)
        })
    }

    async fn list_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<InterviewRecord>> {
        self.read(|s| {
            let candidate_ids: Vec<Uuid> = s
                .candidates
                .iter()
                .filter(|c| c.campaign_id == campaign_id)
                .map(|c| c.id)
                .collect();
            let mut interviews: Vec<Interview> = s
                .interviews
                .iter()
                .filter(|i| candidate_ids.contains(&i.candidate_id))
                .cloned()
                .collect();
            interviews.sort_by_key(|i| i.created_at);
            s.records(interviews)
        })
    }

    async fn list_for_interviewer(&self, interviewer_id: Uuid) -> Result<Vec<InterviewRecord>> {
        self.read(|s| {
            let mut interviews: Vec<Interview> = s
                .interviews
                .iter()
                .filter(|i| i.interviewer_id == interviewer_id)
                .cloned()
                .collect();
            interviews.sort_by_key(|i| i.scheduled_at);
            s.records(interviews)
        })
    }

    async fn mark_started(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            match stage.state.interviews.iter_mut().find(|i| i.id == id) {
                Some(interview) if interview.status == InterviewStatus::Scheduled => {
                    interview.status = InterviewStatus::Ongoing;
                    interview.started_at = Some(at);
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    async fn record_completion(&self, write: &CompletionWrite) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            match stage.state.interviews.iter_mut().find(|i| i.id == write.interview_id) {
                Some(interview) if interview.status == InterviewStatus::Ongoing => {
                    interview.status = InterviewStatus::Completed;
                    interview.completed_at = Some(write.completed_at);
                }
                _ => return Ok(false),
            }

            stage.step()?;
            if stage
                .state
                .feedback
                .iter()
                .any(|f| f.interview_id == write.interview_id)
            {
                return Err(Error::conflict("interview_id", "Feedback already exists"));
            }
            stage.state.feedback.push(write.feedback.clone());

            if let Some(status) = write.candidate_status {
                stage.step()?;
                stage
                    .state
                    .set_candidate_status(write.candidate_id, status, write.completed_at)?;
            }
            Ok(true)
        })
    }

    async fn revise_feedback(&self, revision: &FeedbackRevision) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let busy = stage
                .state
                .interviews
                .iter()
                .any(|i| i.candidate_id == revision.candidate_id && i.status.is_active());
            let feedback = stage
                .state
                .feedback
                .iter_mut()
                .find(|f| f.interview_id == revision.interview_id);
            match feedback {
                Some(feedback) if feedback.result == FeedbackResult::WeakHire && !busy => {
                    feedback.result = revision.result;
                    feedback.feedback = revision.feedback.clone();
                    feedback.pointers_for_next_interviewer =
                        revision.pointers_for_next_interviewer.clone();
                    feedback.skill_ratings = sqlx::types::Json(revision.skill_ratings.clone());
                    feedback.updated_at = revision.updated_at;
                }
                _ => return Ok(false),
            }

            if let Some(status) = revision.candidate_status {
                stage.step()?;
                stage
                    .state
                    .set_candidate_status(revision.candidate_id, status, revision.updated_at)?;
            }
            Ok(true)
        })
    }

    async fn reassign(&self, id: Uuid, interviewer_id: Uuid) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let Some(current) = stage.state.interviews.iter().find(|i| i.id == id).cloned() else {
                return Ok(false);
            };
            if !current.status.is_active() {
                return Ok(false);
            }
            if stage
                .state
                .has_active_pair(current.candidate_id, interviewer_id, Some(id))
            {
                return Err(Error::InvalidTransition(
                    "the new interviewer already has an active interview with this candidate"
                        .to_string(),
                ));
            }
            if let Some(interview) = stage.state.interviews.iter_mut().find(|i| i.id == id) {
                interview.interviewer_id = interviewer_id;
            }
            Ok(true)
        })
    }

    async fn delete_scheduled(&self, id: Uuid) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let before = stage.state.interviews.len();
            stage
                .state
                .interviews
                .retain(|i| !(i.id == id && i.status == InterviewStatus::Scheduled));
            let removed = stage.state.interviews.len() != before;
            if removed {
                stage.state.feedback.retain(|f| f.interview_id != id);
            }
            Ok(removed)
        })
    }

    async fn replay_history(&self, batch: &ReplayBatch) -> Result<ReplayOutcome> {
        self.write(|stage| {
            stage
                .state
                .ensure_candidate_campaign_accepts_changes(batch.candidate_id)?;
            let mut outcome = ReplayOutcome::default();
            for round in &batch.rounds {
                let duplicate = stage.state.interviews.iter().any(|i| {
                    i.candidate_id == batch.candidate_id
                        && i.interviewer_id == round.interview.interviewer_id
                });
                if duplicate {
                    outcome.duplicate_interviewers.push(round.interviewer_email.clone());
                    continue;
                }
                stage.step()?;
                stage.state.interviews.push(round.interview.clone());
                stage.step()?;
                stage.state.feedback.push(round.feedback.clone());
                outcome.created += 1;
            }

            if outcome.created > 0 {
                if let Some(status) = batch.final_status {
                    stage.step()?;
                    stage
                        .state
                        .set_candidate_status(batch.candidate_id, status, batch.at)?;
                }
            }
            Ok(outcome)
        })
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.read(|s| s.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>> {
        self.read(|s| {
            s.users
                .iter()
                .filter(|u| emails.contains(&u.email))
                .cloned()
                .collect()
        })
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        self.read(|s| {
            let mut users: Vec<User> = s
                .users
                .iter()
                .filter(|u| role.map_or(true, |r| u.role == r))
                .cloned()
                .collect();
            users.sort_by(|a, b| a.name.cmp(&b.name));
            users
        })
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.write(|stage| {
            stage.step()?;
            if stage.state.users.iter().any(|u| u.email == user.email) {
                return Err(Error::conflict("email", "A user with this email already exists"));
            }
            stage.state.users.push(user.clone());
            Ok(())
        })
    }
}

#[async_trait]
impl SlotRepository for MemoryStore {
    async fn add_slot(&self, slot: &InterviewerSlot) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let exists = stage.state.slots.iter().any(|s| {
                s.interviewer_id == slot.interviewer_id
                    && s.campaign_id == slot.campaign_id
                    && s.start_time == slot.start_time
            });
            if exists {
                return Ok(false);
            }
            stage.state.slots.push(slot.clone());
            Ok(true)
        })
    }

    async fn get_slot(&self, id: Uuid) -> Result<Option<InterviewerSlot>> {
        self.read(|s| s.slots.iter().find(|slot| slot.id == id).cloned())
    }

    async fn remove_slot(&self, id: Uuid) -> Result<bool> {
        self.write(|stage| {
            stage.step()?;
            let before = stage.state.slots.len();
            stage.state.slots.retain(|s| s.id != id);
            Ok(stage.state.slots.len() != before)
        })
    }

    async fn list_slots(&self, campaign_id: Uuid) -> Result<Vec<InterviewerSlot>> {
        self.read(|s| {
            let mut slots: Vec<InterviewerSlot> = s
                .slots
                .iter()
                .filter(|slot| slot.campaign_id == campaign_id)
                .cloned()
                .collect();
            slots.sort_by_key(|slot| (slot.start_time, slot.interviewer_id));
            slots
        })
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn record(&self, entry: &AuditLog) -> Result<()> {
        self.write(|stage| {
            stage.step()?;
            stage.state.audit.push(entry.clone());
            Ok(())
        })
    }

    async fn recent(&self, limit: i64) -> Result<Vec<AuditLog>> {
        self.read(|s| {
            let limit = usize::try_from(limit).unwrap_or(0);
            s.audit.iter().rev().take(limit).cloned().collect()
        })
    }
}
