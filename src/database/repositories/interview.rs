//! Interview and feedback repository.
//!
//! Interviews and their feedback live in separate tables but are always
//! written together, so both are owned by this repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::repositories::campaign::lock_active_campaign;
use crate::error::{Error, Result};
use crate::models::candidate::CandidateStatus;
use crate::models::feedback::{Feedback, FeedbackResult, SkillRating};
use crate::models::interview::{Interview, InterviewRecord};

pub const ACTIVE_PAIR_CONSTRAINT: &str = "interviews_active_pair_key";

/// Everything `complete` persists in one transaction.
#[derive(Debug, Clone)]
pub struct CompletionWrite {
    pub interview_id: Uuid,
    pub candidate_id: Uuid,
    pub feedback: Feedback,
    pub completed_at: DateTime<Utc>,
    /// New candidate status, when the verdict moves the candidate.
    pub candidate_status: Option<CandidateStatus>,
}

/// A revision of WEAK_HIRE feedback, applied only while the candidate has no
/// active interview.
#[derive(Debug, Clone)]
pub struct FeedbackRevision {
    pub interview_id: Uuid,
    pub candidate_id: Uuid,
    pub result: FeedbackResult,
    pub feedback: String,
    pub pointers_for_next_interviewer: Option<String>,
    pub skill_ratings: Vec<SkillRating>,
    pub updated_at: DateTime<Utc>,
    pub candidate_status: Option<CandidateStatus>,
}

#[derive(Debug, Clone)]
pub struct ReplayRound {
    pub interviewer_email: String,
    pub interview: Interview,
    pub feedback: Feedback,
}

/// Historical rounds for one candidate, replayed as completed interviews.
#[derive(Debug, Clone)]
pub struct ReplayBatch {
    pub candidate_id: Uuid,
    pub rounds: Vec<ReplayRound>,
    /// Applied only when at least one round was created.
    pub final_status: Option<CandidateStatus>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub created: usize,
    /// Interviewer emails whose round was skipped because the candidate
    /// already had an interview with them.
    pub duplicate_interviewers: Vec<String>,
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Inserts a scheduled interview. Returns `false` when the pair already
    /// has an active interview; fails when the candidate's campaign is
    /// completed.
    async fn insert_interview(&self, interview: &Interview) -> Result<bool>;
    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>>;
    async fn get_feedback(&self, interview_id: Uuid) -> Result<Option<Feedback>>;
    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewRecord>>;
    async fn list_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<InterviewRecord>>;
    async fn list_for_interviewer(&self, interviewer_id: Uuid) -> Result<Vec<InterviewRecord>>;
    /// scheduled -> ongoing. Returns `false` if the interview was no longer
    /// scheduled.
    async fn mark_started(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    /// Feedback insert, ongoing -> completed and the candidate cascade, all or
    /// nothing. Returns `false` if the interview was no longer ongoing.
    async fn record_completion(&self, write: &CompletionWrite) -> Result<bool>;
    /// Returns `false` if the feedback is no longer WEAK_HIRE or the
    /// candidate picked up an active interview.
    async fn revise_feedback(&self, revision: &FeedbackRevision) -> Result<bool>;
    /// Returns `false` if the interview completed in the meantime.
    async fn reassign(&self, id: Uuid, interviewer_id: Uuid) -> Result<bool>;
    /// Removes a still scheduled interview.
    async fn delete_scheduled(&self, id: Uuid) -> Result<bool>;
    async fn replay_history(&self, batch: &ReplayBatch) -> Result<ReplayOutcome>;
}

pub struct PgInterviewRepository {
    pool: PgPool,
}

impl PgInterviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_feedback(&self, interviews: Vec<Interview>) -> Result<Vec<InterviewRecord>> {
        let ids: Vec<Uuid> = interviews.iter().map(|i| i.id).collect();
        let feedback = sqlx::query_as::<_, Feedback>(
            "SELECT * FROM feedback WHERE interview_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(attach_feedback(interviews, feedback))
    }
}

/// Pairs each interview with its feedback row, keeping interview order.
pub(crate) fn attach_feedback(
    interviews: Vec<Interview>,
    feedback: Vec<Feedback>,
) -> Vec<InterviewRecord> {
    let mut by_interview: HashMap<Uuid, Feedback> =
        feedback.into_iter().map(|f| (f.interview_id, f)).collect();
    interviews
        .into_iter()
        .map(|interview| {
            let feedback = by_interview.remove(&interview.id);
            InterviewRecord { interview, feedback }
        })
        .collect()
}

async fn insert_feedback(tx: &mut Transaction<'_, Postgres>, feedback: &Feedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (
            id, interview_id, result, feedback, pointers_for_next_interviewer,
            skill_ratings, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(feedback.id)
    .bind(feedback.interview_id)
    .bind(feedback.result)
    .bind(&feedback.feedback)
    .bind(&feedback.pointers_for_next_interviewer)
    .bind(&feedback.skill_ratings)
    .bind(feedback.created_at)
    .bind(feedback.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn update_candidate_status(
    tx: &mut Transaction<'_, Postgres>,
    candidate_id: Uuid,
    status: CandidateStatus,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE candidates SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(candidate_id)
        .bind(status)
        .bind(at)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Locks the campaign the candidate belongs to; see [`lock_active_campaign`].
async fn lock_candidate_campaign(conn: &mut PgConnection, candidate_id: Uuid) -> Result<()> {
    let campaign_id: Option<Uuid> =
        sqlx::query_scalar("SELECT campaign_id FROM candidates WHERE id = $1")
            .bind(candidate_id)
            .fetch_optional(&mut *conn)
            .await?;
    let campaign_id = campaign_id.ok_or_else(|| Error::not_found("Candidate", candidate_id))?;
    lock_active_campaign(conn, campaign_id).await
}

const INSERT_INTERVIEW: &str = r#"
    INSERT INTO interviews (
        id, candidate_id, interviewer_id, scheduled_at, status, started_at, completed_at, created_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

#[async_trait]
impl InterviewRepository for PgInterviewRepository {
    async fn insert_interview(&self, interview: &Interview) -> Result<bool> {
        let sql = format!(
            "{} ON CONFLICT (candidate_id, interviewer_id) WHERE status <> 'completed' DO NOTHING",
            INSERT_INTERVIEW
        );
        let mut tx = self.pool.begin().await?;
        lock_candidate_campaign(&mut tx, interview.candidate_id).await?;
        let res = sqlx::query(&sql)
            .bind(interview.id)
            .bind(interview.candidate_id)
            .bind(interview.interviewer_id)
            .bind(interview.scheduled_at)
            .bind(interview.status)
            .bind(interview.started_at)
            .bind(interview.completed_at)
            .bind(interview.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(res.rows_affected() == 1)
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<Interview>> {
        let interview = sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(interview)
    }

    async fn get_feedback(&self, interview_id: Uuid) -> Result<Option<Feedback>> {
        let feedback =
            sqlx::query_as::<_, Feedback>("SELECT * FROM feedback WHERE interview_id = $1")
                .bind(interview_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(feedback)
    }

    async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<InterviewRecord>> {
        let interviews = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE candidate_id = $1 ORDER BY created_at ASC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_feedback(interviews).await
    }

    async fn list_for_campaign(&self, campaign_id: Uuid) -> Result<Vec<InterviewRecord>> {
        let interviews = sqlx::query_as::<_, Interview>(
            r#"
            SELECT i.* FROM interviews i
            JOIN candidates c ON c.id = i.candidate_id
            WHERE c.campaign_id = $1
            ORDER BY i.created_at ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_feedback(interviews).await
    }

    async fn list_for_interviewer(&self, interviewer_id: Uuid) -> Result<Vec<InterviewRecord>> {
        let interviews = sqlx::query_as::<_, Interview>(
            "SELECT * FROM interviews WHERE interviewer_id = $1 ORDER BY scheduled_at ASC",
        )
        .bind(interviewer_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_feedback(interviews).await
    }

    async fn mark_started(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE interviews SET status = 'ongoing', started_at = $2
            WHERE id = $1 AND status = 'scheduled'
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn record_completion(&self, write: &CompletionWrite) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken here serializes racing completions of one interview.
        let res = sqlx::query(
            r#"
            UPDATE interviews SET status = 'completed', completed_at = $2
            WHERE id = $1 AND status = 'ongoing'
            "#,
        )
        .bind(write.interview_id)
        .bind(write.completed_at)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_feedback(&mut tx, &write.feedback).await?;

        if let Some(status) = write.candidate_status {
            update_candidate_status(&mut tx, write.candidate_id, status, write.completed_at)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn revise_feedback(&self, revision: &FeedbackRevision) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let res = sqlx::query(
            r#"
            UPDATE feedback
            SET result = $2, feedback = $3, pointers_for_next_interviewer = $4,
                skill_ratings = $5, updated_at = $6
            WHERE interview_id = $1
              AND result = 'WEAK_HIRE'
              AND NOT EXISTS (
                  SELECT 1 FROM interviews
                  WHERE candidate_id = $7 AND status <> 'completed'
              )
            "#,
        )
        .bind(revision.interview_id)
        .bind(revision.result)
        .bind(&revision.feedback)
        .bind(&revision.pointers_for_next_interviewer)
        .bind(sqlx::types::Json(&revision.skill_ratings))
        .bind(revision.updated_at)
        .bind(revision.candidate_id)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        if let Some(status) = revision.candidate_status {
            update_candidate_status(&mut tx, revision.candidate_id, status, revision.updated_at)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn reassign(&self, id: Uuid, interviewer_id: Uuid) -> Result<bool> {
        let res = sqlx::query(
            "UPDATE interviews SET interviewer_id = $2 WHERE id = $1 AND status <> 'completed'",
        )
        .bind(id)
        .bind(interviewer_id)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some(ACTIVE_PAIR_CONSTRAINT) =>
            {
                Error::InvalidTransition(
                    "the new interviewer already has an active interview with this candidate"
                        .to_string(),
                )
            }
            _ => Error::from(err),
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn delete_scheduled(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM interviews WHERE id = $1 AND status = 'scheduled'")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn replay_history(&self, batch: &ReplayBatch) -> Result<ReplayOutcome> {
        let mut tx = self.pool.begin().await?;
        lock_candidate_campaign(&mut tx, batch.candidate_id).await?;
        let mut outcome = ReplayOutcome::default();

        for round in &batch.rounds {
            let (exists,): (bool,) = sqlx::query_as(
                r#"
                SELECT EXISTS (
                    SELECT 1 FROM interviews WHERE candidate_id = $1 AND interviewer_id = $2
                )
                "#,
            )
            .bind(batch.candidate_id)
            .bind(round.interview.interviewer_id)
            .fetch_one(&mut *tx)
            .await?;
            if exists {
                outcome.duplicate_interviewers.push(round.interviewer_email.clone());
                continue;
            }

            let interview = &round.interview;
            sqlx::query(INSERT_INTERVIEW)
                .bind(interview.id)
                .bind(interview.candidate_id)
                .bind(interview.interviewer_id)
                .bind(interview.scheduled_at)
                .bind(interview.status)
                .bind(interview.started_at)
                .bind(interview.completed_at)
                .bind(interview.created_at)
                .execute(&mut *tx)
                .await?;
            insert_feedback(&mut tx, &round.feedback).await?;
            outcome.created += 1;
        }

        if outcome.created > 0 {
            if let Some(status) = batch.final_status {
                update_candidate_status(&mut tx, batch.candidate_id, status, batch.at).await?;
            }
        }

        tx.commit().await?;
        Ok(outcome)
    }
}
