//! Candidate repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repositories::campaign::lock_active_campaign;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateProfile, CandidateStatus};

pub const EMAIL_CONSTRAINT: &str = "candidates_campaign_email_key";
pub const PHONE_CONSTRAINT: &str = "candidates_campaign_phone_key";

#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Inserts one candidate, surfacing a uniqueness violation as a
    /// field-level [`Error::Conflict`]. Fails when the campaign is completed.
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()>;

    /// Inserts the batch in one unit of work. Rows colliding with an existing
    /// email or phone in the campaign are skipped; the inserted rows are
    /// returned.
    async fn insert_candidates_skipping_duplicates(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>>;

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;
    async fn find_by_emails(&self, campaign_id: Uuid, emails: &[String]) -> Result<Vec<Candidate>>;
    async fn list_candidates(&self, campaign_id: Uuid) -> Result<Vec<Candidate>>;
    async fn list_by_status(
        &self,
        campaign_id: Uuid,
        status: CandidateStatus,
    ) -> Result<Vec<Candidate>>;
    async fn update_details(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
        at: DateTime<Utc>,
    ) -> Result<Candidate>;
    async fn set_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
        hired_role: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Candidate>;
}

/// Maps a unique violation on the candidates table to the field it guards.
pub fn conflict_from_constraint(constraint: &str) -> Option<Error> {
    match constraint {
        EMAIL_CONSTRAINT => Some(Error::conflict(
            "email",
            "A candidate with this email already exists in the campaign",
        )),
        PHONE_CONSTRAINT => Some(Error::conflict(
            "phone",
            "A candidate with this phone number already exists in the campaign",
        )),
        _ => None,
    }
}

fn map_unique_violation(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(conflict) = db_err.constraint().and_then(conflict_from_constraint) {
                return conflict;
            }
        }
    }
    Error::from(err)
}

pub struct PgCandidateRepository {
    pool: PgPool,
}

impl PgCandidateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_CANDIDATE: &str = r#"
    INSERT INTO candidates (
        id, campaign_id, name, email, phone, college, department, resume_link,
        present_role, hired_role, status, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

fn bind_candidate<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    c: &'q Candidate,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(c.id)
        .bind(c.campaign_id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.college)
        .bind(&c.department)
        .bind(&c.resume_link)
        .bind(&c.current_role)
        .bind(&c.hired_role)
        .bind(c.status)
        .bind(c.created_at)
        .bind(c.updated_at)
}

#[async_trait]
impl CandidateRepository for PgCandidateRepository {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        lock_active_campaign(&mut tx, candidate.campaign_id).await?;
        bind_candidate(sqlx::query(INSERT_CANDIDATE), candidate)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;
        tx.commit().await?;
        Ok(())
    }

    async fn insert_candidates_skipping_duplicates(
        &self,
        candidates: &[Candidate],
    ) -> Result<Vec<Candidate>> {
        let sql = format!("{} ON CONFLICT DO NOTHING RETURNING id", INSERT_CANDIDATE);
        let mut tx = self.pool.begin().await?;
        let mut campaign_ids: Vec<Uuid> = candidates.iter().map(|c| c.campaign_id).collect();
        campaign_ids.sort();
        campaign_ids.dedup();
        for campaign_id in campaign_ids {
            lock_active_campaign(&mut tx, campaign_id).await?;
        }

        let mut inserted = Vec::new();
        for candidate in candidates {
            let row = bind_candidate(sqlx::query(&sql), candidate)
                .fetch_optional(&mut *tx)
                .await?;
            if row.is_some() {
                inserted.push(candidate.clone());
            }
        }
        tx.commit().await?;
        Ok(inserted)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn find_by_emails(&self, campaign_id: Uuid, emails: &[String]) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(
            "SELECT * FROM candidates WHERE campaign_id = $1 AND email = ANY($2)",
        )
        .bind(campaign_id)
        .bind(emails)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn list_candidates(&self, campaign_id: Uuid) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(
            "SELECT * FROM candidates WHERE campaign_id = $1 ORDER BY created_at ASC, name ASC",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn list_by_status(
        &self,
        campaign_id: Uuid,
        status: CandidateStatus,
    ) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(
            r#"
            SELECT * FROM candidates
            WHERE campaign_id = $1 AND status = $2
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(campaign_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    async fn update_details(
        &self,
        id: Uuid,
        profile: &CandidateProfile,
        at: DateTime<Utc>,
    ) -> Result<Candidate> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"
            UPDATE candidates
            SET name = $2, email = $3, phone = $4, college = $5, department = $6,
                resume_link = $7, present_role = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.college)
        .bind(&profile.department)
        .bind(&profile.resume_link)
        .bind(&profile.current_role)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        candidate.ok_or_else(|| Error::not_found("Candidate", id))
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: CandidateStatus,
        hired_role: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Candidate> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"
            UPDATE candidates
            SET status = $2, hired_role = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(hired_role)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        candidate.ok_or_else(|| Error::not_found("Candidate", id))
    }
}
