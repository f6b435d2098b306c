use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::feedback::{Feedback, FeedbackResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
    strum::Display, strum::EnumString,
)]
#[sqlx(type_name = "interview_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Ongoing,
    Completed,
}

impl InterviewStatus {
    /// Scheduled and ongoing interviews occupy the candidate/interviewer pair.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Scheduled | Self::Ongoing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub interviewer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: InterviewStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Interview {
    pub fn scheduled(
        candidate_id: Uuid,
        interviewer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            interviewer_id,
            scheduled_at,
            status: InterviewStatus::Scheduled,
            started_at: None,
            completed_at: None,
            created_at: now,
        }
    }

    /// A historical interview that is recorded directly as completed.
    pub fn replayed(candidate_id: Uuid, interviewer_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_id,
            interviewer_id,
            scheduled_at: at,
            status: InterviewStatus::Completed,
            started_at: None,
            completed_at: Some(at),
            created_at: at,
        }
    }
}

/// An interview together with its feedback, if one was submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRecord {
    #[serde(flatten)]
    pub interview: Interview,
    pub feedback: Option<Feedback>,
}

impl InterviewRecord {
    pub fn status(&self) -> InterviewStatus {
        self.interview.status
    }

    pub fn result(&self) -> Option<FeedbackResult> {
        self.feedback.as_ref().map(|f| f.result)
    }
}
