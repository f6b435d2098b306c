use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr)]
pub enum AuditAction {
    #[strum(serialize = "campaign.create")]
    #[serde(rename = "campaign.create")]
    CampaignCreate,
    #[strum(serialize = "campaign.complete")]
    #[serde(rename = "campaign.complete")]
    CampaignComplete,
    #[strum(serialize = "candidate.create")]
    #[serde(rename = "candidate.create")]
    CandidateCreate,
    #[strum(serialize = "candidate.update")]
    #[serde(rename = "candidate.update")]
    CandidateUpdate,
    #[strum(serialize = "candidate.bulk_upload")]
    #[serde(rename = "candidate.bulk_upload")]
    CandidateBulkUpload,
    #[strum(serialize = "candidate.status_change")]
    #[serde(rename = "candidate.status_change")]
    CandidateStatusChange,
    #[strum(serialize = "interview.assign")]
    #[serde(rename = "interview.assign")]
    InterviewAssign,
    #[strum(serialize = "interview.start")]
    #[serde(rename = "interview.start")]
    InterviewStart,
    #[strum(serialize = "interview.complete")]
    #[serde(rename = "interview.complete")]
    InterviewComplete,
    #[strum(serialize = "interview.reassign")]
    #[serde(rename = "interview.reassign")]
    InterviewReassign,
    #[strum(serialize = "interview.cancel")]
    #[serde(rename = "interview.cancel")]
    InterviewCancel,
    #[strum(serialize = "feedback.edit")]
    #[serde(rename = "feedback.edit")]
    FeedbackEdit,
    #[strum(serialize = "user.create")]
    #[serde(rename = "user.create")]
    UserCreate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityType {
    Campaign,
    Candidate,
    Interview,
    Feedback,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}
