use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
    strum::Display, strum::EnumString,
)]
#[sqlx(type_name = "candidate_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CandidateStatus {
    InPipeline,
    Selected,
    Rejected,
    NoShow,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub resume_link: Option<String>,
    #[sqlx(rename = "present_role")]
    pub current_role: Option<String>,
    pub hired_role: Option<String>,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity and profile fields shared by creation and detail edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub resume_link: Option<String>,
    pub current_role: Option<String>,
}

impl Candidate {
    pub fn new(campaign_id: Uuid, profile: CandidateProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            college: profile.college,
            department: profile.department,
            resume_link: profile.resume_link,
            current_role: profile.current_role,
            hired_role: None,
            status: CandidateStatus::InPipeline,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> CandidateProfile {
        CandidateProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            college: self.college.clone(),
            department: self.department.clone(),
            resume_link: self.resume_link.clone(),
            current_role: self.current_role.clone(),
        }
    }
}

/// A candidate that keeps a campaign from being completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingCandidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&Candidate> for BlockingCandidate {
    fn from(value: &Candidate) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            email: value.email.clone(),
        }
    }
}
