use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::CandidateProfile;
use crate::utils::validation::{clean_optional, normalize_email, not_blank};

/// Identity fields for interactive creation and detail edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CandidatePayload {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
    pub resume_link: Option<String>,
    pub current_role: Option<String>,
}

impl CandidatePayload {
    pub fn into_profile(self) -> CandidateProfile {
        CandidateProfile {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: clean_optional(self.phone),
            college: clean_optional(self.college),
            department: clean_optional(self.department),
            resume_link: clean_optional(self.resume_link),
            current_role: clean_optional(self.current_role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StatusChange {
    Hire { hired_role: String },
    Reject,
    Reinclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoShowAction {
    Reschedule,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoShowPayload {
    pub action: NoShowAction,
}
