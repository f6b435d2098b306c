use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::feedback::{FeedbackResult, SkillRating};
use crate::utils::validation::{clean_optional, not_blank};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignInterviewPayload {
    pub interviewer_id: Uuid,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignInterviewPayload {
    pub interviewer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SkillRatingPayload {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub skill: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
}

/// Verdict submitted when completing an interview or revising feedback.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackPayload {
    pub result: FeedbackResult,
    #[validate(length(min = 1, max = 10000), custom(function = "not_blank"))]
    pub feedback: String,
    pub pointers_for_next_interviewer: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub skill_ratings: Vec<SkillRatingPayload>,
}

impl FeedbackPayload {
    pub fn skill_ratings(&self) -> Vec<SkillRating> {
        self.skill_ratings
            .iter()
            .map(|r| SkillRating {
                skill: r.skill.trim().to_string(),
                rating: r.rating,
            })
            .collect()
    }

    pub fn pointers(&self) -> Option<String> {
        clean_optional(self.pointers_for_next_interviewer.clone())
    }
}
