use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
    strum::Display, strum::EnumString,
)]
#[sqlx(type_name = "feedback_result", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackResult {
    Hire,
    NoHire,
    WeakHire,
    NoShow,
}

impl FeedbackResult {
    /// HIRE and WEAK_HIRE move the candidate on to the next round.
    pub fn advances_round(&self) -> bool {
        matches!(self, Self::Hire | Self::WeakHire)
    }

    /// Parses a loosely formatted token such as `" weak hire "`.
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized = token.trim().to_uppercase().replace(' ', "_");
        normalized.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRating {
    pub skill: String,
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub result: FeedbackResult,
    pub feedback: String,
    pub pointers_for_next_interviewer: Option<String>,
    pub skill_ratings: Json<Vec<SkillRating>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(
        interview_id: Uuid,
        result: FeedbackResult,
        feedback: String,
        pointers_for_next_interviewer: Option<String>,
        skill_ratings: Vec<SkillRating>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            interview_id,
            result,
            feedback,
            pointers_for_next_interviewer,
            skill_ratings: Json(skill_ratings),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_tokens_are_normalized() {
        assert_eq!(FeedbackResult::from_token(" weak hire "), Some(FeedbackResult::WeakHire));
        assert_eq!(FeedbackResult::from_token("no_show"), Some(FeedbackResult::NoShow));
        assert_eq!(FeedbackResult::from_token("Hire"), Some(FeedbackResult::Hire));
        assert_eq!(FeedbackResult::from_token("strong hire"), None);
        assert_eq!(FeedbackResult::from_token(""), None);
    }

    #[test]
    fn only_positive_results_advance() {
        assert!(FeedbackResult::Hire.advances_round());
        assert!(FeedbackResult::WeakHire.advances_round());
        assert!(!FeedbackResult::NoHire.advances_round());
        assert!(!FeedbackResult::NoShow.advances_round());
    }
}
