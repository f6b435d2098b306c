use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::interview::{InterviewRecord, InterviewStatus};

/// Presentation-facing status of a candidate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DisplayStatus {
    InPipeline,
    InterviewScheduled,
    InterviewOngoing,
    Selected,
    Rejected,
    NoShow,
}

/// Terminal candidate statuses win over interview activity; among resting
/// candidates an ongoing interview outranks a scheduled one.
pub fn display_status(status: CandidateStatus, interviews: &[InterviewRecord]) -> DisplayStatus {
    match status {
        CandidateStatus::Rejected => DisplayStatus::Rejected,
        CandidateStatus::Selected => DisplayStatus::Selected,
        CandidateStatus::NoShow => DisplayStatus::NoShow,
        CandidateStatus::InPipeline => {
            if interviews.iter().any(|i| i.status() == InterviewStatus::Ongoing) {
                DisplayStatus::InterviewOngoing
            } else if interviews.iter().any(|i| i.status() == InterviewStatus::Scheduled) {
                DisplayStatus::InterviewScheduled
            } else {
                DisplayStatus::InPipeline
            }
        }
    }
}

/// The next round to conduct: one more than the number of completed
/// interviews that ended in HIRE or WEAK_HIRE.
pub fn current_round(interviews: &[InterviewRecord]) -> u32 {
    let passed = interviews
        .iter()
        .filter(|i| i.status() == InterviewStatus::Completed)
        .filter(|i| i.result().is_some_and(|r| r.advances_round()))
        .count();
    passed as u32 + 1
}

/// Round in which the final verdict was delivered, counting every completed
/// interview regardless of its result. Used for per-round rejection reports.
pub fn rejection_round(interviews: &[InterviewRecord]) -> u32 {
    let completed = interviews
        .iter()
        .filter(|i| i.status() == InterviewStatus::Completed)
        .count() as u32;
    completed.max(1)
}

/// A candidate with its full interview history, fetched per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAggregate {
    pub candidate: Candidate,
    pub interviews: Vec<InterviewRecord>,
}

impl CandidateAggregate {
    pub fn new(candidate: Candidate, interviews: Vec<InterviewRecord>) -> Self {
        Self { candidate, interviews }
    }

    pub fn display_status(&self) -> DisplayStatus {
        display_status(self.candidate.status, &self.interviews)
    }

    pub fn current_round(&self) -> u32 {
        current_round(&self.interviews)
    }

    pub fn rejection_round(&self) -> u32 {
        rejection_round(&self.interviews)
    }

    pub fn active_interviews(&self) -> impl Iterator<Item = &InterviewRecord> {
        self.interviews.iter().filter(|i| i.status().is_active())
    }

    pub fn has_active_interview(&self) -> bool {
        self.active_interviews().next().is_some()
    }

    pub fn latest_completion(&self) -> Option<DateTime<Utc>> {
        self.interviews
            .iter()
            .filter(|i| i.status() == InterviewStatus::Completed)
            .filter_map(|i| i.interview.completed_at)
            .max()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::models::candidate::{Candidate, CandidateProfile, CandidateStatus};
    use crate::models::feedback::{Feedback, FeedbackResult};
    use crate::models::interview::{Interview, InterviewRecord, InterviewStatus};

    pub fn candidate(status: CandidateStatus, created_at: DateTime<Utc>) -> Candidate {
        let mut candidate = Candidate::new(
            Uuid::new_v4(),
            CandidateProfile {
                name: "Asha Rao".into(),
                email: "asha@example.com".into(),
                ..Default::default()
            },
            created_at,
        );
        candidate.status = status;
        candidate
    }

    pub fn scheduled(at: DateTime<Utc>) -> InterviewRecord {
        InterviewRecord {
            interview: Interview::scheduled(Uuid::new_v4(), Uuid::new_v4(), at, at),
            feedback: None,
        }
    }

    pub fn ongoing(at: DateTime<Utc>) -> InterviewRecord {
        let mut record = scheduled(at);
        record.interview.status = InterviewStatus::Ongoing;
        record.interview.started_at = Some(at);
        record
    }

    pub fn completed(result: FeedbackResult, at: DateTime<Utc>) -> InterviewRecord {
        let interview = Interview::replayed(Uuid::new_v4(), Uuid::new_v4(), at);
        let feedback = Feedback::new(interview.id, result, "notes".into(), None, vec![], at);
        InterviewRecord {
            interview,
            feedback: Some(feedback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::models::feedback::FeedbackResult;
    use chrono::Utc;

    #[test]
    fn terminal_status_wins_over_interview_activity() {
        let now = Utc::now();
        let busy = vec![ongoing(now), scheduled(now)];
        assert_eq!(display_status(CandidateStatus::Rejected, &busy), DisplayStatus::Rejected);
        assert_eq!(display_status(CandidateStatus::Selected, &busy), DisplayStatus::Selected);
        assert_eq!(display_status(CandidateStatus::NoShow, &busy), DisplayStatus::NoShow);
    }

    #[test]
    fn in_pipeline_reflects_most_specific_activity() {
        let now = Utc::now();
        assert_eq!(
            display_status(CandidateStatus::InPipeline, &[]),
            DisplayStatus::InPipeline
        );
        assert_eq!(
            display_status(CandidateStatus::InPipeline, &[completed(FeedbackResult::Hire, now)]),
            DisplayStatus::InPipeline
        );
        assert_eq!(
            display_status(CandidateStatus::InPipeline, &[scheduled(now)]),
            DisplayStatus::InterviewScheduled
        );
        assert_eq!(
            display_status(CandidateStatus::InPipeline, &[scheduled(now), ongoing(now)]),
            DisplayStatus::InterviewOngoing
        );
    }

    #[test]
    fn round_counts_only_positive_completed_interviews() {
        let now = Utc::now();
        assert_eq!(current_round(&[]), 1);
        let history = vec![
            completed(FeedbackResult::Hire, now),
            completed(FeedbackResult::NoShow, now),
            completed(FeedbackResult::WeakHire, now),
            scheduled(now),
        ];
        assert_eq!(current_round(&history), 3);
        assert_eq!(current_round(&[completed(FeedbackResult::NoHire, now)]), 1);
    }

    #[test]
    fn rejection_round_counts_every_completed_interview() {
        let now = Utc::now();
        assert_eq!(rejection_round(&[]), 1);
        let history = vec![
            completed(FeedbackResult::Hire, now),
            completed(FeedbackResult::NoShow, now),
            completed(FeedbackResult::NoHire, now),
        ];
        assert_eq!(rejection_round(&history), 3);
    }

    #[test]
    fn aggregate_tracks_latest_completion() {
        let earlier = Utc::now() - chrono::Duration::hours(5);
        let later = Utc::now() - chrono::Duration::hours(1);
        let aggregate = CandidateAggregate::new(
            candidate(CandidateStatus::InPipeline, earlier),
            vec![completed(FeedbackResult::Hire, earlier), completed(FeedbackResult::WeakHire, later)],
        );
        assert_eq!(aggregate.latest_completion(), Some(later));
        assert!(!aggregate.has_active_interview());
        assert_eq!(aggregate.current_round(), 3);
    }
}
