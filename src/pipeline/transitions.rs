//! Transition tables for interviews, candidates and campaigns.
//!
//! Each table maps `(current state, event)` to the next state. Any pair that is
//! not listed is rejected with a reason, so services never hand-roll guards.

use crate::error::Error;
use crate::models::campaign::CampaignStatus;
use crate::models::candidate::CandidateStatus;
use crate::models::feedback::FeedbackResult;
use crate::models::interview::InterviewStatus;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} {entity} in state {from}: {reason}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub from: String,
    pub event: String,
    pub reason: &'static str,
}

impl From<TransitionError> for Error {
    fn from(err: TransitionError) -> Self {
        Error::InvalidTransition(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum InterviewEvent {
    Start,
    Complete,
    Reassign,
    Cancel,
    ReviseFeedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewOutcome {
    Becomes(InterviewStatus),
    /// The interview is removed; the candidate falls back to its resting state.
    Voided,
}

pub fn interview_transition(
    current: InterviewStatus,
    event: InterviewEvent,
) -> Result<InterviewOutcome, TransitionError> {
    use InterviewEvent::*;
    use InterviewOutcome::*;
    use InterviewStatus::*;

    let next = match (current, event) {
        (Scheduled, Start) => Becomes(Ongoing),
        (Ongoing, Complete) => Becomes(Completed),
        (Scheduled, Reassign) => Becomes(Scheduled),
        (Ongoing, Reassign) => Becomes(Ongoing),
        (Scheduled, Cancel) => Voided,
        (Completed, ReviseFeedback) => Becomes(Completed),
        (_, event) => {
            let reason = match event {
                Start => "interview is not in scheduled state",
                Complete => "interview is not in ongoing state",
                Reassign => "completed interviews cannot be reassigned",
                Cancel => "only scheduled interviews can be cancelled",
                ReviseFeedback => "feedback exists only on completed interviews",
            };
            return Err(TransitionError {
                entity: "interview",
                from: current.to_string(),
                event: event.to_string(),
                reason,
            });
        }
    };
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CandidateEvent {
    /// An interview was completed with the given verdict.
    InterviewConcluded(FeedbackResult),
    /// A WEAK_HIRE verdict was revised to the given result.
    FeedbackRevised(FeedbackResult),
    Hire,
    Reject,
    Reinclude,
    /// A new interview is being scheduled for the candidate.
    Schedule,
    NoShowRescheduled,
    NoShowRejected,
}

pub fn candidate_transition(
    current: CandidateStatus,
    event: CandidateEvent,
) -> Result<CandidateStatus, TransitionError> {
    use CandidateEvent::*;
    use CandidateStatus::*;

    let next = match (current, event) {
        (InPipeline, InterviewConcluded(FeedbackResult::NoHire)) => Rejected,
        (InPipeline, InterviewConcluded(FeedbackResult::NoShow)) => NoShow,
        // Positive verdicts keep the candidate in the pipeline; verdicts on a
        // candidate that already left it do not resurrect or move it.
        (status, InterviewConcluded(_)) => status,
        (_, FeedbackRevised(FeedbackResult::NoHire)) => Rejected,
        (status, FeedbackRevised(_)) => status,
        (InPipeline, Hire) => Selected,
        (InPipeline, Reject) => Rejected,
        (Rejected | Selected, Reinclude) => InPipeline,
        (InPipeline, Schedule) => InPipeline,
        (NoShow, NoShowRescheduled) => InPipeline,
        (NoShow, NoShowRejected) => Rejected,
        (_, event) => {
            let reason = match event {
                Hire | Reject => "only candidates in the pipeline can be hired or rejected",
                Reinclude => "only rejected or selected candidates can be re-included",
                Schedule => "candidate is not in the pipeline",
                _ => "candidate is not marked as a no-show",
            };
            return Err(TransitionError {
                entity: "candidate",
                from: current.to_string(),
                event: event.to_string(),
                reason,
            });
        }
    };
    Ok(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CampaignEvent {
    Complete,
    /// Any candidate or interview mutation scoped to the campaign.
    Mutate,
}

pub fn campaign_transition(
    current: CampaignStatus,
    event: CampaignEvent,
) -> Result<CampaignStatus, TransitionError> {
    match (current, event) {
        (CampaignStatus::Active, CampaignEvent::Complete) => Ok(CampaignStatus::Completed),
        (CampaignStatus::Active, CampaignEvent::Mutate) => Ok(CampaignStatus::Active),
        (CampaignStatus::Completed, event) => Err(TransitionError {
            entity: "campaign",
            from: current.to_string(),
            event: event.to_string(),
            reason: match event {
                CampaignEvent::Complete => "campaign is already completed",
                CampaignEvent::Mutate => "campaign is completed and no longer accepts changes",
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interview_lifecycle_is_linear() {
        use InterviewStatus::*;
        assert_eq!(
            interview_transition(Scheduled, InterviewEvent::Start),
            Ok(InterviewOutcome::Becomes(Ongoing))
        );
        assert_eq!(
            interview_transition(Ongoing, InterviewEvent::Complete),
            Ok(InterviewOutcome::Becomes(Completed))
        );
        assert!(interview_transition(Ongoing, InterviewEvent::Start).is_err());
        assert!(interview_transition(Completed, InterviewEvent::Start).is_err());
        assert!(interview_transition(Scheduled, InterviewEvent::Complete).is_err());
        assert!(interview_transition(Completed, InterviewEvent::Complete).is_err());
    }

    #[test]
    fn start_rejection_names_scheduled_state() {
        let err = interview_transition(InterviewStatus::Ongoing, InterviewEvent::Start).unwrap_err();
        assert!(err.to_string().contains("not in scheduled state"));
    }

    #[test]
    fn reassign_keeps_state_and_cancel_voids_only_scheduled() {
        use InterviewStatus::*;
        assert_eq!(
            interview_transition(Ongoing, InterviewEvent::Reassign),
            Ok(InterviewOutcome::Becomes(Ongoing))
        );
        assert!(interview_transition(Completed, InterviewEvent::Reassign).is_err());
        assert_eq!(
            interview_transition(Scheduled, InterviewEvent::Cancel),
            Ok(InterviewOutcome::Voided)
        );
        assert!(interview_transition(Ongoing, InterviewEvent::Cancel).is_err());
    }

    #[test]
    fn verdicts_cascade_only_from_the_pipeline() {
        use CandidateStatus::*;
        use FeedbackResult as R;
        let concluded = CandidateEvent::InterviewConcluded;
        assert_eq!(candidate_transition(InPipeline, concluded(R::NoHire)), Ok(Rejected));
        assert_eq!(candidate_transition(InPipeline, concluded(R::NoShow)), Ok(NoShow));
        assert_eq!(candidate_transition(InPipeline, concluded(R::Hire)), Ok(InPipeline));
        assert_eq!(candidate_transition(InPipeline, concluded(R::WeakHire)), Ok(InPipeline));
        assert_eq!(candidate_transition(Rejected, concluded(R::Hire)), Ok(Rejected));
        assert_eq!(candidate_transition(Selected, concluded(R::NoHire)), Ok(Selected));
    }

    #[test]
    fn revising_to_no_hire_always_rejects() {
        use CandidateStatus::*;
        let revised = CandidateEvent::FeedbackRevised;
        assert_eq!(candidate_transition(InPipeline, revised(FeedbackResult::NoHire)), Ok(Rejected));
        assert_eq!(candidate_transition(Selected, revised(FeedbackResult::NoHire)), Ok(Rejected));
        assert_eq!(candidate_transition(InPipeline, revised(FeedbackResult::Hire)), Ok(InPipeline));
    }

    #[test]
    fn no_show_resolution_requires_no_show() {
        use CandidateStatus::*;
        assert_eq!(candidate_transition(NoShow, CandidateEvent::NoShowRescheduled), Ok(InPipeline));
        assert_eq!(candidate_transition(NoShow, CandidateEvent::NoShowRejected), Ok(Rejected));
        assert!(candidate_transition(InPipeline, CandidateEvent::NoShowRescheduled).is_err());
        assert!(candidate_transition(NoShow, CandidateEvent::Hire).is_err());
    }

    #[test]
    fn admin_status_changes() {
        use CandidateStatus::*;
        assert_eq!(candidate_transition(InPipeline, CandidateEvent::Hire), Ok(Selected));
        assert_eq!(candidate_transition(InPipeline, CandidateEvent::Reject), Ok(Rejected));
        assert_eq!(candidate_transition(Rejected, CandidateEvent::Reinclude), Ok(InPipeline));
        assert!(candidate_transition(InPipeline, CandidateEvent::Reinclude).is_err());
        assert!(candidate_transition(Rejected, CandidateEvent::Hire).is_err());
    }

    #[test]
    fn only_pipeline_candidates_can_be_scheduled() {
        use CandidateStatus::*;
        assert_eq!(candidate_transition(InPipeline, CandidateEvent::Schedule), Ok(InPipeline));
        for status in [Selected, Rejected, NoShow] {
            let err = candidate_transition(status, CandidateEvent::Schedule).unwrap_err();
            assert!(err.to_string().contains("not in the pipeline"));
        }
    }

    #[test]
    fn completed_campaigns_never_reopen() {
        assert_eq!(
            campaign_transition(CampaignStatus::Active, CampaignEvent::Complete),
            Ok(CampaignStatus::Completed)
        );
        let err = campaign_transition(CampaignStatus::Completed, CampaignEvent::Complete).unwrap_err();
        assert!(err.to_string().contains("already completed"));
        assert!(campaign_transition(CampaignStatus::Completed, CampaignEvent::Mutate).is_err());
    }
}
