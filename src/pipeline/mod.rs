//! Candidate pipeline state machine.
//!
//! Everything in here is pure: derived statuses and rounds are recomputed from
//! the persisted candidate, interview and feedback facts on every read, and
//! the transition tables decide which lifecycle events are legal before any
//! service touches storage.

pub mod status;
pub mod stuck;
pub mod transitions;

pub use status::{current_round, display_status, rejection_round, CandidateAggregate, DisplayStatus};
pub use stuck::{detect_stuck, StuckCandidate, StuckSeverity};
pub use transitions::{
    campaign_transition, candidate_transition, interview_transition, CampaignEvent, CandidateEvent,
    InterviewEvent, InterviewOutcome, TransitionError,
};
