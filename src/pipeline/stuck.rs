//! Detection of candidates stalled while waiting for their next round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::CandidateStatus;
use crate::pipeline::status::CandidateAggregate;

pub const STUCK_AFTER_MINUTES: i64 = 2 * 60;
pub const CRITICAL_AFTER_MINUTES: i64 = 3 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StuckCandidate {
    pub candidate_id: Uuid,
    pub campaign_id: Uuid,
    pub name: String,
    pub email: String,
    pub current_round: u32,
    pub waiting_since: DateTime<Utc>,
    pub waiting_minutes: i64,
    pub waiting_hours: f64,
    pub severity: StuckSeverity,
}

/// Moment the candidate started waiting for an assignment, or `None` if the
/// candidate is not waiting at all (left the pipeline, or has an active
/// interview).
pub fn waiting_since(aggregate: &CandidateAggregate) -> Option<DateTime<Utc>> {
    if aggregate.candidate.status != CandidateStatus::InPipeline || aggregate.has_active_interview() {
        return None;
    }
    if aggregate.interviews.is_empty() {
        return Some(aggregate.candidate.created_at);
    }
    aggregate.latest_completion()
}

/// Candidates waiting at least two hours, longest wait first.
pub fn detect_stuck(aggregates: &[CandidateAggregate], now: DateTime<Utc>) -> Vec<StuckCandidate> {
    let mut stuck: Vec<StuckCandidate> = aggregates
        .iter()
        .filter_map(|aggregate| {
            let since = waiting_since(aggregate)?;
            let waiting_minutes = (now - since).num_minutes();
            if waiting_minutes < STUCK_AFTER_MINUTES {
                return None;
            }
            let severity = if waiting_minutes >= CRITICAL_AFTER_MINUTES {
                StuckSeverity::Critical
            } else {
                StuckSeverity::Warning
            };
            Some(StuckCandidate {
                candidate_id: aggregate.candidate.id,
                campaign_id: aggregate.candidate.campaign_id,
                name: aggregate.candidate.name.clone(),
                email: aggregate.candidate.email.clone(),
                current_round: aggregate.current_round(),
                waiting_since: since,
                waiting_minutes,
                waiting_hours: waiting_minutes as f64 / 60.0,
                severity,
            })
        })
        .collect();

    stuck.sort_by(|a, b| b.waiting_minutes.cmp(&a.waiting_minutes));
    stuck
}
