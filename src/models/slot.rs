use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Advisory availability published by an interviewer for an experienced
/// campaign. Slots never constrain interview scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InterviewerSlot {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub interviewer_id: Uuid,
    pub start_time: DateTime<Utc>,
}

impl InterviewerSlot {
    pub fn new(campaign_id: Uuid, interviewer_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id,
            interviewer_id,
            start_time: truncate_to_hour(start_time),
        }
    }
}

pub fn truncate_to_hour(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(Duration::hours(1)).unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn slots_are_hour_granular() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 10, 47, 12).unwrap();
        let slot = InterviewerSlot::new(Uuid::new_v4(), Uuid::new_v4(), at);
        assert_eq!(slot.start_time, Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap());
    }
}
