mod common;

use chrono::{Duration, Utc};
use common::Harness;
use recruitment_tracker::error::Error;
use recruitment_tracker::models::campaign::CampaignType;
use recruitment_tracker::models::feedback::FeedbackResult;
use recruitment_tracker::pipeline::StuckSeverity;

#[tokio::test]
async fn waiting_candidates_surface_after_two_hours() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Fresher).await;
    let waiting = h.candidate(campaign.id, "Nandini", "nandini@example.com").await;
    let busy = h.candidate(campaign.id, "Pranav", "pranav@example.com").await;
    h.assign(busy.id, &h.alice).await;

    let later = Utc::now() + Duration::hours(3);
    let stuck = h.state.stuck_service.stuck_candidates_at(later).await.unwrap();

    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0].candidate_id, waiting.id);
    assert_eq!(stuck[0].current_round, 1);
    assert_eq!(stuck[0].severity, StuckSeverity::Critical);
    assert!((stuck[0].waiting_hours - 3.0).abs() < 0.05);

    let soon = Utc::now() + Duration::minutes(30);
    assert!(h
        .state
        .stuck_service
        .stuck_candidates_at(soon)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn finished_rounds_restart_the_clock() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Fresher).await;
    let candidate = h.candidate(campaign.id, "Qadir", "qadir@example.com").await;
    h.run_round(candidate.id, &h.alice, FeedbackResult::Hire).await;

    let later = Utc::now() + Duration::minutes(150);
    let stuck = h.state.stuck_service.stuck_candidates_at(later).await.unwrap();
    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0].current_round, 2);
    assert_eq!(stuck[0].severity, StuckSeverity::Warning);
}

#[tokio::test]
async fn experienced_campaigns_and_rejected_candidates_are_ignored() {
    let h = Harness::new().await;
    let experienced = h.campaign(CampaignType::Experienced).await;
    h.candidate(experienced.id, "Rekha", "rekha@example.com").await;

    let fresher = h.campaign(CampaignType::Fresher).await;
    let rejected = h.candidate(fresher.id, "Sunil", "sunil@example.com").await;
    h.run_round(rejected.id, &h.bob, FeedbackResult::NoHire).await;

    let later = Utc::now() + Duration::hours(5);
    assert!(h
        .state
        .stuck_service
        .stuck_candidates_at(later)
        .await
        .unwrap()
        .is_empty());

    let err = h.state.stuck_service.stuck_candidates(&h.alice).await.unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}
