mod common;

use common::Harness;
use recruitment_tracker::dto::candidate_dto::StatusChange;
use recruitment_tracker::error::Error;
use recruitment_tracker::models::campaign::{CampaignStatus, CampaignType};
use recruitment_tracker::models::feedback::FeedbackResult;
use recruitment_tracker::pipeline::DisplayStatus;

#[tokio::test]
async fn completion_waits_for_an_empty_pipeline() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Fresher).await;
    let candidate = h.candidate(campaign.id, "Indu Menon", "indu@example.com").await;

    let err = h
        .state
        .campaign_service
        .complete(&h.admin, campaign.id)
        .await
        .unwrap_err();
    match err {
        Error::PipelineNotEmpty(blocking) => {
            assert_eq!(blocking.len(), 1);
            assert_eq!(blocking[0].id, candidate.id);
        }
        other => panic!("expected blocked completion, got {other:?}"),
    }

    h.state
        .candidate_service
        .change_status(&h.admin, candidate.id, StatusChange::Reject)
        .await
        .unwrap();
    let completed = h
        .state
        .campaign_service
        .complete(&h.admin, campaign.id)
        .await
        .unwrap();
    assert_eq!(completed.status, CampaignStatus::Completed);

    let err = h
        .state
        .campaign_service
        .complete(&h.admin, campaign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
}

#[tokio::test]
async fn completed_campaigns_reject_pipeline_changes() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Experienced).await;
    let candidate = h.candidate(campaign.id, "Jaya Pillai", "jaya@example.com").await;
    h.state
        .candidate_service
        .change_status(
            &h.admin,
            candidate.id,
            StatusChange::Hire {
                hired_role: "SRE".into(),
            },
        )
        .await
        .unwrap();
    h.state
        .campaign_service
        .complete(&h.admin, campaign.id)
        .await
        .unwrap();

    let err = h
        .state
        .candidate_service
        .create(
            &h.admin,
            campaign.id,
            common::candidate_payload("Late Comer", "late@example.com"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));

    let err = h
        .state
        .candidate_service
        .change_status(&h.admin, candidate.id, StatusChange::Reinclude)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
}

#[tokio::test]
async fn stats_count_display_statuses_and_rejection_rounds() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Fresher).await;

    let first = h.candidate(campaign.id, "Kavya", "kavya@example.com").await;
    h.run_round(first.id, &h.alice, FeedbackResult::NoHire).await;

    let second = h.candidate(campaign.id, "Lokesh", "lokesh@example.com").await;
    h.run_round(second.id, &h.alice, FeedbackResult::Hire).await;
    h.run_round(second.id, &h.bob, FeedbackResult::NoHire).await;

    let third = h.candidate(campaign.id, "Madhu", "madhu@example.com").await;
    h.assign(third.id, &h.bob).await;

    let stats = h.state.campaign_service.stats(campaign.id).await.unwrap();
    assert_eq!(stats.total_candidates, 3);
    assert_eq!(stats.candidates_by_status[&DisplayStatus::Rejected], 2);
    assert_eq!(stats.candidates_by_status[&DisplayStatus::InterviewScheduled], 1);
    assert_eq!(stats.candidates_by_status[&DisplayStatus::Selected], 0);
    assert_eq!(stats.rejections_per_round.get(&1), Some(&1));
    assert_eq!(stats.rejections_per_round.get(&2), Some(&1));
    assert_eq!(stats.interviews_by_status.get("completed"), Some(&3));
    assert_eq!(stats.interviews_by_status.get("scheduled"), Some(&1));
}

#[tokio::test]
async fn only_admins_manage_campaigns() {
    let h = Harness::new().await;
    let campaign = h.campaign(CampaignType::Fresher).await;

    let err = h
        .state
        .campaign_service
        .complete(&h.alice, campaign.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));

    let active = h
        .state
        .campaign_service
        .list(Some(CampaignStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    let completed = h
        .state
        .campaign_service
        .list(Some(CampaignStatus::Completed))
        .await
        .unwrap();
    assert!(completed.is_empty());
}
