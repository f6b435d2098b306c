//! Runs the Postgres repositories against a real database.
//!
//! Every test is skipped unless `DATABASE_URL` points at a scratch database;
//! migrations are applied on first use.

use std::env;

use chrono::Utc;
use recruitment_tracker::config::{Config, LogFormat};
use recruitment_tracker::database::pool::{create_pool, run_migrations};
use recruitment_tracker::database::repositories::CompletionWrite;
use recruitment_tracker::database::Repositories;
use recruitment_tracker::dto::campaign_dto::CreateCampaignPayload;
use recruitment_tracker::dto::candidate_dto::{CandidatePayload, StatusChange};
use recruitment_tracker::dto::import_dto::{ImportCandidateRow, ImportPayload, ImportRound};
use recruitment_tracker::dto::interview_dto::{AssignInterviewPayload, FeedbackPayload};
use recruitment_tracker::error::Error;
use recruitment_tracker::models::campaign::{Campaign, CampaignStatus, CampaignType};
use recruitment_tracker::models::candidate::{Candidate, CandidateProfile, CandidateStatus};
use recruitment_tracker::models::feedback::{Feedback, FeedbackResult};
use recruitment_tracker::models::interview::{Interview, InterviewStatus};
use recruitment_tracker::models::user::{Actor, Role, User};
use recruitment_tracker::AppState;
use uuid::Uuid;

struct PgHarness {
    repos: Repositories,
    state: AppState,
    admin: Actor,
    alice: User,
    bob: User,
}

impl PgHarness {
    async fn connect() -> Option<Self> {
        dotenvy::dotenv().ok();
        let Ok(database_url) = env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL is not set; skipping Postgres test");
            return None;
        };
        let config = Config {
            server_address: "127.0.0.1:0".to_string(),
            database_url,
            database_max_connections: 5,
            jwt_secret: "test_secret_key".to_string(),
            api_rps: 100,
            log_format: LogFormat::Pretty,
        };

        let pool = create_pool(&config).await.expect("pool");
        run_migrations(&pool).await.expect("migrations");

        let repos = Repositories::postgres(pool);
        let admin = seed_user(&repos, "Ada Admin", Role::Admin).await;
        let alice = seed_user(&repos, "Alice Interviewer", Role::Interviewer).await;
        let bob = seed_user(&repos, "Bob Interviewer", Role::Interviewer).await;
        let state = AppState::from_repositories(repos.clone(), &config.jwt_secret);

        Some(Self {
            repos,
            state,
            admin: Actor::admin(admin.id),
            alice,
            bob,
        })
    }

    async fn campaign(&self) -> Campaign {
        self.state
            .campaign_service
            .create(
                &self.admin,
                CreateCampaignPayload {
                    name: "Postgres drive".to_string(),
                    campaign_type: CampaignType::Fresher,
                },
            )
            .await
            .expect("create campaign")
    }

    async fn candidate(&self, campaign_id: Uuid, email: &str, phone: Option<&str>) -> Candidate {
        self.state
            .candidate_service
            .create(&self.admin, campaign_id, payload(email, phone))
            .await
            .expect("create candidate")
    }

    async fn assign(&self, candidate_id: Uuid, interviewer: &User) -> Interview {
        self.state
            .interview_service
            .assign(
                &self.admin,
                candidate_id,
                AssignInterviewPayload {
                    interviewer_id: interviewer.id,
                    scheduled_at: None,
                },
            )
            .await
            .expect("assign interview")
            .interview
    }
}

/// Users share one table across runs, so every seeded email is unique.
async fn seed_user(repos: &Repositories, name: &str, role: Role) -> User {
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", Uuid::new_v4().simple()),
        role,
        created_at: Utc::now(),
    };
    repos.users.insert_user(&user).await.expect("seed user");
    user
}

fn payload(email: &str, phone: Option<&str>) -> CandidatePayload {
    CandidatePayload {
        name: "Pooja Iyer".to_string(),
        email: email.to_string(),
        phone: phone.map(str::to_string),
        ..Default::default()
    }
}

fn verdict(result: FeedbackResult) -> FeedbackPayload {
    FeedbackPayload {
        result,
        feedback: "Solid fundamentals".to_string(),
        pointers_for_next_interviewer: None,
        skill_ratings: Vec::new(),
    }
}

#[tokio::test]
async fn duplicate_assignment_is_a_no_op() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    let candidate = h.candidate(campaign.id, "dup@example.com", None).await;
    let payload = AssignInterviewPayload {
        interviewer_id: h.alice.id,
        scheduled_at: None,
    };

    let first = h
        .state
        .interview_service
        .assign(&h.admin, candidate.id, payload.clone())
        .await
        .unwrap();
    let second = h
        .state
        .interview_service
        .assign(&h.admin, candidate.id, payload)
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.interview.id, second.interview.id);
    let history = h.repos.interviews.list_for_candidate(candidate.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn candidate_conflicts_name_the_field() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    h.candidate(campaign.id, "meera@example.com", Some("9876500001")).await;

    let err = h
        .state
        .candidate_service
        .create(&h.admin, campaign.id, payload("meera@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { ref field, .. } if field == "email"));

    let err = h
        .state
        .candidate_service
        .create(&h.admin, campaign.id, payload("other@example.com", Some("9876500001")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict { ref field, .. } if field == "phone"));

    let summary = h
        .state
        .import_service
        .import(
            &h.admin,
            campaign.id,
            ImportPayload {
                rows: vec![
                    ImportCandidateRow {
                        name: "Meera".to_string(),
                        email: "meera@example.com".to_string(),
                        ..Default::default()
                    },
                    ImportCandidateRow {
                        name: "Naveen".to_string(),
                        email: "naveen@example.com".to_string(),
                        ..Default::default()
                    },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.skipped_duplicates, 1);
    assert_eq!(h.repos.candidates.list_candidates(campaign.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn completion_rolls_back_when_a_later_statement_fails() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    let candidate = h.candidate(campaign.id, "rollback@example.com", None).await;
    let interview = h.assign(candidate.id, &h.alice).await;
    let alice = Actor::interviewer(h.alice.id);
    h.state.interview_service.start(&alice, interview.id).await.unwrap();

    // Selecting without a hired role trips the candidates check constraint
    // after the interview update and the feedback insert.
    let now = Utc::now();
    let write = CompletionWrite {
        interview_id: interview.id,
        candidate_id: candidate.id,
        feedback: Feedback::new(
            interview.id,
            FeedbackResult::Hire,
            "Strong".to_string(),
            None,
            Vec::new(),
            now,
        ),
        completed_at: now,
        candidate_status: Some(CandidateStatus::Selected),
    };
    let err = h.repos.interviews.record_completion(&write).await.unwrap_err();
    assert!(matches!(err, Error::Database(_)));

    assert!(h.repos.interviews.get_feedback(interview.id).await.unwrap().is_none());
    let stored = h.repos.interviews.get_interview(interview.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InterviewStatus::Ongoing);
    assert!(stored.completed_at.is_none());

    h.state
        .interview_service
        .complete(&alice, interview.id, verdict(FeedbackResult::Hire))
        .await
        .unwrap();

    // A second completion is refused without touching the stored feedback.
    let again = CompletionWrite {
        candidate_status: None,
        ..write
    };
    assert!(!h.repos.interviews.record_completion(&again).await.unwrap());
    let err = h
        .state
        .interview_service
        .complete(&alice, interview.id, verdict(FeedbackResult::NoHire))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
    let feedback = h.repos.interviews.get_feedback(interview.id).await.unwrap().unwrap();
    assert_eq!(feedback.result, FeedbackResult::Hire);
}

#[tokio::test]
async fn refused_completion_leaves_no_feedback() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    let candidate = h.candidate(campaign.id, "early@example.com", None).await;
    let interview = h.assign(candidate.id, &h.bob).await;

    let now = Utc::now();
    let write = CompletionWrite {
        interview_id: interview.id,
        candidate_id: candidate.id,
        feedback: Feedback::new(
            interview.id,
            FeedbackResult::NoHire,
            "Not started yet".to_string(),
            None,
            Vec::new(),
            now,
        ),
        completed_at: now,
        candidate_status: Some(CandidateStatus::Rejected),
    };
    assert!(!h.repos.interviews.record_completion(&write).await.unwrap());
    assert!(h.repos.interviews.get_feedback(interview.id).await.unwrap().is_none());
    let candidate = h.repos.candidates.get_candidate(candidate.id).await.unwrap().unwrap();
    assert_eq!(candidate.status, CandidateStatus::InPipeline);
}

#[tokio::test]
async fn completed_campaign_is_gated_and_frozen() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    let candidate = h.candidate(campaign.id, "gate@example.com", None).await;

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
        other => panic!("expected PipelineNotEmpty, got {other:?}"),
    }

    h.state
        .candidate_service
        .change_status(&h.admin, candidate.id, StatusChange::Reject)
        .await
        .unwrap();
    let done = h
        .state
        .campaign_service
        .complete(&h.admin, campaign.id)
        .await
        .unwrap();
    assert_eq!(done.status, CampaignStatus::Completed);

    // The repositories refuse on their own, even when a caller skipped the
    // service-level check.
    let late = Candidate::new(
        campaign.id,
        CandidateProfile {
            name: "Late Entry".to_string(),
            email: "late@example.com".to_string(),
            ..Default::default()
        },
        Utc::now(),
    );
    let err = h.repos.candidates.insert_candidate(&late).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));

    let now = Utc::now();
    let interview = Interview::scheduled(candidate.id, h.alice.id, now, now);
    let err = h.repos.interviews.insert_interview(&interview).await.unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
    assert_eq!(h.repos.candidates.list_candidates(campaign.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn imported_history_is_replayed_once() {
    let Some(h) = PgHarness::connect().await else {
        return;
    };
    let campaign = h.campaign().await;
    let rows = vec![ImportCandidateRow {
        name: "Ishaan".to_string(),
        email: "ishaan@example.com".to_string(),
        rounds: vec![
            ImportRound {
                interviewer_email: h.alice.email.clone(),
                result: "hire".to_string(),
                feedback: None,
            },
            ImportRound {
                interviewer_email: h.bob.email.clone(),
                result: "NO_HIRE".to_string(),
                feedback: None,
            },
        ],
        ..Default::default()
    }];

    let first = h
        .state
        .import_service
        .import(&h.admin, campaign.id, ImportPayload { rows: rows.clone() })
        .await
        .unwrap();
    assert_eq!(first.created, 1);
    assert_eq!(first.interviews_created, 2);

    let second = h
        .state
        .import_service
        .import(&h.admin, campaign.id, ImportPayload { rows })
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.interviews_created, 0);

    let ishaan = h
        .repos
        .candidates
        .find_by_emails(campaign.id, &["ishaan@example.com".to_string()])
        .await
        .unwrap()
        .remove(0);
    assert_eq!(ishaan.status, CandidateStatus::Rejected);
    let history = h.repos.interviews.list_for_candidate(ishaan.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r.status() == InterviewStatus::Completed));
}
