#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use recruitment_tracker::database::repositories::UserRepository;
use recruitment_tracker::database::{MemoryStore, Repositories};
use recruitment_tracker::dto::campaign_dto::CreateCampaignPayload;
use recruitment_tracker::dto::candidate_dto::CandidatePayload;
use recruitment_tracker::dto::interview_dto::{AssignInterviewPayload, FeedbackPayload};
use recruitment_tracker::models::campaign::{Campaign, CampaignType};
use recruitment_tracker::models::candidate::Candidate;
use recruitment_tracker::models::feedback::FeedbackResult;
use recruitment_tracker::models::interview::{Interview, InterviewRecord};
use recruitment_tracker::models::user::{Actor, Role, User};
use recruitment_tracker::AppState;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";

/// Application state over an in-memory store, seeded with one admin and two
/// interviewers.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub admin: Actor,
    pub alice: Actor,
    pub bob: Actor,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "Ada Admin", "ada@example.com", Role::Admin).await;
        let alice = seed_user(&store, "Alice Interviewer", "alice@example.com", Role::Interviewer).await;
        let bob = seed_user(&store, "Bob Interviewer", "bob@example.com", Role::Interviewer).await;
        let state = AppState::from_repositories(Repositories::in_memory(store.clone()), JWT_SECRET);

        Self {
            store,
            state,
            admin: Actor::admin(admin.id),
            alice: Actor::interviewer(alice.id),
            bob: Actor::interviewer(bob.id),
        }
    }

    pub async fn campaign(&self, campaign_type: CampaignType) -> Campaign {
        self.state
            .campaign_service
            .create(
                &self.admin,
                CreateCampaignPayload {
                    name: format!("{} drive", campaign_type),
                    campaign_type,
                },
            )
            .await
            .expect("create campaign")
    }

    pub async fn candidate(&self, campaign_id: Uuid, name: &str, email: &str) -> Candidate {
        self.state
            .candidate_service
            .create(&self.admin, campaign_id, candidate_payload(name, email))
            .await
            .expect("create candidate")
    }

    pub async fn assign(&self, candidate_id: Uuid, interviewer: &Actor) -> Interview {
        self.state
            .interview_service
            .assign(
                &self.admin,
                candidate_id,
                AssignInterviewPayload {
                    interviewer_id: interviewer.user_id,
                    scheduled_at: None,
                },
            )
            .await
            .expect("assign interview")
            .interview
    }

    /// Assigns, starts and completes one round.
    pub async fn run_round(
        &self,
        candidate_id: Uuid,
        interviewer: &Actor,
        result: FeedbackResult,
    ) -> InterviewRecord {
        let interview = self.assign(candidate_id, interviewer).await;
        self.state
            .interview_service
            .start(interviewer, interview.id)
            .await
            .expect("start interview");
        self.state
            .interview_service
            .complete(interviewer, interview.id, feedback(result))
            .await
            .expect("complete interview")
    }
}

pub async fn seed_user(store: &MemoryStore, name: &str, email: &str, role: Role) -> User {
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        created_at: Utc::now(),
    };
    store.insert_user(&user).await.expect("seed user");
    user
}

pub fn candidate_payload(name: &str, email: &str) -> CandidatePayload {
    CandidatePayload {
        name: name.to_string(),
        email: email.to_string(),
        ..Default::default()
    }
}

pub fn feedback(result: FeedbackResult) -> FeedbackPayload {
    FeedbackPayload {
        result,
        feedback: format!("Candidate was assessed as {}", result),
        pointers_for_next_interviewer: None,
        skill_ratings: vec![],
    }
}
