pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::database::Repositories;
use crate::services::{
    audit_service::AuditService, campaign_service::CampaignService,
    candidate_service::CandidateService, export_service::ExportService,
    import_service::ImportService, interview_service::InterviewService,
    slot_service::SlotService, stuck_service::StuckService, user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub audit_service: AuditService,
    pub campaign_service: CampaignService,
    pub candidate_service: CandidateService,
    pub interview_service: InterviewService,
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub stuck_service: StuckService,
    pub slot_service: SlotService,
    pub user_service: UserService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self::from_repositories(Repositories::postgres(pool), config.jwt_secret.as_str())
    }

    pub fn from_repositories(repos: Repositories, jwt_secret: &str) -> Self {
        let audit_service = AuditService::new(repos.audit.clone());

        Self {
            jwt_secret: Arc::from(jwt_secret),
            campaign_service: CampaignService::new(repos.clone(), audit_service.clone()),
            candidate_service: CandidateService::new(repos.clone(), audit_service.clone()),
            interview_service: InterviewService::new(repos.clone(), audit_service.clone()),
            import_service: ImportService::new(repos.clone(), audit_service.clone()),
            export_service: ExportService::new(repos.clone()),
            stuck_service: StuckService::new(repos.clone()),
            slot_service: SlotService::new(repos.clone()),
            user_service: UserService::new(repos, audit_service.clone()),
            audit_service,
        }
    }
}
