pub mod audit_service;
pub mod campaign_service;
pub mod candidate_service;
pub mod export_service;
pub mod import_service;
pub mod interview_service;
pub mod slot_service;
pub mod stuck_service;
pub mod user_service;
