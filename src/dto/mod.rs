pub mod campaign_dto;
pub mod candidate_dto;
pub mod import_dto;
pub mod interview_dto;
pub mod slot_dto;
pub mod user_dto;
