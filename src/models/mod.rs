pub mod audit_log;
pub mod campaign;
pub mod candidate;
pub mod feedback;
pub mod interview;
pub mod slot;
pub mod user;
