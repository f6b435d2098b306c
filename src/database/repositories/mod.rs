//! Repository layer.
//!
//! Each aggregate gets a trait with a Postgres implementation; every trait is
//! also implemented by [`MemoryStore`](crate::database::MemoryStore). Writes
//! that touch more than one entity are exposed as single repository calls so
//! the implementation can commit them atomically.

pub mod audit;
pub mod campaign;
pub mod candidate;
pub mod interview;
pub mod slot;
pub mod user;

pub use audit::*;
pub use campaign::*;
pub use candidate::*;
pub use interview::*;
pub use slot::*;
pub use user::*;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;

#[derive(Clone)]
pub struct Repositories {
    pub campaigns: Arc<dyn CampaignRepository>,
    pub candidates: Arc<dyn CandidateRepository>,
    pub interviews: Arc<dyn InterviewRepository>,
    pub users: Arc<dyn UserRepository>,
    pub slots: Arc<dyn SlotRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            campaigns: Arc::new(PgCampaignRepository::new(pool.clone())),
            candidates: Arc::new(PgCandidateRepository::new(pool.clone())),
            interviews: Arc::new(PgInterviewRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            slots: Arc::new(PgSlotRepository::new(pool.clone())),
            audit: Arc::new(PgAuditRepository::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            campaigns: store.clone(),
            candidates: store.clone(),
            interviews: store.clone(),
            users: store.clone(),
            slots: store.clone(),
            audit: store,
        }
    }
}
