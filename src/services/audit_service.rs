use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::database::repositories::AuditRepository;
use crate::error::Result;
use crate::models::audit_log::{AuditAction, AuditLog, EntityType};
use crate::models::user::Actor;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

/// Emits one audit event per committed mutation. The sink is best effort: a
/// failed write is logged and never fails the operation that produced it.
#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditRepository>) -> Self {
        Self { repo }
    }

    pub async fn log(
        &self,
        actor: &Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Uuid,
        metadata: Option<JsonValue>,
    ) {
        let entry = AuditLog {
            id: Uuid::new_v4(),
            actor_id: actor.user_id,
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            metadata,
            created_at: Utc::now(),
        };
        if let Err(e) = self.repo.record(&entry).await {
            tracing::error!(
                error = %e,
                action = %action,
                entity_id = %entity_id,
                "Failed to write audit log entry"
            );
        }
    }

    pub async fn recent(&self, actor: &Actor, limit: Option<i64>) -> Result<Vec<AuditLog>> {
        actor.require_admin("read the audit log")?;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        self.repo.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::MockAuditRepository;
    use crate::error::Error;

    #[tokio::test]
    async fn sink_failures_are_swallowed() {
        let mut repo = MockAuditRepository::new();
        repo.expect_record()
            .times(1)
            .returning(|_| Err(Error::Internal("sink down".into())));
        let service = AuditService::new(Arc::new(repo));

        let actor = Actor::admin(Uuid::new_v4());
        service
            .log(&actor, AuditAction::CampaignCreate, EntityType::Campaign, Uuid::new_v4(), None)
            .await;
    }

    #[tokio::test]
    async fn entries_carry_dotted_action_names() {
        let mut repo = MockAuditRepository::new();
        repo.expect_record()
            .withf(|entry| entry.action == "feedback.edit" && entry.entity_type == "feedback")
            .times(1)
            .returning(|_| Ok(()));
        let service = AuditService::new(Arc::new(repo));

        let actor = Actor::interviewer(Uuid::new_v4());
        service
            .log(&actor, AuditAction::FeedbackEdit, EntityType::Feedback, Uuid::new_v4(), None)
            .await;
    }

    #[tokio::test]
    async fn only_admins_read_the_log_and_limit_is_clamped() {
        let mut repo = MockAuditRepository::new();
        repo.expect_recent()
            .withf(|limit| *limit == MAX_LIMIT)
            .times(1)
            .returning(|_| Ok(vec![]));
        let service = AuditService::new(Arc::new(repo));

        let err = service
            .recent(&Actor::interviewer(Uuid::new_v4()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let entries = service
            .recent(&Actor::admin(Uuid::new_v4()), Some(10_000))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }
}
