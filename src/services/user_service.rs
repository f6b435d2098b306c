use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::database::Repositories;
use crate::dto::user_dto::RegisterUserPayload;
use crate::error::Result;
use crate::models::audit_log::{AuditAction, EntityType};
use crate::models::user::{Actor, Role, User};
use crate::services::audit_service::AuditService;
use crate::utils::validation::normalize_email;

/// Directory of admins and interviewers.
#[derive(Clone)]
pub struct UserService {
    repos: Repositories,
    audit: AuditService,
}

impl UserService {
    pub fn new(repos: Repositories, audit: AuditService) -> Self {
        Self { repos, audit }
    }

    pub async fn register(&self, actor: &Actor, payload: RegisterUserPayload) -> Result<User> {
        actor.require_admin("register users")?;
        payload.validate()?;

        let user = User {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            email: normalize_email(&payload.email),
            role: payload.role,
            created_at: Utc::now(),
        };
        self.repos.users.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.audit
            .log(
                actor,
                AuditAction::UserCreate,
                EntityType::User,
                user.id,
                Some(json!({ "email": user.email, "role": user.role })),
            )
            .await;
        Ok(user)
    }

    pub async fn list(&self, role: Option<Role>) -> Result<Vec<User>> {
        self.repos.users.list_users(role).await
    }
}
