use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::Role;
use crate::utils::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
}
