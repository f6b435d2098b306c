//! User directory repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Role, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>>;
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>>;
    async fn insert_user(&self, user: &User) -> Result<()>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ANY($1)")
            .bind(emails)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY name ASC",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, role, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::conflict("email", "A user with this email already exists")
            }
            _ => Error::from(err),
        })?;
        Ok(())
    }
}
