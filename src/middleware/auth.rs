use std::str::FromStr;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{Actor, Role};
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
}

impl Claims {
    /// The caller the identity provider vouched for.
    pub fn actor(&self) -> Result<Actor> {
        let user_id = Uuid::parse_str(&self.sub)
            .map_err(|_| Error::Unauthorized("token subject is not a user id".to_string()))?;
        let role = self
            .role
            .as_deref()
            .and_then(|r| Role::from_str(r).ok())
            .ok_or_else(|| Error::Unauthorized("token carries no known role".to_string()))?;
        Ok(Actor::new(user_id, role))
    }
}

/// Signs a token for `actor`, valid for `ttl`.
pub fn issue_token(secret: &str, actor: &Actor, ttl: Duration) -> Result<String> {
    let claims = Claims {
        sub: actor.user_id.to_string(),
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        role: Some(actor.role.to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": reason }))).into_response()
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return unauthorized("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return unauthorized("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return unauthorized("unsupported_scheme");
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(_) => return unauthorized("invalid_token"),
    };
    let actor = match claims.actor() {
        Ok(actor) => actor,
        Err(_) => return unauthorized("invalid_claims"),
    };

    tracing::debug!(user_id = %actor.user_id, role = %actor.role, "Authenticated request");
    req.extensions_mut().insert(actor);
    next.run(req).await
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .ok_or_else(|| Error::Unauthorized("request is not authenticated".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_map_to_actor() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            exp: 0,
            role: Some("Interviewer".into()),
        };
        assert_eq!(claims.actor().unwrap(), Actor::interviewer(id));

        let bad = Claims {
            sub: "nope".into(),
            exp: 0,
            role: Some("admin".into()),
        };
        assert!(bad.actor().is_err());
    }

    #[test]
    fn issued_tokens_round_trip() {
        let actor = Actor::admin(Uuid::new_v4());
        let token = issue_token("secret", &actor, Duration::hours(1)).unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(data.claims.actor().unwrap(), actor);
    }
}
