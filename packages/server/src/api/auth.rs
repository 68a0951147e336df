//! Bearer-session extractors
//!
//! - [`UserSession`]: any authenticated caller, with tool grants resolved
//! - [`AdminSession`]: an authenticated caller holding the admin role
//!
//! Missing or unknown tokens are 401; a valid non-admin session on an admin
//! route is 403. Both checks run before the request body is read.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use navtree_core::access::{AccessContext, SessionRecord};

use crate::api::{ApiError, AppState};

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Authentication("Authentication required".to_string()))
}

async fn verify_session(parts: &Parts, state: &AppState) -> Result<SessionRecord, ApiError> {
    let token = bearer_token(parts)?;
    state
        .sessions
        .verify(token)
        .await
        .map_err(ApiError::persistence)?
        .ok_or_else(|| ApiError::Authentication("Session is invalid or expired".to_string()))
}

/// Authenticated end user
#[derive(Debug, Clone)]
pub struct UserSession {
    pub access: AccessContext,
}

#[async_trait]
impl FromRequestParts<AppState> for UserSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = verify_session(parts, state).await?;
        let grants = state
            .directory
            .tool_grants(&session.roles)
            .await
            .map_err(ApiError::persistence)?;

        Ok(Self {
            access: AccessContext {
                user_id: session.user_id,
                roles: session.roles,
                grants,
            },
        })
    }
}

/// Authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session: SessionRecord,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = verify_session(parts, state).await?;
        if !state.directory.is_admin(&session.roles) {
            return Err(ApiError::Authorization(format!(
                "User {} is not an administrator",
                session.user_id
            )));
        }
        Ok(Self { session })
    }
}
