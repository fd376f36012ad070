//! Session validation for authenticated routes
//!
//! `CurrentAccount` rejects with 401 unless the bearer token verifies,
//! names an existing account, and equals that account's stored session
//! token. The last check is what revokes old tokens on logout or
//! re-login, ahead of their signed expiry.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;

use super::token::{extract_bearer_token, validate_session_token};
use crate::error::ApiError;
use crate::models::Account;
use crate::state::AppState;
use crate::store;

pub struct CurrentAccount(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentAccount
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = extract_bearer_token(auth_header).ok_or(ApiError::Unauthenticated)?;

        let claims = validate_session_token(&token, &state.jwt_secret)
            .map_err(|_| ApiError::Unauthenticated)?;

        let account = store::find_by_id(&state.db, &claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        // Single active session: only the most recently stored token is live
        if account.session_token.as_deref() != Some(token.as_str()) {
            return Err(ApiError::Unauthenticated);
        }

        Ok(CurrentAccount(account))
    }
}
