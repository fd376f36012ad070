//! HTTP handlers for the accounts API

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::token::generate_session_token;
use crate::auth::{hash_password, validate_email, verify_password, CurrentAccount};
use crate::avatar;
use crate::email::verification_email;
use crate::error::ApiError;
use crate::models::{
    Account, AccountPublic, AvatarResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, ResendVerificationRequest, SubscriptionTier,
    SubscriptionUpdateRequest,
};
use crate::state::AppState;
use crate::store;

const TIER_HINT: &str = "subscription must be one of: starter, pro, business";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// POST /users/register
///
/// Creates an unverified account and sends the verification email.
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let email = req.email.trim().to_lowercase();
    validate_email(&email).map_err(ApiError::Validation)?;

    if req.password.is_empty() {
        return Err(ApiError::Validation(
            "missing required password field".to_string(),
        ));
    }

    let subscription = match req.subscription.as_deref() {
        Some(s) => s
            .parse::<SubscriptionTier>()
            .map_err(|_| ApiError::Validation(TIER_HINT.to_string()))?,
        None => SubscriptionTier::default(),
    };

    if store::find_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::EmailInUse);
    }

    let password_hash =
        hash_password(&req.password).map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    let now = Utc::now();
    let verification_token = Uuid::new_v4().to_string();
    let account = Account {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        password_hash,
        session_token: None,
        verification_token: Some(verification_token.clone()),
        verified: false,
        subscription: subscription.to_string(),
        avatar_url: avatar::default_avatar_url(&email),
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = store::insert(&state.db, &account).await {
        // Two concurrent registrations can both pass the lookup; the
        // unique index decides the winner.
        if is_unique_violation(&e) {
            return Err(ApiError::EmailInUse);
        }
        return Err(e.into());
    }

    tracing::info!("Account created: {}", account.email);

    // Delivery is best-effort: the account stays unverified until the
    // token is confirmed, and the resend endpoint recovers from a lost
    // message.
    let message = verification_email(&state.base_url, &account.email, &verification_token);
    let result = state.mailer.send(message).await;
    if !result.success {
        tracing::error!(
            "Failed to send verification email to {}: {:?}",
            account.email,
            result.error
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: AccountPublic::from(&account),
        }),
    ))
}

/// POST /users/login
///
/// Issues a fresh session token, replacing any previous one.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let email = req.email.trim().to_lowercase();

    // Unknown email and wrong password collapse into one generic
    // failure; the unverified case is deliberately distinguished.
    let account = store::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::AuthFailed)?;

    if !account.verified {
        return Err(ApiError::NotVerified);
    }

    if !verify_password(&req.password, &account.password_hash) {
        return Err(ApiError::AuthFailed);
    }

    let token = generate_session_token(&account.id, &state.jwt_secret)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    if store::set_session_token(&state.db, &account.id, &token).await? == 0 {
        return Err(ApiError::NotFound);
    }

    tracing::info!("Account logged in: {}", account.email);

    Ok(Json(LoginResponse {
        token,
        user: AccountPublic::from(&account),
    }))
}

/// GET /users/current
pub async fn current(CurrentAccount(account): CurrentAccount) -> Json<AccountPublic> {
    Json(AccountPublic::from(&account))
}

/// POST /users/logout
pub async fn logout(
    CurrentAccount(account): CurrentAccount,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    if store::clear_session_token(&state.db, &account.id).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /users
///
/// Updates the subscription tier.
pub async fn update_subscription(
    CurrentAccount(account): CurrentAccount,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubscriptionUpdateRequest>, JsonRejection>,
) -> Result<Json<AccountPublic>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    // Validated before any store write
    let tier = req
        .subscription
        .parse::<SubscriptionTier>()
        .map_err(|_| ApiError::Validation(TIER_HINT.to_string()))?;

    if store::set_subscription(&state.db, &account.id, tier).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(AccountPublic {
        email: account.email,
        subscription: tier,
    }))
}

/// PATCH /users/avatars
///
/// Accepts a multipart upload in the `avatar` field, stores the asset
/// under a deterministic name, and updates the account's reference.
/// Image processing happens after the response; its failures are logged.
pub async fn update_avatar(
    CurrentAccount(account): CurrentAccount,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        if field.name() == Some("avatar") {
            let original = field.file_name().unwrap_or("avatar").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            upload = Some((original, data.to_vec()));
            break;
        }
    }

    let (original, data) =
        upload.ok_or_else(|| ApiError::Validation("missing required avatar field".to_string()))?;

    let filename = avatar::asset_name(&account.id, &original);
    let avatar_url = format!("avatars/{}", filename);

    // Spool, dispatch, discard: the processing task owns its own copy of
    // the bytes, so the transient upload is gone before the response no
    // matter what the resize does.
    let spooled = state.avatars.spool(&data).await?;
    state.avatars.process_in_background(data, &filename);
    state.avatars.discard(&spooled).await;

    if store::set_avatar_url(&state.db, &account.id, &avatar_url).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(AvatarResponse { avatar_url }))
}

/// GET /users/verify/:token
///
/// Consumes a verification token. Unknown and already-consumed tokens
/// are indistinguishable here: both report 404.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if store::consume_verification_token(&state.db, &token).await? == 0 {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse {
        message: "Verification successful".to_string(),
    }))
}

/// POST /users/verify
///
/// Re-sends the verification email with the existing stored token.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResendVerificationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let email = req.email.trim().to_lowercase();
    validate_email(&email).map_err(ApiError::Validation)?;

    let account = store::find_by_email(&state.db, &email)
        .await?
        .ok_or(ApiError::NotFound)?;

    if account.verified {
        return Err(ApiError::AlreadyVerified);
    }

    // The original token is re-sent, never regenerated
    let token = account.verification_token.as_deref().ok_or_else(|| {
        anyhow::anyhow!("unverified account {} has no verification token", account.id)
    })?;

    let message = verification_email(&state.base_url, &account.email, token);
    let result = state.mailer.send(message).await;
    if !result.success {
        return Err(ApiError::EmailDelivery(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Verification email sent".to_string(),
    }))
}
