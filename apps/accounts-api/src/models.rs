//! Data models for the accounts API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Subscription tier of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Starter,
    Pro,
    Business,
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionTier::Starter => write!(f, "starter"),
            SubscriptionTier::Pro => write!(f, "pro"),
            SubscriptionTier::Business => write!(f, "business"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(SubscriptionTier::Starter),
            "pro" => Ok(SubscriptionTier::Pro),
            "business" => Ok(SubscriptionTier::Business),
            _ => Err(()),
        }
    }
}

/// Account row stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub session_token: Option<String>,
    pub verification_token: Option<String>,
    pub verified: bool,
    pub subscription: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Stored tier string parsed back to the enum. Unknown values fall
    /// back to the default tier.
    pub fn tier(&self) -> SubscriptionTier {
        SubscriptionTier::from_str(&self.subscription).unwrap_or_default()
    }
}

/// Public projection of an account (safe to send to the client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPublic {
    pub email: String,
    pub subscription: SubscriptionTier,
}

impl From<&Account> for AccountPublic {
    fn from(account: &Account) -> Self {
        Self {
            email: account.email.clone(),
            subscription: account.tier(),
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Subscription update request
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionUpdateRequest {
    pub subscription: String,
}

/// Request to resend the verification email
#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: AccountPublic,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountPublic,
}

/// Avatar update response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarResponse {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

/// Generic message response (verification endpoints)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
