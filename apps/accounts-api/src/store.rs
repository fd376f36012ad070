//! Credential store: single-record operations over the accounts table
//!
//! Every mutation is one atomic SQL statement. Callers branch on the
//! returned row count where a missing record must map to NotFound.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Account, SubscriptionTier};

pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, email, password_hash, session_token, verification_token,
               verified, subscription, avatar_url, created_at, updated_at
        FROM accounts
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: &str) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, email, password_hash, session_token, verification_token,
               verified, subscription, avatar_url, created_at, updated_at
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert(db: &SqlitePool, account: &Account) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id, email, password_hash, session_token, verification_token,
                              verified, subscription, avatar_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.id)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&account.session_token)
    .bind(&account.verification_token)
    .bind(account.verified)
    .bind(&account.subscription)
    .bind(&account.avatar_url)
    .bind(account.created_at.to_rfc3339())
    .bind(account.updated_at.to_rfc3339())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn set_session_token(
    db: &SqlitePool,
    id: &str,
    token: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET session_token = ?, updated_at = ? WHERE id = ?")
        .bind(token)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn clear_session_token(db: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE accounts SET session_token = NULL, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(db)
            .await?;

    Ok(result.rows_affected())
}

/// Atomically consume a verification token: the matching account is
/// flagged verified and the token cleared in one statement, so a
/// replayed token matches nothing.
pub async fn consume_verification_token(
    db: &SqlitePool,
    token: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET verification_token = NULL, verified = 1, updated_at = ?
        WHERE verification_token = ?
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(token)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

pub async fn set_subscription(
    db: &SqlitePool,
    id: &str,
    tier: SubscriptionTier,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET subscription = ?, updated_at = ? WHERE id = ?")
        .bind(tier.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}

pub async fn set_avatar_url(db: &SqlitePool, id: &str, url: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET avatar_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected())
}
