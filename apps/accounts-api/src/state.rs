//! Application state for the accounts API

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;

use crate::avatar::AvatarStore;
use crate::config::Config;
use crate::email::Mailer;

pub struct AppState {
    pub db: SqlitePool,
    pub mailer: Arc<dyn Mailer>,
    pub avatars: AvatarStore,
    pub base_url: String,
    pub jwt_secret: String,
}

impl AppState {
    pub async fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;

        Self::run_migrations(&pool).await?;

        let avatars = AvatarStore::new(config.avatars_dir(), config.tmp_dir()).await?;

        Ok(Self {
            db: pool,
            mailer,
            avatars,
            base_url: config.base_url.clone(),
            jwt_secret: config.jwt_secret.clone(),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                session_token TEXT,
                verification_token TEXT,
                verified INTEGER NOT NULL DEFAULT 0,
                subscription TEXT NOT NULL DEFAULT 'starter',
                avatar_url TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Verification lookups go through the token, not the key
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_accounts_verification_token
                ON accounts(verification_token)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}
