//! Process configuration, read once from the environment at startup

use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct Config {
    /// Port the HTTP server binds to
    pub port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Public base URL embedded in verification links
    pub base_url: String,
    /// Secret used to sign session tokens
    pub jwt_secret: String,
    /// Resend API key; emails are skipped with an error log when unset
    pub resend_api_key: Option<String>,
    /// From address for outbound mail
    pub email_from: String,
    /// Directory served statically; avatars live in `<public_dir>/avatars`
    pub public_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:accounts.db?mode=rwc".to_string());

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let resend_api_key = std::env::var("RESEND_API_KEY").ok();

        let email_from = std::env::var("EMAIL_FROM")
            .unwrap_or_else(|_| crate::email::DEFAULT_FROM_ADDRESS.to_string());

        let public_dir = std::env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        Ok(Self {
            port,
            database_url,
            base_url,
            jwt_secret,
            resend_api_key,
            email_from,
            public_dir,
        })
    }

    pub fn avatars_dir(&self) -> PathBuf {
        self.public_dir.join("avatars")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.public_dir.join("tmp")
    }
}
