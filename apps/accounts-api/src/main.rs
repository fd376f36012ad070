//! Accounts API server — identity lifecycle for the Phonebook app

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use accounts_api::config::Config;
use accounts_api::email::resend::ResendMailer;
use accounts_api::email::Mailer;
use accounts_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("accounts_api=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing accounts API...");
    let config = Config::from_env()?;

    let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));

    let state = Arc::new(AppState::new(&config, mailer).await?);

    let app = accounts_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting accounts API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
