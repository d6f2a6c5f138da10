use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use carehub::api;
use carehub::config;
use carehub::db::repository::auth as tokens;
use carehub::models::enums::UserRole;
use carehub::payments::PaymentClient;
use carehub::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CAREHUB_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let payments = PaymentClient::new(config::payment_gateway_url(), config::payment_secret());
    if config::payment_gateway_url().is_none() {
        tracing::warn!("no payment gateway configured; issuing offline checkout sessions");
    }

    let state = AppState::new(config::database_path(), payments)?;
    bootstrap_admin_token(&state)?;

    api::serve_forever(state, config::listen_addr()).await?;
    Ok(())
}

/// First-run bootstrap: with an empty token store the API would be
/// unreachable, so issue one admin token and log it. Token issuance is
/// otherwise an operational concern outside this service.
fn bootstrap_admin_token(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let conn = state.open_db()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM auth_tokens", [], |row| row.get(0))?;
    if count == 0 {
        let token = format!("chk_{}", Uuid::new_v4().simple());
        tokens::issue_token(&conn, &token, &Uuid::new_v4(), "admin@localhost", UserRole::Admin)?;
        tracing::warn!("bootstrap admin token created: {token}");
    }
    Ok(())
}
