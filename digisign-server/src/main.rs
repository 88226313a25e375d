//! DigiSign Server - REST API for signature and OTP authentication
//!
//! Exposes digisign-core flows via HTTP endpoints:
//! - POST /enroll-signature - Store a reference signature
//! - POST /verify-signature - Score a signature against the stored profile
//! - POST /generate-otp     - Issue a one-time passcode
//! - POST /verify-otp       - Consume a one-time passcode

use std::time::Duration;

use digisign_core::Authenticator;
use digisign_server::{create_router_with_state, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("digisign_server=info,digisign_core=info,tower_http=info")
            }),
        )
        .with_target(true)
        .init();

    let config = Config::from_env();
    let auth = Authenticator::in_memory();
    let state = AppState::new(auth.clone(), &config);

    if config.otp_sweep_interval_secs > 0 {
        spawn_otp_sweeper(auth, Duration::from_secs(config.otp_sweep_interval_secs));
    }

    let app = create_router_with_state(&config, state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        version = env!("CARGO_PKG_VERSION"),
        "DigiSign Backend API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Periodically drop OTP records that expired without being checked.
fn spawn_otp_sweeper(auth: Authenticator, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = auth.purge_expired_otps();
            if removed > 0 {
                tracing::info!(removed, "Swept expired OTP records");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
