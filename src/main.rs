// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay Service
//!
//! Accepts contact form submissions on `POST /api/contact`, throttles each
//! caller, validates and escapes the fields, and relays the message to the
//! operator mailbox over SMTP.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (and `.env`):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:3000)
//! - `RATE_LIMIT_WINDOW_MS`: Sliding window length (default: 900000)
//! - `RATE_LIMIT_MAX_REQUESTS`: Submissions per caller per window (default: 5)
//! - `SMTP_HOST`, `SMTP_USER`, `SMTP_PASS`: Relay credentials; if any is
//!   missing the service runs in test mode and only logs messages
//! - `SMTP_PORT`, `SMTP_SECURE`, `SMTP_FROM`, `CONTACT_EMAIL`: Relay details

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::{
    config::{Config, MailMode},
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer::MailDispatcher,
    metrics::Metrics,
    pipeline::ContactPipeline,
    validator::ContactValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        window_ms = config.rate_limit.window_ms,
        max_requests = config.rate_limit.max_requests,
        "Starting contact relay"
    );

    match config.mail.resolve() {
        MailMode::Relay(settings) => info!(
            host = %settings.host,
            port = settings.port,
            secure = settings.secure,
            "SMTP relay configured"
        ),
        MailMode::TestMode => warn!("SMTP relay not configured, running in test mode"),
    }

    // Create application state
    let pipeline = ContactPipeline::new(
        RateLimiter::new(config.rate_limit.clone()),
        ContactValidator::new(config.validation.clone()),
        MailDispatcher::from_config(&config.mail),
    );

    let state = Arc::new(AppState {
        pipeline,
        metrics: Metrics::new()?,
        config: config.clone(),
    });

    // Spawn cleanup task
    let cleanup_state = state.clone();
    let cleanup_every = config.rate_limit.cleanup_interval().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            cleanup_state.pipeline.limiter().cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
