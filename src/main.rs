// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitplan API Server
//!
//! Syncs Clerk users from webhooks and generates workout and diet plans
//! with Gemini.

use fitplan_api::{config::Config, db::FirestoreDb, services::GeminiClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Fitplan API");

    if config.clerk_webhook_secret.is_none() {
        tracing::warn!("CLERK_WEBHOOK_SECRET not set; /clerk-webhook will fail every request");
    }

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let mut gemini =
        GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    if let Some(base_url) = &config.gemini_base_url {
        gemini = gemini.with_base_url(base_url.as_str());
        tracing::info!(base_url = %base_url, "Using custom Gemini endpoint");
    }
    tracing::info!(model = %gemini.model(), "Gemini client initialized");

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(db),
        Arc::new(gemini),
    ));

    // Build router
    let app = fitplan_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fitplan_api=debug,info")),
        )
        .with(format)
        .init();
}
