// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Clerk user events.

use crate::error::{AppError, Result};
use crate::models::UserSync;
use crate::services::{SvixHeaders, WebhookVerifier};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub const PROCESSED: &str = "Webhook processed successfully";
pub const MISSING_HEADERS: &str = "Missing svix headers";
pub const VERIFICATION_FAILED: &str = "Error occurred";
pub const INVALID_PAYLOAD: &str = "Invalid webhook payload";
pub const SYNC_FAILED: &str = "Error creating the user";

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/clerk-webhook", post(handle_clerk_webhook))
}

/// Clerk webhook event, tagged by `type`.
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum WebhookEvent {
    #[serde(rename = "user.created")]
    UserCreated { data: ClerkUser },
    /// Every other event type is acknowledged and ignored.
    #[serde(other)]
    Other,
}

/// User fields of a Clerk `user.*` event.
#[derive(Deserialize, Debug)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
}

#[derive(Deserialize, Debug)]
pub struct ClerkEmailAddress {
    pub email_address: String,
}

/// Project a Clerk user onto the record we store.
///
/// The name is `"{first} {last}"` with missing parts empty, so it can carry
/// stray whitespace. Returns `None` without an email address.
pub fn user_sync_from(user: ClerkUser) -> Option<UserSync> {
    let email = user.email_addresses.into_iter().next()?.email_address;
    let name = format!(
        "{} {}",
        user.first_name.unwrap_or_default(),
        user.last_name.unwrap_or_default()
    );

    Some(UserSync {
        clerk_id: user.id,
        email,
        name,
        image: user.image_url,
    })
}

/// Non-empty header value as a string.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

/// Handle a Clerk webhook delivery (POST).
///
/// Only a missing secret escapes as an error; every request-level outcome
/// is a plain-text response.
async fn handle_clerk_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str)> {
    let secret = state.config.clerk_webhook_secret.as_deref().ok_or_else(|| {
        AppError::Config("Missing CLERK_WEBHOOK_SECRET environment variable".to_string())
    })?;
    let verifier =
        WebhookVerifier::new(secret).map_err(|e| AppError::Config(e.to_string()))?;

    let (Some(id), Some(signature), Some(timestamp)) = (
        header_str(&headers, "svix-id"),
        header_str(&headers, "svix-signature"),
        header_str(&headers, "svix-timestamp"),
    ) else {
        tracing::warn!("Webhook rejected: missing svix headers");
        return Ok((StatusCode::BAD_REQUEST, MISSING_HEADERS));
    };

    let now = chrono::Utc::now().timestamp();
    let svix = SvixHeaders {
        id,
        timestamp,
        signature,
    };

    if let Err(e) = verifier.verify_at(&body, &svix, now) {
        tracing::warn!(
            svix_id = %id,
            error = %e,
            "Security Alert: Webhook signature verification failed"
        );
        return Ok((StatusCode::BAD_REQUEST, VERIFICATION_FAILED));
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(svix_id = %id, error = %e, "Failed to parse webhook event");
            return Ok((StatusCode::BAD_REQUEST, INVALID_PAYLOAD));
        }
    };

    match event {
        WebhookEvent::UserCreated { data } => {
            if state.webhook_dedup.is_processed(id, now) {
                tracing::info!(svix_id = %id, "Duplicate webhook delivery ignored");
                return Ok((StatusCode::OK, PROCESSED));
            }

            let clerk_id = data.id.clone();
            let Some(user) = user_sync_from(data) else {
                tracing::warn!(clerk_id = %clerk_id, "user.created event without email address");
                return Ok((StatusCode::BAD_REQUEST, INVALID_PAYLOAD));
            };

            if let Err(e) = state.store.sync_user(&user).await {
                tracing::error!(clerk_id = %user.clerk_id, error = %e, "Error creating the user");
                return Ok((StatusCode::INTERNAL_SERVER_ERROR, SYNC_FAILED));
            }

            state.webhook_dedup.mark_processed(id, now);
            tracing::info!(svix_id = %id, clerk_id = %user.clerk_id, "User created from webhook");
        }
        WebhookEvent::Other => {
            tracing::debug!(svix_id = %id, "Ignoring unhandled event type");
        }
    }

    Ok((StatusCode::OK, PROCESSED))
}
