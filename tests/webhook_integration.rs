// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Integration tests for Clerk webhook handling.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fitplan_api::config::Config;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{body_string, create_test_app, signed_webhook_request, FakeStore, ScriptedGenerator};

fn user_created(first_name: Option<&str>, last_name: Option<&str>) -> String {
    json!({
        "type": "user.created",
        "object": "event",
        "data": {
            "id": "user_2abc",
            "first_name": first_name,
            "last_name": last_name,
            "image_url": "https://img.clerk.com/ana.png",
            "email_addresses": [{ "id": "idn_1", "email_address": "ana@example.com" }]
        }
    })
    .to_string()
}

fn app_with(store: Arc<FakeStore>) -> axum::Router {
    create_test_app(
        Config::test_default(),
        store,
        Arc::new(ScriptedGenerator::default()),
    )
    .0
}

#[tokio::test]
async fn test_missing_signature_header() {
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clerk-webhook")
                .header("content-type", "application/json")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", chrono::Utc::now().timestamp().to_string())
                .body(Body::from(user_created(Some("Ana"), None)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Missing svix headers");
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_missing_secret_is_server_error() {
    let mut config = Config::test_default();
    let request = signed_webhook_request(&config, "msg_1", &user_created(Some("Ana"), None));
    config.clerk_webhook_secret = None;

    let store = Arc::new(FakeStore::default());
    let (app, _) = create_test_app(config, store.clone(), Arc::new(ScriptedGenerator::default()));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("CLERK_WEBHOOK_SECRET"));
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_invalid_signature_rejected() {
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clerk-webhook")
                .header("content-type", "application/json")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", chrono::Utc::now().timestamp().to_string())
                .header("svix-signature", "v1,bm90IGEgcmVhbCBzaWduYXR1cmU=")
                .body(Body::from(user_created(Some("Ana"), None)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Error occurred");
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    // Sign one body, send another under the same headers.
    let signed = signed_webhook_request(&config, "msg_1", &user_created(Some("Ana"), None));
    let (parts, _) = signed.into_parts();
    let request = Request::from_parts(parts, Body::from(user_created(Some("Eve"), None)));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_user_created_syncs_user() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let response = app
        .oneshot(signed_webhook_request(
            &config,
            "msg_1",
            &user_created(Some("Ana"), Some("Silva")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Webhook processed successfully");

    let users = store.synced_users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].clerk_id, "user_2abc");
    assert_eq!(users[0].email, "ana@example.com");
    assert_eq!(users[0].name, "Ana Silva");
    assert_eq!(users[0].image.as_deref(), Some("https://img.clerk.com/ana.png"));
}

#[tokio::test]
async fn test_missing_last_name_keeps_trailing_space() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let response = app
        .oneshot(signed_webhook_request(
            &config,
            "msg_1",
            &user_created(Some("Ana"), None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.synced_users()[0].name, "Ana ");
}

#[tokio::test]
async fn test_other_event_types_ignored() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let body = json!({
        "type": "session.created",
        "data": { "id": "sess_1", "user_id": "user_2abc" }
    })
    .to_string();

    let response = app
        .oneshot(signed_webhook_request(&config, "msg_1", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_user_created_without_email() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());

    let body = json!({
        "type": "user.created",
        "data": { "id": "user_2abc", "first_name": "Ana", "email_addresses": [] }
    })
    .to_string();

    let response = app
        .oneshot(signed_webhook_request(&config, "msg_1", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Invalid webhook payload");
    assert!(store.synced_users().is_empty());
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let config = Config::test_default();
    let app = app_with(Arc::new(FakeStore::failing()));

    let response = app
        .oneshot(signed_webhook_request(
            &config,
            "msg_1",
            &user_created(Some("Ana"), None),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "Error creating the user");
}

#[tokio::test]
async fn test_redelivery_processed_once() {
    let config = Config::test_default();
    let store = Arc::new(FakeStore::default());
    let app = app_with(store.clone());
    let body = user_created(Some("Ana"), None);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(signed_webhook_request(&config, "msg_dup", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.synced_users().len(), 1);

    // A different delivery id is a different message.
    let response = app
        .oneshot(signed_webhook_request(&config, "msg_other", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.synced_users().len(), 2);
}

#[tokio::test]
async fn test_failed_delivery_not_marked_processed() {
    let config = Config::test_default();
    let body = user_created(Some("Ana"), None);

    let (app, state) = create_test_app(
        config.clone(),
        Arc::new(FakeStore::failing()),
        Arc::new(ScriptedGenerator::default()),
    );

    let response = app
        .oneshot(signed_webhook_request(&config, "msg_retry", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(state.webhook_dedup.is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_with(Arc::new(FakeStore::default()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
}
