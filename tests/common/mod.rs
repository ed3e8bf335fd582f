// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use fitplan_api::config::Config;
use fitplan_api::db::{FirestoreDb, PlanStore};
use fitplan_api::error::AppError;
use fitplan_api::models::{NewPlan, UserSync};
use fitplan_api::routes::create_router;
use fitplan_api::services::{PlanGenerator, WebhookVerifier};
use fitplan_api::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Workout JSON exactly as shown to the model in the prompt.
#[allow(dead_code)]
pub const WORKOUT_EXAMPLE: &str = r#"{
  "schedule": ["Monday", "Wednesday", "Friday"],
  "exercises": [
    { "day": "Monday", "routines": [{ "name": "Exercise Name", "sets": 3, "reps": 10 }] }
  ]
}"#;

/// Diet JSON exactly as shown to the model in the prompt.
#[allow(dead_code)]
pub const DIET_EXAMPLE: &str = r#"{
  "dailyCalories": 2000,
  "meals": [
    { "name": "Breakfast", "foods": ["Oatmeal with berries", "Greek yogurt", "Black coffee"] },
    { "name": "Lunch", "foods": ["Grilled chicken salad", "Whole grain bread", "Water"] }
  ]
}"#;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// In-memory store recording every call.
#[derive(Default)]
pub struct FakeStore {
    pub users: Mutex<Vec<UserSync>>,
    pub plans: Mutex<Vec<NewPlan>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl FakeStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn synced_users(&self) -> Vec<UserSync> {
        self.users.lock().unwrap().clone()
    }

    pub fn stored_plans(&self) -> Vec<NewPlan> {
        self.plans.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanStore for FakeStore {
    async fn sync_user(&self, user: &UserSync) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Database("store unavailable".to_string()));
        }
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn create_plan(&self, plan: &NewPlan) -> Result<String, AppError> {
        if self.fail {
            return Err(AppError::Database("store unavailable".to_string()));
        }
        let mut plans = self.plans.lock().unwrap();
        plans.push(plan.clone());
        Ok(format!("plan_{}", plans.len()))
    }
}

/// Generator that replays canned responses in order.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<&str, &str>>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Workout then diet, both the documented examples.
    pub fn with_examples() -> Self {
        Self::new(vec![Ok(WORKOUT_EXAMPLE), Ok(DIET_EXAMPLE)])
    }

    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlanGenerator for ScriptedGenerator {
    async fn generate_json(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response left".to_string()))
            .map_err(AppError::AiProvider)
    }
}

/// Create a test app around the given fakes.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    config: Config,
    store: Arc<FakeStore>,
    generator: Arc<ScriptedGenerator>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store, generator));
    (create_router(state.clone()), state)
}

/// Build a correctly signed webhook request for `body`.
#[allow(dead_code)]
pub fn signed_webhook_request(config: &Config, svix_id: &str, body: &str) -> Request<Body> {
    let secret = config
        .clerk_webhook_secret
        .as_deref()
        .expect("test config has a webhook secret");
    let verifier = WebhookVerifier::new(secret).unwrap();
    let timestamp = chrono::Utc::now().timestamp();
    let signature = verifier
        .signature_header(svix_id, timestamp, body.as_bytes())
        .unwrap();

    Request::builder()
        .method("POST")
        .uri("/clerk-webhook")
        .header("content-type", "application/json")
        .header("svix-id", svix_id)
        .header("svix-timestamp", timestamp.to_string())
        .header("svix-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Read a response body as a string.
#[allow(dead_code)]
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
