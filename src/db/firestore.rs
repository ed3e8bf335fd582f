// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (synced from Clerk webhooks)
//! - Plans (generated workout + diet plans) and the per-user active-plan
//!   pointer that serializes plan writes

use crate::db::{collections, PlanStore};
use crate::error::AppError;
use crate::models::{ActivePlan, NewPlan, PlanRecord, UserRecord, UserSync};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use firestore::{FirestoreResult, FirestoreTransaction};
use futures_util::FutureExt;
use ring::rand::{SecureRandom, SystemRandom};

const PLAN_ID_BYTES: usize = 16;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator needs no credentials.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by Clerk ID.
    pub async fn get_user(&self, clerk_id: &str) -> Result<Option<UserRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(clerk_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a user record (create or replace).
    pub async fn set_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.clerk_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Plan Operations ─────────────────────────────────────────

    /// Get a plan by ID.
    pub async fn get_plan(&self, plan_id: &str) -> Result<Option<PlanRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PLANS)
            .obj()
            .one(plan_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the user's plans that are currently marked active.
    pub async fn get_active_plans(&self, user_id: &str) -> Result<Vec<PlanRecord>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLANS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("isActive").eq(true),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a plan record (create or replace).
    pub async fn set_plan(&self, plan: &PlanRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PLANS)
            .document_id(&plan.id)
            .object(plan)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get the user's active-plan pointer.
    pub async fn get_active_plan(&self, user_id: &str) -> Result<Option<ActivePlan>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVE_PLANS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl PlanStore for FirestoreDb {
    async fn sync_user(&self, user: &UserSync) -> Result<(), AppError> {
        let existing = self.get_user(&user.clerk_id).await?;
        let now = format_utc_rfc3339(chrono::Utc::now());
        let record = UserRecord::from_sync(user, existing.as_ref(), &now);

        self.set_user(&record).await?;

        tracing::info!(
            clerk_id = %user.clerk_id,
            created = existing.is_none(),
            "User synced"
        );
        Ok(())
    }

    /// Store the plan in one transaction together with the deactivation of
    /// the user's previous plans.
    ///
    /// The transaction reads the user's `active_plans` pointer, so two
    /// concurrent generations for the same user conflict and Firestore
    /// retries the loser with fresh data. Either every write lands or none.
    async fn create_plan(&self, plan: &NewPlan) -> Result<String, AppError> {
        let client = self.get_client()?;

        let plan_id = generate_plan_id()?;
        let now = format_utc_rfc3339(chrono::Utc::now());
        let record = PlanRecord::from_new(plan, plan_id.clone(), now.clone());

        let deactivated = client
            .run_transaction(|db, transaction| {
                let record = record.clone();
                let now = now.clone();
                async move {
                    stage_plan_writes(&db, transaction, &record, &now)
                        .await
                        .map_err(into_backoff)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Plan transaction failed: {}", e)))?;

        if deactivated > 0 {
            tracing::info!(
                user_id = %plan.user_id,
                count = deactivated,
                "Deactivated previous plans"
            );
        }

        tracing::info!(plan_id = %plan_id, user_id = %plan.user_id, "Plan stored");
        Ok(plan_id)
    }
}

/// Add all writes for a new plan to `transaction`.
///
/// `db` must be the transaction-bound client handed out by
/// `run_transaction`, so the reads below take part in conflict detection.
/// Returns the number of plans deactivated.
async fn stage_plan_writes(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    record: &PlanRecord,
    now: &str,
) -> FirestoreResult<usize> {
    let mut deactivated = 0;

    if record.is_active {
        let _pointer: Option<ActivePlan> = db
            .fluent()
            .select()
            .by_id_in(collections::ACTIVE_PLANS)
            .obj()
            .one(&record.user_id)
            .await?;

        let user_id = record.user_id.clone();
        let active: Vec<PlanRecord> = db
            .fluent()
            .select()
            .from(collections::PLANS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("isActive").eq(true),
                ])
            })
            .obj()
            .query()
            .await?;

        for mut previous in active {
            previous.is_active = false;
            db.fluent()
                .update()
                .in_col(collections::PLANS)
                .document_id(&previous.id)
                .object(&previous)
                .add_to_transaction(transaction)?;
            deactivated += 1;
        }

        let pointer = ActivePlan {
            user_id: record.user_id.clone(),
            plan_id: record.id.clone(),
            updated_at: now.to_string(),
        };
        db.fluent()
            .update()
            .in_col(collections::ACTIVE_PLANS)
            .document_id(&record.user_id)
            .object(&pointer)
            .add_to_transaction(transaction)?;
    }

    db.fluent()
        .update()
        .in_col(collections::PLANS)
        .document_id(&record.id)
        .object(record)
        .add_to_transaction(transaction)?;

    Ok(deactivated)
}

/// Retry transient database errors (contention); give up on the rest.
fn into_backoff(err: FirestoreError) -> BackoffError<FirestoreError> {
    match err {
        FirestoreError::DatabaseError(ref db_err) if db_err.retry_possible => {
            BackoffError::transient(err)
        }
        other => BackoffError::permanent(other),
    }
}

/// Random 128-bit identifier, hex encoded.
fn generate_plan_id() -> Result<String, AppError> {
    let mut bytes = [0u8; PLAN_ID_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}
