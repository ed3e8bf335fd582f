//! Database layer (Firestore).
//!
//! Handlers see storage only through [`PlanStore`]; [`FirestoreDb`] is the
//! production implementation.

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{NewPlan, UserSync};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PLANS: &str = "plans";
    pub const ACTIVE_PLANS: &str = "active_plans";
}

/// Persistence operations the handlers need.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Create or update the user keyed by `clerk_id`.
    async fn sync_user(&self, user: &UserSync) -> Result<(), AppError>;

    /// Store a new plan and return its generated ID.
    async fn create_plan(&self, plan: &NewPlan) -> Result<String, AppError>;
}
