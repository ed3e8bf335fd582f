//! User model for storage and webhook sync.

use serde::{Deserialize, Serialize};

/// Projection of a Clerk user sent to the store on `user.created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSync {
    /// Clerk user ID (also used as document ID)
    pub clerk_id: String,
    /// Primary email address
    pub email: String,
    /// "first last", untrimmed
    pub name: String,
    /// Profile picture URL
    pub image: Option<String>,
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub clerk_id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    /// When the user was first synced
    pub created_at: String,
    /// Last sync
    pub updated_at: String,
}

impl UserRecord {
    /// Build the stored record, keeping `created_at` from an earlier sync.
    pub fn from_sync(user: &UserSync, existing: Option<&UserRecord>, now: &str) -> Self {
        Self {
            clerk_id: user.clerk_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
            created_at: existing
                .map(|e| e.created_at.clone())
                .unwrap_or_else(|| now.to_string()),
            updated_at: now.to_string(),
        }
    }
}
