// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout and diet plan models.
//!
//! These are the strict shapes produced by
//! [`crate::services::plan_validation`]; anything the model adds beyond them
//! never makes it into these types.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Weekly workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutPlan {
    /// Training days, in the order the model listed them
    pub schedule: Vec<String>,
    pub exercises: Vec<ExerciseDay>,
}

/// Exercises for one day of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseDay {
    pub day: String,
    pub routines: Vec<Routine>,
}

/// A single exercise. `sets` and `reps` are always >= 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Routine {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
}

/// Daily diet plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DietPlan {
    /// Kept exactly as the model returned it (normally a number).
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub daily_calories: serde_json::Value,
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Meal {
    pub name: String,
    pub foods: Vec<String>,
}

/// Plan to be persisted after a successful generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    /// Clerk user ID of the owner
    pub user_id: String,
    /// Display name, e.g. "Lose weight Plan - 2026-10-17"
    pub name: String,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
    pub is_active: bool,
}

/// Plan document stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    /// Generated plan ID (also used as document ID)
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
    pub is_active: bool,
    /// When the plan was generated (RFC3339)
    pub created_at: String,
}

impl PlanRecord {
    /// Stamp a new plan with its ID and creation time.
    pub fn from_new(plan: &NewPlan, id: String, created_at: String) -> Self {
        Self {
            id,
            user_id: plan.user_id.clone(),
            name: plan.name.clone(),
            workout_plan: plan.workout_plan.clone(),
            diet_plan: plan.diet_plan.clone(),
            is_active: plan.is_active,
            created_at,
        }
    }
}

/// Per-user pointer to the plan that is currently active.
///
/// Every plan write for a user reads and rewrites this document inside the
/// same transaction, so concurrent writers conflict instead of both
/// activating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePlan {
    pub user_id: String,
    pub plan_id: String,
    pub updated_at: String,
}
