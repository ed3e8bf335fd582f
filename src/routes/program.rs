// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation endpoint, called by the voice assistant.
//!
//! Flow: validated payload → workout prompt → model → coerce → diet prompt →
//! model → coerce → store. Storage is the last step, so a failure anywhere
//! before it leaves nothing behind.

use crate::db::PlanStore;
use crate::error::{AppError, Result};
use crate::models::{DietPlan, NewPlan, WorkoutPlan};
use crate::services::prompts::{diet_prompt, workout_prompt, DietProfile, WorkoutProfile};
use crate::services::{validate_diet_plan, validate_workout_plan, PlanGenerator};
use crate::time_utils::format_plan_date;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Plan generation routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/vapi/generate-program", post(generate_program))
}

/// Plan generation payload.
///
/// Numbers may arrive as JSON numbers or numeric strings, and free-text
/// answers as strings or numbers, depending on how the assistant filled
/// them in.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateProgramRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[serde(deserialize_with = "lenient::u32_from_scalar")]
    #[validate(range(min = 1, max = 120))]
    pub age: u32,
    #[serde(deserialize_with = "lenient::f64_from_scalar")]
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub height: f64,
    #[serde(deserialize_with = "lenient::f64_from_scalar")]
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub weight: f64,
    #[serde(default, deserialize_with = "lenient::string_from_scalar")]
    #[validate(length(max = 1000))]
    pub injuries: String,
    #[serde(deserialize_with = "lenient::string_from_scalar")]
    #[validate(length(min = 1, max = 200))]
    pub workout_days: String,
    #[serde(deserialize_with = "lenient::string_from_scalar")]
    #[validate(length(min = 1, max = 200))]
    pub fitness_goal: String,
    #[serde(deserialize_with = "lenient::string_from_scalar")]
    #[validate(length(min = 1, max = 200))]
    pub fitness_level: String,
    #[serde(default, deserialize_with = "lenient::string_from_scalar")]
    #[validate(length(max = 1000))]
    pub dietary_restrictions: String,
}

impl GenerateProgramRequest {
    pub fn workout_profile(&self) -> WorkoutProfile<'_> {
        WorkoutProfile {
            age: self.age,
            height: self.height,
            weight: self.weight,
            injuries: &self.injuries,
            workout_days: &self.workout_days,
            fitness_goal: &self.fitness_goal,
            fitness_level: &self.fitness_level,
        }
    }

    pub fn diet_profile(&self) -> DietProfile<'_> {
        DietProfile {
            age: self.age,
            height: self.height,
            weight: self.weight,
            dietary_restrictions: &self.dietary_restrictions,
            fitness_goal: &self.fitness_goal,
        }
    }
}

/// Generated program returned to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProgramData {
    pub plan_id: String,
    pub workout_plan: WorkoutPlan,
    pub diet_plan: DietPlan,
}

/// Success envelope.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GenerateProgramResponse {
    pub success: bool,
    pub data: ProgramData,
}

/// Generate and store a workout + diet program (POST).
async fn generate_program(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<GenerateProgramRequest>, JsonRejection>,
) -> Result<Json<GenerateProgramResponse>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(
        user_id = %request.user_id,
        fitness_goal = %request.fitness_goal,
        "Generating program"
    );

    let data = build_program(
        state.generator.as_ref(),
        state.store.as_ref(),
        &request,
        Utc::now(),
    )
    .await
    .inspect_err(|e| {
        if e.is_ai_rate_limit() {
            tracing::warn!(user_id = %request.user_id, "Program generation hit the AI quota");
        } else {
            tracing::error!(user_id = %request.user_id, error = %e, "Program generation failed");
        }
    })?;

    tracing::info!(
        user_id = %request.user_id,
        plan_id = %data.plan_id,
        "Program generated"
    );

    Ok(Json(GenerateProgramResponse {
        success: true,
        data,
    }))
}

/// Run both generations in order, then store the plan.
pub async fn build_program(
    generator: &dyn PlanGenerator,
    store: &dyn PlanStore,
    request: &GenerateProgramRequest,
    now: DateTime<Utc>,
) -> Result<ProgramData> {
    let workout_text = generator
        .generate_json(&workout_prompt(&request.workout_profile()))
        .await?;
    let workout_plan = validate_workout_plan(&parse_model_json(&workout_text)?)?;

    let diet_text = generator
        .generate_json(&diet_prompt(&request.diet_profile()))
        .await?;
    let diet_plan = validate_diet_plan(&parse_model_json(&diet_text)?)?;

    let plan = NewPlan {
        user_id: request.user_id.clone(),
        name: format!("{} Plan - {}", request.fitness_goal, format_plan_date(now)),
        workout_plan,
        diet_plan,
        is_active: true,
    };

    let plan_id = store.create_plan(&plan).await?;

    Ok(ProgramData {
        plan_id,
        workout_plan: plan.workout_plan,
        diet_plan: plan.diet_plan,
    })
}

/// Parse model output as JSON, tolerating a surrounding Markdown code fence.
fn parse_model_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(strip_code_fence(text.trim()))
        .map_err(|e| AppError::InvalidAiResponse(e.to_string()))
}

/// Remove a surrounding Markdown code fence and its optional `json` tag
/// (any case).
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };

    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    }
}

/// Deserializers that accept either JSON numbers or strings.
mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn f64_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = match Scalar::deserialize(deserializer)? {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok(),
        };

        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| D::Error::custom("expected a number"))
    }

    pub fn u32_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = match Scalar::deserialize(deserializer)? {
            Scalar::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Scalar::Text(s) => s.trim().parse::<u32>().ok(),
        };

        value.ok_or_else(|| D::Error::custom("expected a non-negative integer"))
    }

    /// `null` reads as an empty answer.
    pub fn string_from_scalar<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<String, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Number(n)) => n.to_string(),
            Some(Scalar::Text(s)) => s,
            None => String::new(),
        })
    }
}
