// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod event_dedup;
pub mod gemini;
pub mod plan_validation;
pub mod prompts;
pub mod webhook_verifier;

pub use event_dedup::EventDeduplicator;
pub use gemini::{GeminiClient, PlanGenerator};
pub use plan_validation::{validate_diet_plan, validate_workout_plan, PlanShapeError};
pub use webhook_verifier::{SvixHeaders, VerifyError, WebhookVerifier};
