// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod plan;
pub mod user;

pub use plan::{
    ActivePlan, DietPlan, ExerciseDay, Meal, NewPlan, PlanRecord, Routine, WorkoutPlan,
};
pub use user::{UserRecord, UserSync};
