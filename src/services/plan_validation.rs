// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coercion of model-generated JSON into strict plan shapes.
//!
//! The model is asked for an exact schema but does not always comply. This
//! module:
//! - drops every field the target shape does not define
//! - turns `sets`/`reps` into positive integers, substituting defaults for
//!   text like `"to failure"` instead of rejecting the plan
//! - reports a [`PlanShapeError`] when a structural array is missing

use crate::models::{DietPlan, ExerciseDay, Meal, Routine, WorkoutPlan};
use serde_json::{Map, Number, Value};

/// Substituted when `sets` cannot be read as a positive integer.
pub const DEFAULT_SETS: u32 = 1;
/// Substituted when `reps` cannot be read as a positive integer.
pub const DEFAULT_REPS: u32 = 10;

/// Structural problem in a generated plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanShapeError {
    #[error("expected a JSON object at `{0}`")]
    NotAnObject(String),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{0}` must be an array")]
    NotAnArray(String),
}

/// Coerce an untrusted value into a [`WorkoutPlan`].
pub fn validate_workout_plan(plan: &Value) -> Result<WorkoutPlan, PlanShapeError> {
    let plan = as_object(plan, "$")?;

    let schedule = array_field(plan, "schedule", "schedule")?
        .iter()
        .map(|day| leaf_string(Some(day)))
        .collect();

    let exercises = array_field(plan, "exercises", "exercises")?
        .iter()
        .enumerate()
        .map(|(i, exercise)| validate_exercise_day(exercise, &format!("exercises[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WorkoutPlan {
        schedule,
        exercises,
    })
}

fn validate_exercise_day(exercise: &Value, path: &str) -> Result<ExerciseDay, PlanShapeError> {
    let exercise = as_object(exercise, path)?;

    let routines = array_field(exercise, "routines", &format!("{path}.routines"))?
        .iter()
        .enumerate()
        .map(|(j, routine)| {
            let routine = as_object(routine, &format!("{path}.routines[{j}]"))?;
            Ok(Routine {
                name: leaf_string(routine.get("name")),
                sets: coerce_count(routine.get("sets"), DEFAULT_SETS),
                reps: coerce_count(routine.get("reps"), DEFAULT_REPS),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExerciseDay {
        day: leaf_string(exercise.get("day")),
        routines,
    })
}

/// Coerce an untrusted value into a [`DietPlan`].
///
/// `dailyCalories` is passed through untouched; only unknown fields are
/// removed.
pub fn validate_diet_plan(plan: &Value) -> Result<DietPlan, PlanShapeError> {
    let plan = as_object(plan, "$")?;

    let meals = array_field(plan, "meals", "meals")?
        .iter()
        .enumerate()
        .map(|(i, meal)| {
            let path = format!("meals[{i}]");
            let meal = as_object(meal, &path)?;
            let foods = array_field(meal, "foods", &format!("{path}.foods"))?
                .iter()
                .map(|food| leaf_string(Some(food)))
                .collect();
            Ok(Meal {
                name: leaf_string(meal.get("name")),
                foods,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DietPlan {
        daily_calories: plan.get("dailyCalories").cloned().unwrap_or(Value::Null),
        meals,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, PlanShapeError> {
    value
        .as_object()
        .ok_or_else(|| PlanShapeError::NotAnObject(path.to_string()))
}

fn array_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, PlanShapeError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(PlanShapeError::MissingField(path.to_string())),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(PlanShapeError::NotAnArray(path.to_string())),
    }
}

/// Strings pass through; other scalars are rendered as JSON; null/absent is empty.
fn leaf_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Read a positive count from a number or numeric text, else `default`.
fn coerce_count(value: Option<&Value>, default: u32) -> u32 {
    let count = match value {
        Some(Value::Number(n)) => number_count(n),
        Some(Value::String(s)) => parse_leading_int(s),
        _ => None,
    };

    count.filter(|&n| n >= 1).unwrap_or(default)
}

fn number_count(n: &Number) -> Option<u32> {
    if let Some(u) = n.as_u64() {
        return Some(u32::try_from(u).unwrap_or(u32::MAX));
    }

    // Negative integers and floats. Fractions are truncated.
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= 1.0)
        .map(|f| f.trunc().min(f64::from(u32::MAX)) as u32)
}

/// Parse the integer prefix of `text` ("12 reps" -> 12, " 8" -> 8).
///
/// Negative values yield `None`.
fn parse_leading_int(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 || negative {
        return None;
    }

    // Only overflow can fail here.
    Some(rest[..digits_len].parse::<u32>().unwrap_or(u32::MAX))
}
