use criterion::{criterion_group, criterion_main, Criterion};
use fitplan_api::services::{validate_diet_plan, validate_workout_plan};
use serde_json::{json, Value};
use std::hint::black_box;

/// A week of training in the shape the model usually returns, with the
/// usual extra fields and string counts mixed in.
fn workout_fixture() -> Value {
    let days = ["Monday", "Tuesday", "Thursday", "Friday", "Saturday"];
    let exercises: Vec<Value> = days
        .iter()
        .map(|day| {
            let routines: Vec<Value> = (0..8)
                .map(|i| {
                    json!({
                        "name": format!("Exercise {i}"),
                        "sets": if i % 2 == 0 { json!(3) } else { json!("4") },
                        "reps": if i % 3 == 0 { json!("to failure") } else { json!(12) },
                        "rest": "60s",
                        "notes": "Keep form strict"
                    })
                })
                .collect();
            json!({ "day": day, "focus": "full body", "routines": routines })
        })
        .collect();

    json!({ "schedule": days, "exercises": exercises, "description": "Weekly split" })
}

fn diet_fixture() -> Value {
    let meals: Vec<Value> = ["Breakfast", "Snack", "Lunch", "Snack", "Dinner"]
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "foods": ["Oatmeal", "Greek yogurt", "Berries", "Almonds"],
                "calories": 450,
                "macros": { "protein": 30, "carbs": 50, "fat": 15 }
            })
        })
        .collect();

    json!({ "dailyCalories": 2200, "meals": meals, "supplements": ["Creatine"] })
}

fn benchmark_plan_validation(c: &mut Criterion) {
    let workout = workout_fixture();
    let diet = diet_fixture();

    let mut group = c.benchmark_group("plan_validation");

    group.bench_function("workout_week", |b| {
        b.iter(|| validate_workout_plan(black_box(&workout)))
    });

    group.bench_function("diet_day", |b| {
        b.iter(|| validate_diet_plan(black_box(&diet)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_plan_validation);
criterion_main!(benches);
