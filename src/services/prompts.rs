// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt text for workout and diet plan generation.
//!
//! Both prompts are pure functions of the user's attributes so the same
//! profile always produces the same request to the model.

/// Attributes used for the workout prompt.
#[derive(Debug, Clone, Copy)]
pub struct WorkoutProfile<'a> {
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub injuries: &'a str,
    pub workout_days: &'a str,
    pub fitness_goal: &'a str,
    pub fitness_level: &'a str,
}

/// Attributes used for the diet prompt.
#[derive(Debug, Clone, Copy)]
pub struct DietProfile<'a> {
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub dietary_restrictions: &'a str,
    pub fitness_goal: &'a str,
}

/// Example output embedded in the workout prompt.
pub const WORKOUT_PLAN_EXAMPLE: &str = r#"{
  "schedule": ["Monday", "Wednesday", "Friday"],
  "exercises": [
    {
      "day": "Monday",
      "routines": [
        {
          "name": "Exercise Name",
          "sets": 3,
          "reps": 10
        }
      ]
    }
  ]
}"#;

/// Example output embedded in the diet prompt.
pub const DIET_PLAN_EXAMPLE: &str = r#"{
  "dailyCalories": 2000,
  "meals": [
    {
      "name": "Breakfast",
      "foods": ["Oatmeal with berries", "Greek yogurt", "Black coffee"]
    },
    {
      "name": "Lunch",
      "foods": ["Grilled chicken salad", "Whole grain bread", "Water"]
    }
  ]
}"#;

/// Build the workout plan prompt.
pub fn workout_prompt(profile: &WorkoutProfile<'_>) -> String {
    let WorkoutProfile {
        age,
        height,
        weight,
        injuries,
        workout_days,
        fitness_goal,
        fitness_level,
    } = *profile;

    format!(
        "You are an experienced fitness coach. Create a personalized workout plan for:
Age: {age}
Height: {height}
Weight: {weight}
Injuries or limitations: {injuries}
Available days for workout: {workout_days}
Fitness goal: {fitness_goal}
Fitness level: {fitness_level}

Coaching guidelines:
- Split muscle groups so the same muscles are not trained on consecutive days
- Match exercise difficulty to the fitness level and work around any injuries
- Target the stated fitness goal

Output rules:
- Include ONLY the fields shown in the example below; never add other fields
- \"sets\" and \"reps\" MUST be numbers, never strings
- Do not write values like \"reps\": \"To failure\" or \"reps\": \"As many as possible\"; pick a number such as 12 or 15
- For cardio use \"sets\": 1 and \"reps\": 1, or another suitable number

Return a JSON object with exactly this structure:
{WORKOUT_PLAN_EXAMPLE}

Respond with the JSON object only, with no surrounding text."
    )
}

/// Build the diet plan prompt.
pub fn diet_prompt(profile: &DietProfile<'_>) -> String {
    let DietProfile {
        age,
        height,
        weight,
        dietary_restrictions,
        fitness_goal,
    } = *profile;

    format!(
        "You are an experienced nutrition coach. Create a personalized diet plan for:
Age: {age}
Height: {height}
Weight: {weight}
Fitness goal: {fitness_goal}
Dietary restrictions: {dietary_restrictions}

Coaching guidelines:
- Choose a daily calorie intake appropriate for these stats and the goal
- Balance macronutrients across meals
- Use a variety of nutrient-dense foods that respect the dietary restrictions
- Time meals around workouts for performance and recovery

Output rules:
- Include ONLY the fields shown in the example below; never add other fields
- \"dailyCalories\" MUST be a number, not a string
- Do not add fields such as \"supplements\", \"macros\" or \"notes\"
- Each meal has only a \"name\" and a \"foods\" array

Return a JSON object with exactly this structure:
{DIET_PLAN_EXAMPLE}

Respond with the JSON object only, with no surrounding text."
    )
}
