use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_AGE_YEARS: u32 = 15;
pub const MAX_AGE_YEARS: u32 = 100;
pub const MIN_GOAL_INTENSITY_PCT: f64 = 10.0;
pub const MAX_GOAL_INTENSITY_PCT: f64 = 30.0;
/// Exclusive upper bound for body fat. The lower bound (0) is exclusive too.
pub const MAX_BODY_FAT_PCT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    /// Uses the male Mifflin-St Jeor constant.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    /// Older forms call this level "Active".
    #[serde(alias = "active")]
    #[value(alias = "active")]
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly Active",
            ActivityLevel::ModeratelyActive => "Moderately Active",
            ActivityLevel::VeryActive => "Very Active",
            ActivityLevel::ExtremelyActive => "Extremely Active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Lose,
    Maintain,
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Lose => "lose",
            Goal::Maintain => "maintain",
            Goal::Gain => "gain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum DietType {
    #[default]
    Balanced,
    HighProtein,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DietPreference {
    #[serde(alias = "veg")]
    #[value(alias = "veg")]
    Vegetarian,
    NonVegetarian,
}

impl DietPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietPreference::Vegetarian => "vegetarian",
            DietPreference::NonVegetarian => "non-vegetarian",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DietPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the estimator needs to know about a person.
///
/// Construct it, call [`UserProfile::validate`], then hand it to the
/// estimator. The estimator itself trusts its input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
    #[serde(default)]
    pub body_fat_pct: Option<f64>,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub exercise_minutes_per_day: Option<f64>,
    pub goal: Goal,
    pub goal_intensity_pct: f64,
    #[serde(default)]
    pub diet_type: DietType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", join_field_errors(.errors))]
pub struct InvalidInput {
    pub errors: Vec<FieldError>,
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl InvalidInput {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl UserProfile {
    /// Checks every field against its domain and reports all violations together.
    pub fn validate(&self) -> Result<(), InvalidInput> {
        let mut errors = Vec::new();
        let mut reject = |field: &'static str, message: &str| {
            errors.push(FieldError {
                field,
                message: message.to_string(),
            });
        };

        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            reject("weight_kg", "Please enter a valid weight.");
        }
        if !self.height_cm.is_finite() || self.height_cm <= 0.0 {
            reject("height_cm", "Please enter a valid height.");
        }
        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&self.age_years) {
            reject("age_years", "Please enter a valid age (15-100).");
        }
        if let Some(bf) = self.body_fat_pct {
            if !(bf > 0.0 && bf < MAX_BODY_FAT_PCT) {
                reject("body_fat_pct", "Body fat must be between 0 and 70 percent.");
            }
        }
        if let Some(minutes) = self.exercise_minutes_per_day {
            if !minutes.is_finite() || minutes < 0.0 {
                reject(
                    "exercise_minutes_per_day",
                    "Exercise minutes cannot be negative.",
                );
            }
        }
        if !(MIN_GOAL_INTENSITY_PCT..=MAX_GOAL_INTENSITY_PCT).contains(&self.goal_intensity_pct) {
            reject(
                "goal_intensity_pct",
                "Surplus/deficit must be between 10 and 30 percent.",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(InvalidInput { errors })
        }
    }
}
