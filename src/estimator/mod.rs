//! Calorie, macro and water estimation.
//!
//! Everything here is a pure function of a [`UserProfile`] and an
//! [`EstimatorConfig`]. Validation happens before, in [`UserProfile::validate`].

pub mod constants;
pub mod formulas;
pub mod profile;

use serde::{Deserialize, Serialize};

pub use constants::{ActivityMultipliers, EstimatorConfig, ValueOutOfRange};
pub use formulas::{
    compute_bmr, compute_macros, compute_maintenance, compute_target_calories,
    compute_water_intake, select_bmr_formula, BmrFormula, Macros,
};
pub use profile::{
    ActivityLevel, DietPreference, DietType, FieldError, Goal, InvalidInput, Sex, UserProfile,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieEstimate {
    pub bmr_calories: i64,
    pub bmr_formula: BmrFormula,
    pub maintenance_calories: i64,
    /// Maintenance plus the goal intensity, whatever the goal is.
    pub surplus_calories: i64,
    /// Maintenance minus the goal intensity, whatever the goal is.
    pub deficit_calories: i64,
    pub target_calories: i64,
    pub protein_g: i64,
    pub fat_g: i64,
    pub carbs_g: i64,
    pub water_ml: i64,
}

// Rounds half away from zero; all inputs here are non-negative in practice.
fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn estimate(&self, profile: &UserProfile) -> CalorieEstimate {
        let bmr_formula = select_bmr_formula(profile.weight_kg, profile.body_fat_pct);
        let bmr = compute_bmr(
            profile.weight_kg,
            profile.height_cm,
            profile.age_years,
            profile.sex,
            profile.body_fat_pct,
        );
        let maintenance = compute_maintenance(bmr, profile.activity_level, &self.config);
        let surplus = compute_target_calories(maintenance, Goal::Gain, profile.goal_intensity_pct);
        let deficit = compute_target_calories(maintenance, Goal::Lose, profile.goal_intensity_pct);
        let target = compute_target_calories(maintenance, profile.goal, profile.goal_intensity_pct);

        let macros = compute_macros(
            profile.weight_kg,
            target,
            profile.goal,
            profile.diet_type,
            &self.config,
        );
        let water = compute_water_intake(
            profile.weight_kg,
            profile.exercise_minutes_per_day,
            &self.config,
        );

        CalorieEstimate {
            bmr_calories: round_whole(bmr),
            bmr_formula,
            maintenance_calories: round_whole(maintenance),
            surplus_calories: round_whole(surplus),
            deficit_calories: round_whole(deficit),
            target_calories: round_whole(target),
            protein_g: round_whole(macros.protein_g),
            fat_g: round_whole(macros.fat_g),
            carbs_g: round_whole(macros.carbs_g).max(0),
            water_ml: round_whole(water),
        }
    }
}

/// Estimates with the default constants.
pub fn estimate(profile: &UserProfile) -> CalorieEstimate {
    Estimator::default().estimate(profile)
}
