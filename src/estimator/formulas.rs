use serde::{Deserialize, Serialize};

use super::constants::{
    EstimatorConfig, KATCH_MCARDLE_BASE, KATCH_MCARDLE_PER_KG_LEAN, KCAL_PER_GRAM_CARB,
    KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN, MIFFLIN_FEMALE_OFFSET, MIFFLIN_MALE_OFFSET,
    MIFFLIN_PER_CM, MIFFLIN_PER_KG, MIFFLIN_PER_YEAR,
};
use super::profile::{ActivityLevel, DietType, Goal, Sex, MAX_BODY_FAT_PCT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmrFormula {
    MifflinStJeor,
    KatchMcArdle,
}

/// Unrounded macro grams. Rounding happens once, when the estimate is assembled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macros {
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

fn lean_mass_kg(weight_kg: f64, body_fat_pct: Option<f64>) -> Option<f64> {
    let bf = body_fat_pct?;
    if !(bf > 0.0 && bf < MAX_BODY_FAT_PCT) || weight_kg <= 0.0 {
        return None;
    }
    let lean = weight_kg * (1.0 - bf / 100.0);
    (lean > 0.0).then_some(lean)
}

/// Which equation `compute_bmr` will use for these inputs.
pub fn select_bmr_formula(weight_kg: f64, body_fat_pct: Option<f64>) -> BmrFormula {
    match lean_mass_kg(weight_kg, body_fat_pct) {
        Some(_) => BmrFormula::KatchMcArdle,
        None => BmrFormula::MifflinStJeor,
    }
}

/// Basal metabolic rate in kcal/day.
///
/// A usable body fat percentage switches to Katch-McArdle, which ignores
/// height, age and sex. Otherwise Mifflin-St Jeor is used.
pub fn compute_bmr(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    sex: Sex,
    body_fat_pct: Option<f64>,
) -> f64 {
    if let Some(lean) = lean_mass_kg(weight_kg, body_fat_pct) {
        return KATCH_MCARDLE_BASE + KATCH_MCARDLE_PER_KG_LEAN * lean;
    }

    let base = MIFFLIN_PER_KG * weight_kg + MIFFLIN_PER_CM * height_cm
        - MIFFLIN_PER_YEAR * f64::from(age_years);
    match sex {
        Sex::Female => base + MIFFLIN_FEMALE_OFFSET,
        Sex::Male | Sex::Other => base + MIFFLIN_MALE_OFFSET,
    }
}

pub fn compute_maintenance(
    bmr: f64,
    activity_level: ActivityLevel,
    config: &EstimatorConfig,
) -> f64 {
    bmr * config.activity_multipliers.for_level(activity_level)
}

/// Maintenance adjusted by a surplus (gain) or deficit (lose) percentage.
pub fn compute_target_calories(maintenance: f64, goal: Goal, goal_intensity_pct: f64) -> f64 {
    match goal {
        Goal::Gain => maintenance * (1.0 + goal_intensity_pct / 100.0),
        Goal::Lose => maintenance * (1.0 - goal_intensity_pct / 100.0),
        Goal::Maintain => maintenance,
    }
}

/// Splits target calories into protein, fat and carbohydrate grams.
///
/// Protein is sized from body weight, fat from a share of the target, and
/// carbohydrates take whatever is left. If protein and fat already exceed the
/// target, carbs are clamped to zero and the overflow is absorbed silently.
pub fn compute_macros(
    weight_kg: f64,
    target_calories: f64,
    goal: Goal,
    diet_type: DietType,
    config: &EstimatorConfig,
) -> Macros {
    let protein_factor = if goal == Goal::Gain || diet_type == DietType::HighProtein {
        config.protein_factor_elevated
    } else {
        config.protein_factor_standard
    };
    let protein_g = weight_kg * protein_factor;

    let fat_calories = target_calories * config.fat_fraction(diet_type);
    let fat_g = fat_calories / KCAL_PER_GRAM_FAT;

    let remaining =
        target_calories - protein_g * KCAL_PER_GRAM_PROTEIN - fat_g * KCAL_PER_GRAM_FAT;
    let carbs_g = (remaining / KCAL_PER_GRAM_CARB).max(0.0);

    Macros {
        protein_g,
        fat_g,
        carbs_g,
    }
}

/// Daily water in ml: a per-kg base plus a per-minute exercise allowance.
pub fn compute_water_intake(
    weight_kg: f64,
    exercise_minutes_per_day: Option<f64>,
    config: &EstimatorConfig,
) -> f64 {
    weight_kg * config.water_ml_per_kg
        + exercise_minutes_per_day.unwrap_or(0.0) * config.water_ml_per_exercise_minute
}
