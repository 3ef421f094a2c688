use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::profile::{ActivityLevel, DietType};

/// Kilocalories per gram of protein and carbohydrate (Atwater factor).
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARB: f64 = 4.0;
/// Kilocalories per gram of fat.
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

pub const KATCH_MCARDLE_BASE: f64 = 370.0;
pub const KATCH_MCARDLE_PER_KG_LEAN: f64 = 21.6;

pub const MIFFLIN_PER_KG: f64 = 10.0;
pub const MIFFLIN_PER_CM: f64 = 6.25;
pub const MIFFLIN_PER_YEAR: f64 = 5.0;
pub const MIFFLIN_MALE_OFFSET: f64 = 5.0;
pub const MIFFLIN_FEMALE_OFFSET: f64 = -161.0;

/// Allowed share of target calories from fat, inclusive.
pub const MIN_FAT_FRACTION: f64 = 0.20;
pub const MAX_FAT_FRACTION: f64 = 0.30;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} must be {expected}, got {value}")]
pub struct ValueOutOfRange {
    pub field: &'static str,
    pub value: f64,
    pub expected: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMultipliers {
    pub sedentary: f64,
    pub lightly_active: f64,
    pub moderately_active: f64,
    pub very_active: f64,
    pub extremely_active: f64,
}

impl Default for ActivityMultipliers {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            lightly_active: 1.375,
            moderately_active: 1.55,
            very_active: 1.725,
            extremely_active: 1.9,
        }
    }
}

impl ActivityMultipliers {
    pub fn for_level(&self, level: ActivityLevel) -> f64 {
        match level {
            ActivityLevel::Sedentary => self.sedentary,
            ActivityLevel::LightlyActive => self.lightly_active,
            ActivityLevel::ModeratelyActive => self.moderately_active,
            ActivityLevel::VeryActive => self.very_active,
            ActivityLevel::ExtremelyActive => self.extremely_active,
        }
    }
}

/// Tunable constants behind the macro and water estimates.
///
/// Past versions of the calculator disagreed on protein factors (1.4/2.0 vs
/// 1.6/2.4) and on the water model (35 ml/kg vs 30 ml/kg plus exercise).
/// `Default` is the 1.4/2.0 set with the exercise-aware water model; the
/// other combinations are available as named presets or field overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Grams of protein per kg for maintain/lose on a balanced diet.
    pub protein_factor_standard: f64,
    /// Grams of protein per kg when gaining or on a high-protein diet.
    pub protein_factor_elevated: f64,
    /// Share of target calories coming from fat.
    pub fat_fraction_balanced: f64,
    pub fat_fraction_high_protein: f64,
    pub water_ml_per_kg: f64,
    pub water_ml_per_exercise_minute: f64,
    pub activity_multipliers: ActivityMultipliers,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            protein_factor_standard: 1.4,
            protein_factor_elevated: 2.0,
            fat_fraction_balanced: 0.30,
            fat_fraction_high_protein: 0.25,
            water_ml_per_kg: 30.0,
            water_ml_per_exercise_minute: 0.5,
            activity_multipliers: ActivityMultipliers::default(),
        }
    }
}

impl EstimatorConfig {
    /// The first calculator's constants: flat 25% fat and 35 ml/kg water with
    /// no exercise term.
    pub fn legacy_baseline() -> Self {
        Self {
            fat_fraction_balanced: 0.25,
            fat_fraction_high_protein: 0.25,
            water_ml_per_kg: 35.0,
            water_ml_per_exercise_minute: 0.0,
            ..Self::default()
        }
    }

    pub fn high_protein_factors() -> Self {
        Self {
            protein_factor_standard: 1.6,
            protein_factor_elevated: 2.4,
            ..Self::default()
        }
    }

    /// Rejects constants that would make the estimate meaningless.
    pub fn validate(&self) -> Result<(), ValueOutOfRange> {
        let positive = [
            ("protein_factor_standard", self.protein_factor_standard),
            ("protein_factor_elevated", self.protein_factor_elevated),
            ("activity_multipliers.sedentary", self.activity_multipliers.sedentary),
            ("activity_multipliers.lightly_active", self.activity_multipliers.lightly_active),
            (
                "activity_multipliers.moderately_active",
                self.activity_multipliers.moderately_active,
            ),
            ("activity_multipliers.very_active", self.activity_multipliers.very_active),
            (
                "activity_multipliers.extremely_active",
                self.activity_multipliers.extremely_active,
            ),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValueOutOfRange {
                    field,
                    value,
                    expected: "a finite number above 0",
                });
            }
        }

        for (field, value) in [
            ("fat_fraction_balanced", self.fat_fraction_balanced),
            ("fat_fraction_high_protein", self.fat_fraction_high_protein),
        ] {
            if !(MIN_FAT_FRACTION..=MAX_FAT_FRACTION).contains(&value) {
                return Err(ValueOutOfRange {
                    field,
                    value,
                    expected: "between 0.20 and 0.30",
                });
            }
        }

        for (field, value) in [
            ("water_ml_per_kg", self.water_ml_per_kg),
            ("water_ml_per_exercise_minute", self.water_ml_per_exercise_minute),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ValueOutOfRange {
                    field,
                    value,
                    expected: "a finite number of at least 0",
                });
            }
        }

        Ok(())
    }

    pub fn fat_fraction(&self, diet_type: DietType) -> f64 {
        match diet_type {
            DietType::Balanced => self.fat_fraction_balanced,
            DietType::HighProtein => self.fat_fraction_high_protein,
        }
    }
}
