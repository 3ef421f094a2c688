use clap::{Args, Parser, Subcommand};

use crate::estimator::{
    ActivityLevel, DietPreference, DietType, FieldError, Goal, InvalidInput, Sex, UserProfile,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Daily calorie, macro and water estimates with optional AI meal plans",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate maintenance and target calories, macros and water intake
    Estimate {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },
    /// Estimate target calories, then ask the model for a sample meal plan
    MealPlan {
        #[command(flatten)]
        profile: ProfileArgs,
        #[arg(long, value_enum, default_value_t = DietPreference::Vegetarian)]
        diet_preference: DietPreference,
        /// Use this calorie target instead of estimating one from the profile
        #[arg(long)]
        calories: Option<u32>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change saved preferences
    Settings {
        /// Dark mode preference (on/off)
        #[arg(long, value_parser = clap::builder::BoolishValueParser::new())]
        dark_mode: Option<bool>,
        /// Save a model API key for later runs
        #[arg(long, conflicts_with = "forget_api_key")]
        api_key: Option<String>,
        /// Remove the saved API key
        #[arg(long)]
        forget_api_key: bool,
    },
}

/// Profile flags shared by `estimate` and `meal-plan`.
///
/// Weight, height and age are optional at the parser level so that
/// `meal-plan --calories` works without them; [`ProfileArgs::into_profile`]
/// reports them as field errors when they are needed.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,
    /// Height in centimetres
    #[arg(long)]
    pub height: Option<f64>,
    /// Age in years (15-100)
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long, value_enum, default_value_t = Sex::Male)]
    pub sex: Sex,
    #[arg(long, value_enum, default_value_t = ActivityLevel::Sedentary)]
    pub activity: ActivityLevel,
    /// Body fat percentage; switches BMR to Katch-McArdle
    #[arg(long)]
    pub body_fat: Option<f64>,
    /// Daily exercise minutes, used for the water estimate
    #[arg(long)]
    pub exercise_minutes: Option<f64>,
    #[arg(long, value_enum, default_value_t = Goal::Maintain)]
    pub goal: Goal,
    /// Surplus or deficit percentage (10-30)
    #[arg(long, default_value_t = 15.0)]
    pub intensity: f64,
    #[arg(long, value_enum, default_value_t = DietType::Balanced)]
    pub diet_type: DietType,
}

impl ProfileArgs {
    pub fn into_profile(self) -> Result<UserProfile, InvalidInput> {
        let mut missing = Vec::new();
        if self.weight.is_none() {
            missing.push(FieldError {
                field: "weight_kg",
                message: "Please enter a valid weight.".to_string(),
            });
        }
        if self.height.is_none() {
            missing.push(FieldError {
                field: "height_cm",
                message: "Please enter a valid height.".to_string(),
            });
        }
        if self.age.is_none() {
            missing.push(FieldError {
                field: "age_years",
                message: "Please enter a valid age (15-100).".to_string(),
            });
        }

        let profile = UserProfile {
            weight_kg: self.weight.unwrap_or(0.0),
            height_cm: self.height.unwrap_or(0.0),
            age_years: self.age.unwrap_or(0),
            sex: self.sex,
            body_fat_pct: self.body_fat,
            activity_level: self.activity,
            exercise_minutes_per_day: self.exercise_minutes,
            goal: self.goal,
            goal_intensity_pct: self.intensity,
            diet_type: self.diet_type,
        };

        // Missing values are reported once, not again as out-of-range.
        let mut errors = missing;
        if let Err(invalid) = profile.validate() {
            for err in invalid.errors {
                if !errors.iter().any(|e| e.field == err.field) {
                    errors.push(err);
                }
            }
        }
        if errors.is_empty() {
            Ok(profile)
        } else {
            Err(InvalidInput { errors })
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
