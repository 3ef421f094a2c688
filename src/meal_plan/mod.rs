//! Sample meal plans from a hosted model.
//!
//! One request per call: build the prompt, ask the model for schema-shaped
//! JSON, parse it into a [`MealPlan`]. Nutritional accuracy is not checked;
//! a plan missing Breakfast, Lunch or Dinner is logged and still returned.

pub mod plan;
pub mod prompt;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api_connection::{ApiConnectionError, ApiErrorKind, StructuredModel};
use crate::estimator::{DietPreference, Goal};

pub use plan::{Meal, MealItem, MealPlan, CORE_MEALS};
pub use prompt::{build_meal_plan_prompt, meal_plan_schema};

#[derive(Debug, Error)]
pub enum MealPlanError {
    #[error("Failed to generate meal plan. The model did not return valid output: {0}")]
    ModelOutputInvalid(String),

    #[error("API key is invalid or missing. Please check the model credential: {0}")]
    CredentialMissingOrInvalid(String),

    #[error("AI model not found. Please check the model name in configuration: {0}")]
    ModelConfiguration(String),

    #[error("Failed to generate meal plan: {0}")]
    Generation(#[source] ApiConnectionError),

    #[error("Invalid meal plan request: {0}")]
    InvalidRequest(String),
}

impl From<ApiConnectionError> for MealPlanError {
    fn from(err: ApiConnectionError) -> Self {
        match err.kind() {
            ApiErrorKind::Credential => MealPlanError::CredentialMissingOrInvalid(err.to_string()),
            ApiErrorKind::ModelNotFound => MealPlanError::ModelConfiguration(err.to_string()),
            ApiErrorKind::Other => MealPlanError::Generation(err),
        }
    }
}

/// Removes a surrounding ```json ... ``` or ``` ... ``` fence if present.
/// The language tag is matched case-insensitively.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
        _ => inner.trim(),
    }
}

/// Parses raw model output into a plan, enforcing the schema.
pub fn parse_meal_plan(content: Option<&str>) -> Result<MealPlan, MealPlanError> {
    let raw = content.map(strip_code_fences).unwrap_or_default();
    if raw.is_empty() {
        return Err(MealPlanError::ModelOutputInvalid(
            "the response was empty".to_string(),
        ));
    }
    serde_json::from_str::<MealPlan>(raw).map_err(|e| {
        debug!(content = raw, "meal plan did not match the schema");
        MealPlanError::ModelOutputInvalid(e.to_string())
    })
}

#[derive(Clone)]
pub struct MealPlanRequester {
    model: Arc<dyn StructuredModel>,
}

impl MealPlanRequester {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self { model }
    }

    pub async fn request_meal_plan(
        &self,
        target_calories: u32,
        goal: Goal,
        diet_preference: DietPreference,
    ) -> Result<MealPlan, MealPlanError> {
        if target_calories == 0 {
            return Err(MealPlanError::InvalidRequest(
                "target calories must be positive".to_string(),
            ));
        }
        info!(target_calories, %goal, %diet_preference, "generating meal plan");

        let prompt = build_meal_plan_prompt(target_calories, goal, diet_preference);
        let schema = meal_plan_schema();

        let content = self.model.generate(&prompt, &schema).await.map_err(|e| {
            error!(error = %e, "meal plan request failed");
            MealPlanError::from(e)
        })?;

        let plan = parse_meal_plan(content.as_deref()).map_err(|e| {
            error!(error = %e, "meal plan generation failed");
            e
        })?;

        let missing = plan.missing_core_meals();
        if !missing.is_empty() {
            warn!(
                missing = ?missing,
                meals = plan.daily_meal_plan.len(),
                "generated meal plan may be missing core meals"
            );
        }
        info!(
            meals = plan.daily_meal_plan.len(),
            estimated_total_calories = ?plan.estimated_total_calories,
            itemized_calories = plan.itemized_calories(),
            "meal plan generated"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        assert_eq!(strip_code_fences("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```Json {} ```"), "{}");
        let plan = parse_meal_plan(Some(
            "```JSON\n{\"dailyMealPlan\": [{\"name\": \"Dinner\", \"items\": []}]}\n```",
        ))
        .unwrap();
        assert_eq!(plan.daily_meal_plan[0].name, "Dinner");
    }

    #[test]
    fn test_parse_empty_content_is_invalid_output() {
        assert!(matches!(parse_meal_plan(None), Err(MealPlanError::ModelOutputInvalid(_))));
        assert!(matches!(
            parse_meal_plan(Some("```json\n```")),
            Err(MealPlanError::ModelOutputInvalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let content =
            r#"{"dailyMealPlan": [{"name": "Lunch", "items": [{"name": "Dal", "quantity": 1}]}]}"#;
        assert!(matches!(
            parse_meal_plan(Some(content)),
            Err(MealPlanError::ModelOutputInvalid(_))
        ));
    }

    #[test]
    fn test_connection_errors_map_to_distinct_variants() {
        let missing: MealPlanError = ApiConnectionError::MissingApiKey("KEY".into()).into();
        assert!(matches!(missing, MealPlanError::CredentialMissingOrInvalid(_)));

        let not_found: MealPlanError = ApiConnectionError::ApiError {
            status: reqwest::StatusCode::NOT_FOUND,
            error_body: "model not found".into(),
        }
        .into();
        assert!(matches!(not_found, MealPlanError::ModelConfiguration(_)));

        let other: MealPlanError = ApiConnectionError::ApiError {
            status: reqwest::StatusCode::BAD_GATEWAY,
            error_body: "upstream".into(),
        }
        .into();
        assert!(matches!(other, MealPlanError::Generation(_)));
    }
}
