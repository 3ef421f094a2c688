use async_trait::async_trait;
use caloriewise::api_connection::{ApiConnectionError, JsonSchemaDefinition, StructuredModel};
use caloriewise::estimator::{
    estimate, ActivityLevel, DietPreference, DietType, Goal, Sex, UserProfile,
};
use caloriewise::meal_plan::{MealPlanError, MealPlanRequester};
use reqwest::StatusCode;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects the message of every WARN event.
#[derive(Clone, Default)]
struct WarningCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WarningCapture {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages.lock().unwrap().push(visitor.0);
        }
    }
}

/// Replays one canned reply and records what it was asked.
struct FakeModel {
    reply: Mutex<Option<Result<Option<String>, ApiConnectionError>>>,
    prompts: Mutex<Vec<String>>,
    schema_names: Mutex<Vec<String>>,
}

impl FakeModel {
    fn replying(reply: Result<Option<String>, ApiConnectionError>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(reply)),
            prompts: Mutex::new(Vec::new()),
            schema_names: Mutex::new(Vec::new()),
        })
    }

    fn with_content(content: &str) -> Arc<Self> {
        Self::replying(Ok(Some(content.to_string())))
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl StructuredModel for FakeModel {
    async fn generate(
        &self,
        prompt: &str,
        schema: &JsonSchemaDefinition,
    ) -> Result<Option<String>, ApiConnectionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.schema_names.lock().unwrap().push(schema.name.clone());
        self.reply
            .lock()
            .unwrap()
            .take()
            .expect("fake model called more than once")
    }
}

const PLAN_WITHOUT_DINNER: &str = r#"{
  "dailyMealPlan": [
    {
      "name": "Breakfast",
      "items": [
        { "name": "Vegetable Upma", "quantity": "1 bowl", "calories": 300 },
        { "name": "Curd (Dahi)", "quantity": "1 cup", "calories": 100 }
      ],
      "totalCalories": 400
    },
    {
      "name": "Lunch",
      "items": [
        { "name": "Roti (Whole Wheat)", "quantity": "3 medium", "calories": 300 },
        { "name": "Rajma", "quantity": "1 cup", "calories": 250 }
      ],
      "totalCalories": 550
    }
  ],
  "estimatedTotalCalories": 950
}"#;

const FULL_PLAN: &str = r#"{
  "dailyMealPlan": [
    { "name": "Breakfast", "items": [{ "name": "Idli", "quantity": "4 pieces", "calories": 240 }] },
    { "name": "Lunch", "items": [{ "name": "Chicken Curry", "quantity": "1 bowl" }] },
    {
      "name": "Dinner",
      "items": [{ "name": "Egg Bhurji", "quantity": "2 eggs", "calories": 220 }],
      "totalCalories": 220
    }
  ]
}"#;

#[tokio::test]
async fn test_plan_missing_dinner_is_still_returned() {
    let model = FakeModel::with_content(PLAN_WITHOUT_DINNER);
    let requester = MealPlanRequester::new(model.clone());

    let plan = requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::Vegetarian)
        .await
        .expect("plan should be returned despite the missing meal");

    assert_eq!(plan.daily_meal_plan.len(), 2);
    assert_eq!(plan.estimated_total_calories, Some(950));
    assert_eq!(plan.missing_core_meals(), vec!["Dinner"]);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_missing_core_meal_is_logged_as_warning() {
    let capture = WarningCapture::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let requester = MealPlanRequester::new(FakeModel::with_content(PLAN_WITHOUT_DINNER));
    requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::Vegetarian)
        .await
        .unwrap();

    let warnings = capture.messages();
    assert_eq!(warnings.len(), 1, "warnings: {:?}", warnings);
    assert!(warnings[0].contains("missing core meals"));
}

#[tokio::test]
async fn test_full_plan_logs_no_warning() {
    let capture = WarningCapture::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

    let requester = MealPlanRequester::new(FakeModel::with_content(FULL_PLAN));
    requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::NonVegetarian)
        .await
        .unwrap();

    assert!(capture.messages().is_empty());
}

#[tokio::test]
async fn test_prompt_and_schema_reach_the_model() {
    let model = FakeModel::with_content(FULL_PLAN);
    let requester = MealPlanRequester::new(model.clone());

    let plan = requester
        .request_meal_plan(2650, Goal::Gain, DietPreference::NonVegetarian)
        .await
        .unwrap();
    assert!(plan.missing_core_meals().is_empty());
    assert_eq!(plan.daily_meal_plan[1].items[0].calories, None);

    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("Daily calorie target: 2650 kcal"));
    assert!(prompts[0].contains("Weight goal: gain"));
    assert!(prompts[0].contains("Diet preference: non-vegetarian"));
    assert_eq!(model.schema_names.lock().unwrap()[0], "daily_meal_plan");
}

#[tokio::test]
async fn test_fenced_output_is_accepted() {
    let fenced = format!("```json\n{}\n```", FULL_PLAN);
    let requester = MealPlanRequester::new(FakeModel::with_content(&fenced));
    let plan = requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::NonVegetarian)
        .await
        .unwrap();
    assert_eq!(plan.daily_meal_plan.len(), 3);
}

#[tokio::test]
async fn test_no_output_is_a_generation_failure_not_a_credential_failure() {
    let requester = MealPlanRequester::new(FakeModel::replying(Ok(None)));
    let result = requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::Vegetarian)
        .await;
    assert!(matches!(result, Err(MealPlanError::ModelOutputInvalid(_))));
    assert!(!matches!(result, Err(MealPlanError::CredentialMissingOrInvalid(_))));
}

#[tokio::test]
async fn test_schema_violation_is_invalid_output() {
    let requester = MealPlanRequester::new(FakeModel::with_content(
        r#"{"meals": [{"name": "Breakfast"}]}"#,
    ));
    let result = requester
        .request_meal_plan(2000, Goal::Lose, DietPreference::Vegetarian)
        .await;
    assert!(matches!(result, Err(MealPlanError::ModelOutputInvalid(_))));
}

#[tokio::test]
async fn test_rejected_key_is_a_credential_failure() {
    let requester = MealPlanRequester::new(FakeModel::replying(Err(
        ApiConnectionError::ApiError {
            status: StatusCode::BAD_REQUEST,
            error_body: "API key not valid. Please pass a valid API key.".to_string(),
        },
    )));
    let result = requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::Vegetarian)
        .await;
    assert!(matches!(result, Err(MealPlanError::CredentialMissingOrInvalid(_))));
}

#[tokio::test]
async fn test_unknown_model_is_a_configuration_failure() {
    let requester = MealPlanRequester::new(FakeModel::replying(Err(
        ApiConnectionError::ApiError {
            status: StatusCode::NOT_FOUND,
            error_body: "Model not found".to_string(),
        },
    )));
    let err = requester
        .request_meal_plan(2000, Goal::Maintain, DietPreference::Vegetarian)
        .await
        .unwrap_err();
    assert!(matches!(err, MealPlanError::ModelConfiguration(_)));
    assert!(err.to_string().starts_with("AI model not found"));
}

#[tokio::test]
async fn test_zero_calories_rejected_without_calling_model() {
    let model = FakeModel::with_content(FULL_PLAN);
    let requester = MealPlanRequester::new(model.clone());
    let result = requester
        .request_meal_plan(0, Goal::Maintain, DietPreference::Vegetarian)
        .await;
    assert!(matches!(result, Err(MealPlanError::InvalidRequest(_))));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_estimate_feeds_meal_plan_target() {
    let profile = UserProfile {
        weight_kg: 60.0,
        height_cm: 165.0,
        age_years: 25,
        sex: Sex::Female,
        body_fat_pct: None,
        activity_level: ActivityLevel::ModeratelyActive,
        exercise_minutes_per_day: Some(30.0),
        goal: Goal::Lose,
        goal_intensity_pct: 15.0,
        diet_type: DietType::Balanced,
    };
    profile.validate().unwrap();
    let estimate = estimate(&profile);
    // 1345.25 * 1.55 * 0.85 = 1772.36...
    assert_eq!(estimate.target_calories, 1772);

    let model = FakeModel::with_content(FULL_PLAN);
    let requester = MealPlanRequester::new(model.clone());
    requester
        .request_meal_plan(
            estimate.target_calories as u32,
            profile.goal,
            DietPreference::Vegetarian,
        )
        .await
        .unwrap();
    assert!(model.prompts.lock().unwrap()[0].contains("1772 kcal"));
}
