use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition};
use crate::estimator::{DietPreference, Goal};

pub const MEAL_PLAN_SCHEMA_NAME: &str = "daily_meal_plan";

fn macro_guidance(goal: Goal) -> &'static str {
    match goal {
        Goal::Lose => "roughly 40% carbohydrates, 30% protein and 30% fat",
        Goal::Gain => {
            "roughly 50% carbohydrates, 25-30% protein and 20-25% fat, with enough protein \
             for muscle growth and complex carbohydrates for energy"
        }
        Goal::Maintain => "roughly 50% carbohydrates, 20-25% protein and 25-30% fat",
    }
}

fn food_guidance(goal: Goal, diet_preference: DietPreference) -> String {
    match goal {
        Goal::Lose => "Favour high-protein, high-fibre, low glycemic index foods: dal, whole wheat \
                       or multigrain roti, plenty of vegetables, salads, sprouts, quinoa. Keep \
                       added fats and simple carbohydrates low."
            .to_string(),
        Goal::Gain => {
            let animal = match diet_preference {
                DietPreference::NonVegetarian => " Chicken, fish and eggs are welcome.",
                DietPreference::Vegetarian => "",
            };
            format!(
                "Include calorie-dense, protein-rich foods: almonds, walnuts, chia and flax \
                 seeds, ghee, full-fat paneer and curd, bananas, peanut butter, rice, potatoes.{}",
                animal
            )
        }
        Goal::Maintain => "Use balanced portions of whole foods: roti or rice, sabzi, dal, curd."
            .to_string(),
    }
}

fn example_dishes(diet_preference: DietPreference) -> &'static str {
    match diet_preference {
        DietPreference::Vegetarian => {
            "roti, rice, dals, paneer, seasonal vegetables, curd, poha, upma, idli, dosa, \
             khichdi, sabudana"
        }
        DietPreference::NonVegetarian => {
            "any vegetarian staple (roti, rice, dals, paneer, curd, poha, idli, dosa) plus \
             chicken curry or tikka, fish curry or fry, egg bhurji, egg curry, boiled eggs"
        }
    }
}

/// Instruction text for a one-day Indian meal plan.
pub fn build_meal_plan_prompt(
    target_calories: u32,
    goal: Goal,
    diet_preference: DietPreference,
) -> String {
    format!(
        "You are a nutritionist who specialises in Indian cuisine. Write a one-day meal plan.

Weight goal: {goal}
Daily calorie target: {calories} kcal
Diet preference: {diet}

Rules:
1. Every dish must fit the '{diet}' preference.
2. Split the day's energy as {macros}.
3. Breakfast, Lunch and Dinner are mandatory and must use exactly those names. A Mid-Morning \
Snack and an Evening Snack may be added when the target calls for it.
4. {foods}
5. Prefer common Indian dishes such as {dishes}.
6. Avoid processed foods, sugary drinks, excessive refined sugar and deep-fried items (a \
little is acceptable only when gaining weight).
7. Give every item a name, a quantity (e.g. \"2 small\", \"1 cup\") and estimated calories. \
Give each meal a totalCalories and the day an estimatedTotalCalories as close as possible to \
{calories}.
8. Reply with JSON matching the supplied schema only. No prose, no Markdown.

Example meal:
{{\"name\": \"Breakfast\", \"items\": [{{\"name\": \"Poha\", \"quantity\": \"1.5 cups\", \
\"calories\": 250}}, {{\"name\": \"Curd (Dahi)\", \"quantity\": \"1 cup\", \"calories\": 100}}], \
\"totalCalories\": 350}}",
        goal = goal,
        calories = target_calories,
        diet = diet_preference,
        macros = macro_guidance(goal),
        foods = food_guidance(goal, diet_preference),
        dishes = example_dishes(diet_preference),
    )
}

/// Output contract handed to the model; mirrors [`super::plan::MealPlan`].
///
/// Strict structured output wants every property listed as required, so the
/// optional calorie fields are nullable instead of omitted.
pub fn meal_plan_schema() -> JsonSchemaDefinition {
    let item = JsonSchema::object(vec![
        (
            "name",
            JsonSchema::scalar("string", "Food item, e.g. Roti, Dal Makhani, Apple"),
        ),
        (
            "quantity",
            JsonSchema::scalar("string", "Amount, e.g. 2 pieces, 1 cup, 1 medium"),
        ),
        (
            "calories",
            JsonSchema::nullable("integer", "Estimated calories for this item"),
        ),
    ]);

    let meal = JsonSchema::object(vec![
        (
            "name",
            JsonSchema::scalar(
                "string",
                "Meal name, e.g. Breakfast, Lunch, Dinner, Evening Snack",
            ),
        ),
        ("items", JsonSchema::array(item, "Food items in this meal")),
        (
            "totalCalories",
            JsonSchema::nullable("integer", "Estimated calories for the whole meal"),
        ),
    ]);

    JsonSchemaDefinition {
        name: MEAL_PLAN_SCHEMA_NAME.to_string(),
        strict: Some(true),
        schema: JsonSchema::object(vec![
            (
                "dailyMealPlan",
                JsonSchema::array(
                    meal,
                    "Meals for the day, including Breakfast, Lunch and Dinner",
                ),
            ),
            (
                "estimatedTotalCalories",
                JsonSchema::nullable("integer", "Estimated calories for the whole day"),
            ),
        ]),
    }
}
