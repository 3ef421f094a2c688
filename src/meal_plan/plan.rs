use serde::{de, Deserialize, Deserializer, Serialize};

/// Meals every generated plan is expected to contain.
pub const CORE_MEALS: [&str; 3] = ["Breakfast", "Lunch", "Dinner"];

// Models sometimes answer 140.5 where the schema asks for an integer.
fn deserialize_calories<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) if value.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&value) => {
            Ok(Some(value.round() as u32))
        }
        Some(value) => Err(de::Error::custom(format!(
            "calories must be a non-negative number, got {}",
            value
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MealItem {
    /// e.g. "Roti (Whole Wheat)"
    pub name: String,
    /// Free text, e.g. "2 small" or "1 cup".
    pub quantity: String,
    #[serde(
        default,
        deserialize_with = "deserialize_calories",
        skip_serializing_if = "Option::is_none"
    )]
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Meal {
    pub name: String,
    pub items: Vec<MealItem>,
    #[serde(
        default,
        deserialize_with = "deserialize_calories",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_calories: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MealPlan {
    pub daily_meal_plan: Vec<Meal>,
    #[serde(
        default,
        deserialize_with = "deserialize_calories",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_total_calories: Option<u32>,
}

impl MealPlan {
    /// Core meal names absent from the plan, compared case-insensitively.
    pub fn missing_core_meals(&self) -> Vec<&'static str> {
        CORE_MEALS
            .iter()
            .copied()
            .filter(|core| {
                !self
                    .daily_meal_plan
                    .iter()
                    .any(|meal| meal.name.trim().eq_ignore_ascii_case(core))
            })
            .collect()
    }

    /// Sum of item calories where the model supplied them.
    pub fn itemized_calories(&self) -> u32 {
        self.daily_meal_plan
            .iter()
            .flat_map(|meal| meal.items.iter())
            .filter_map(|item| item.calories)
            .sum()
    }
}
