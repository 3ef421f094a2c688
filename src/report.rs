use std::fmt::Write;

use crate::estimator::{BmrFormula, CalorieEstimate, Goal, UserProfile};
use crate::meal_plan::MealPlan;

fn formula_label(formula: BmrFormula) -> &'static str {
    match formula {
        BmrFormula::MifflinStJeor => "Mifflin-St Jeor",
        BmrFormula::KatchMcArdle => "Katch-McArdle",
    }
}

pub fn render_estimate(profile: &UserProfile, estimate: &CalorieEstimate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "BMR ({}): {} kcal",
        formula_label(estimate.bmr_formula),
        estimate.bmr_calories
    );
    let _ = writeln!(
        out,
        "Maintenance ({}): {} kcal",
        profile.activity_level, estimate.maintenance_calories
    );
    match profile.goal {
        Goal::Gain => {
            let _ = writeln!(
                out,
                "Surplus ({}%): {} kcal",
                profile.goal_intensity_pct, estimate.surplus_calories
            );
        }
        Goal::Lose => {
            let _ = writeln!(
                out,
                "Deficit ({}%): {} kcal",
                profile.goal_intensity_pct, estimate.deficit_calories
            );
        }
        Goal::Maintain => {}
    }
    let _ = writeln!(out, "Target: {} kcal", estimate.target_calories);
    let _ = writeln!(
        out,
        "Macros: protein {} g, fat {} g, carbs {} g",
        estimate.protein_g, estimate.fat_g, estimate.carbs_g
    );
    let _ = writeln!(out, "Water: {} ml", estimate.water_ml);
    out
}

pub fn render_meal_plan(plan: &MealPlan) -> String {
    let mut out = String::new();
    for meal in &plan.daily_meal_plan {
        match meal.total_calories {
            Some(total) => {
                let _ = writeln!(out, "{} ({} kcal)", meal.name, total);
            }
            None => {
                let _ = writeln!(out, "{}", meal.name);
            }
        }
        for item in &meal.items {
            match item.calories {
                Some(calories) => {
                    let _ = writeln!(
                        out,
                        "  - {}: {} ({} kcal)",
                        item.name, item.quantity, calories
                    );
                }
                None => {
                    let _ = writeln!(out, "  - {}: {}", item.name, item.quantity);
                }
            }
        }
    }
    let itemized = plan.itemized_calories();
    if itemized > 0 {
        let _ = writeln!(out, "Items add up to: {} kcal", itemized);
    }
    if let Some(total) = plan.estimated_total_calories {
        let _ = writeln!(out, "Estimated total: {} kcal", total);
    }
    out
}
