//! Process configuration, read from the environment (and `.env` via dotenv).

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::api_connection::endpoints::ProviderKind;
use crate::estimator::EstimatorConfig;

pub const PROVIDER_ENV_VAR: &str = "CALORIEWISE_PROVIDER";
pub const MODEL_ENV_VAR: &str = "CALORIEWISE_MODEL";
pub const BASE_URL_ENV_VAR: &str = "CALORIEWISE_BASE_URL";
pub const SETTINGS_PATH_ENV_VAR: &str = "CALORIEWISE_SETTINGS_PATH";

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub base_url: Option<String>,
    /// Key found in the provider's environment variable, if any.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub settings_path: PathBuf,
    pub estimator: EstimatorConfig,
}

fn parse_provider(value: &str) -> Result<ProviderKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "google" | "googleai" | "gemini" => Ok(ProviderKind::Google),
        "openrouter" => Ok(ProviderKind::OpenRouter),
        other => Err(anyhow!(
            "{} must be 'google' or 'openrouter', got '{}'",
            PROVIDER_ENV_VAR,
            other
        )),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn override_f64(key: &str, target: &mut f64) -> Result<()> {
    if let Some(raw) = non_empty_var(key) {
        *target = raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw))?;
    }
    Ok(())
}

fn default_settings_path() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("caloriewise")
            .join("settings.json"),
        None => PathBuf::from("caloriewise-settings.json"),
    }
}

impl EstimatorConfig {
    /// Defaults with any `CALORIEWISE_*` constant overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = EstimatorConfig::default();
        override_f64(
            "CALORIEWISE_PROTEIN_FACTOR_STANDARD",
            &mut config.protein_factor_standard,
        )?;
        override_f64(
            "CALORIEWISE_PROTEIN_FACTOR_ELEVATED",
            &mut config.protein_factor_elevated,
        )?;
        override_f64(
            "CALORIEWISE_FAT_FRACTION_BALANCED",
            &mut config.fat_fraction_balanced,
        )?;
        override_f64(
            "CALORIEWISE_FAT_FRACTION_HIGH_PROTEIN",
            &mut config.fat_fraction_high_protein,
        )?;
        override_f64("CALORIEWISE_WATER_ML_PER_KG", &mut config.water_ml_per_kg)?;
        override_f64(
            "CALORIEWISE_WATER_ML_PER_EXERCISE_MINUTE",
            &mut config.water_ml_per_exercise_minute,
        )?;
        config
            .validate()
            .context("Invalid CALORIEWISE_* estimator override")?;
        Ok(config)
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let provider = match non_empty_var(PROVIDER_ENV_VAR) {
            Some(raw) => parse_provider(&raw)?,
            None => ProviderKind::Google,
        };
        let model = non_empty_var(MODEL_ENV_VAR)
            .unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            model: ModelConfig {
                provider,
                model,
                base_url: non_empty_var(BASE_URL_ENV_VAR),
                api_key: non_empty_var(provider.api_key_env_var()),
            },
            settings_path: non_empty_var(SETTINGS_PATH_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_settings_path),
            estimator: EstimatorConfig::from_env()?,
        })
    }
}
