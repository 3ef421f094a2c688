use anyhow::{Context, Result};
use caloriewise::api_connection::{ChatCompletionsClient, Provider};
use caloriewise::cli::{parse_args, Command, ProfileArgs};
use caloriewise::config::AppConfig;
use caloriewise::estimator::{DietPreference, Estimator, Goal};
use caloriewise::meal_plan::{MealPlanError, MealPlanRequester};
use caloriewise::report::{render_estimate, render_meal_plan};
use caloriewise::settings::{
    forget_rejected_api_key, resolve_api_key, JsonFileSettingsStore, SettingsStore,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn prompt_for_api_key(env_var: &str) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        return Ok(None);
    }
    eprint!("No API key found in {}. Paste one to save it (empty to skip): ", env_var);
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read API key from stdin")?;
    Ok(Some(line.trim().to_string()).filter(|k| !k.is_empty()))
}

fn run_estimate(config: &AppConfig, profile: ProfileArgs, json: bool) -> Result<()> {
    let profile = profile.into_profile()?;
    let estimate = Estimator::new(config.estimator.clone()).estimate(&profile);
    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print!("{}", render_estimate(&profile, &estimate));
    }
    Ok(())
}

async fn run_meal_plan(
    config: &AppConfig,
    store: &dyn SettingsStore,
    profile: ProfileArgs,
    diet_preference: DietPreference,
    calories: Option<u32>,
    json: bool,
) -> Result<()> {
    let goal: Goal = profile.goal;
    let target_calories = match calories {
        Some(calories) => calories,
        None => {
            let profile = profile.into_profile()?;
            let estimate = Estimator::new(config.estimator.clone()).estimate(&profile);
            if !json {
                print!("{}", render_estimate(&profile, &estimate));
                println!();
            }
            u32::try_from(estimate.target_calories)
                .context("Estimated target calories out of range")?
        }
    };

    let env_var = config.model.provider.api_key_env_var();
    let api_key = resolve_api_key(config.model.api_key.clone(), store, || {
        prompt_for_api_key(env_var)
    })?;
    let key_source = api_key.as_ref().map(|(_, source)| *source);
    if let Some(source) = key_source {
        info!(
            ?source,
            provider = ?config.model.provider,
            model = %config.model.model,
            "model credential resolved"
        );
    }

    let provider = Provider::new(
        config.model.provider,
        api_key.map(|(key, _)| key),
        config.model.base_url.clone(),
    );
    let client = ChatCompletionsClient::new(provider, config.model.model.clone());
    let requester = MealPlanRequester::new(Arc::new(client));

    match requester
        .request_meal_plan(target_calories, goal, diet_preference)
        .await
    {
        Ok(plan) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", render_meal_plan(&plan));
            }
            Ok(())
        }
        Err(err @ MealPlanError::CredentialMissingOrInvalid(_)) => {
            if forget_rejected_api_key(store, key_source)? {
                warn!("removed the saved API key after a credential failure");
            }
            eprintln!(
                "Set {} or run `caloriewise settings --api-key <KEY>`, then try again.",
                env_var
            );
            Err(err.into())
        }
        Err(err @ MealPlanError::ModelConfiguration(_)) => {
            eprintln!(
                "Model '{}' is not available; set CALORIEWISE_MODEL to a valid model name.",
                config.model.model
            );
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

fn run_settings(
    store: &dyn SettingsStore,
    dark_mode: Option<bool>,
    api_key: Option<String>,
    forget_api_key: bool,
) -> Result<()> {
    let mut settings = store.load()?;
    let changed = dark_mode.is_some() || api_key.is_some() || forget_api_key;
    if let Some(dark_mode) = dark_mode {
        settings = settings.with_dark_mode(dark_mode);
    }
    if let Some(api_key) = api_key {
        settings = settings.with_api_key(api_key);
    }
    if forget_api_key {
        settings = settings.forget_api_key();
    }
    if changed {
        store.save(&settings)?;
        info!("settings updated");
    }

    let theme = match settings.dark_mode {
        Some(true) => "dark",
        Some(false) => "light",
        None => "system",
    };
    println!("Theme: {}", theme);
    println!(
        "API key: {}",
        if settings.api_key.is_some() { "saved" } else { "not saved" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli_args = parse_args();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let store = JsonFileSettingsStore::new(&config.settings_path);

    match cli_args.command {
        Command::Estimate { profile, json } => run_estimate(&config, profile, json),
        Command::MealPlan {
            profile,
            diet_preference,
            calories,
            json,
        } => run_meal_plan(&config, &store, profile, diet_preference, calories, json).await,
        Command::Settings {
            dark_mode,
            api_key,
            forget_api_key,
        } => run_settings(&store, dark_mode, api_key, forget_api_key),
    }
}
