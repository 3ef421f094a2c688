//! Client-side preferences: dark mode and a cached model credential.
//!
//! Callers receive a [`SettingsStore`] and load/save explicitly; nothing in
//! the crate reads preferences from ambient global state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// `None` means "follow the system preference".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Settings {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn forget_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = Some(dark_mode);
        self
    }
}

pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings persisted as pretty-printed JSON. A missing file loads as defaults.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file '{}'", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file '{}'", self.path.display()))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory '{}'", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings file '{}'", self.path.display()))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    settings: Mutex<Settings>,
}

impl InMemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        let guard = self
            .settings
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|_| anyhow::anyhow!("settings lock poisoned"))?;
        *guard = settings.clone();
        Ok(())
    }
}

/// Where the model credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    Settings,
    Prompt,
}

/// Picks a credential: environment first, then the cached key, then `prompt`.
///
/// A key obtained from `prompt` is saved to `store` for later runs.
pub fn resolve_api_key<F>(
    env_key: Option<String>,
    store: &dyn SettingsStore,
    prompt: F,
) -> Result<Option<(String, ApiKeySource)>>
where
    F: FnOnce() -> Result<Option<String>>,
{
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        return Ok(Some((key, ApiKeySource::Environment)));
    }
    let settings = store.load()?;
    if let Some(key) = settings.api_key.clone().filter(|k| !k.trim().is_empty()) {
        return Ok(Some((key, ApiKeySource::Settings)));
    }
    match prompt()?.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        Some(key) => {
            store.save(&settings.with_api_key(key.clone()))?;
            Ok(Some((key, ApiKeySource::Prompt)))
        }
        None => Ok(None),
    }
}

/// Drops the saved key after the provider rejected the key from `source`.
///
/// Only keys that came from the store, or from the prompt that filled it,
/// are removed. Returns whether a saved key was removed.
pub fn forget_rejected_api_key(
    store: &dyn SettingsStore,
    source: Option<ApiKeySource>,
) -> Result<bool> {
    if !matches!(source, Some(ApiKeySource::Settings | ApiKeySource::Prompt)) {
        return Ok(false);
    }
    let settings = store.load()?;
    if settings.api_key.is_none() {
        return Ok(false);
    }
    store.save(&settings.forget_api_key())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_file_store_round_trip_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path().join("nested/deeper/settings.json"));
        let settings = Settings::default().with_dark_mode(true).with_api_key("k-123");
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);

        store.save(&store.load().unwrap().forget_api_key()).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("api_key"));
        assert_eq!(store.load().unwrap().dark_mode, Some(true));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileSettingsStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn test_resolve_prefers_environment() {
        let store = InMemorySettingsStore::new(Settings::default().with_api_key("cached"));
        let resolved = resolve_api_key(Some("from-env".into()), &store, || {
            panic!("prompt should not run")
        })
        .unwrap();
        assert_eq!(resolved, Some(("from-env".to_string(), ApiKeySource::Environment)));
    }

    #[test]
    fn test_resolve_uses_cached_key() {
        let store = InMemorySettingsStore::new(Settings::default().with_api_key("cached"));
        let resolved = resolve_api_key(None, &store, || Ok(None)).unwrap();
        assert_eq!(resolved, Some(("cached".to_string(), ApiKeySource::Settings)));
    }

    #[test]
    fn test_prompted_key_is_persisted() {
        let store = InMemorySettingsStore::new(Settings::default().with_dark_mode(true));
        let resolved = resolve_api_key(None, &store, || Ok(Some("  typed  ".into()))).unwrap();
        assert_eq!(resolved, Some(("typed".to_string(), ApiKeySource::Prompt)));
        let saved = store.load().unwrap();
        assert_eq!(saved.api_key.as_deref(), Some("typed"));
        assert_eq!(saved.dark_mode, Some(true));
    }

    #[test]
    fn test_no_key_anywhere() {
        let store = InMemorySettingsStore::default();
        assert_eq!(resolve_api_key(None, &store, || Ok(None)).unwrap(), None);
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemorySettingsStore::default();
        store.save(&Settings::default().with_api_key("abc")).unwrap();
        assert_eq!(store.load().unwrap().api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_rejected_environment_key_keeps_saved_key() {
        let store = InMemorySettingsStore::new(Settings::default().with_api_key("cached"));
        assert!(!forget_rejected_api_key(&store, Some(ApiKeySource::Environment)).unwrap());
        assert!(!forget_rejected_api_key(&store, None).unwrap());
        assert_eq!(store.load().unwrap().api_key.as_deref(), Some("cached"));
    }

    #[test]
    fn test_rejected_saved_or_prompted_key_is_forgotten() {
        for source in [ApiKeySource::Settings, ApiKeySource::Prompt] {
            let store = InMemorySettingsStore::new(
                Settings::default().with_api_key("stale").with_dark_mode(false),
            );
            assert!(forget_rejected_api_key(&store, Some(source)).unwrap());
            let saved = store.load().unwrap();
            assert_eq!(saved.api_key, None);
            assert_eq!(saved.dark_mode, Some(false));
            assert!(!forget_rejected_api_key(&store, Some(source)).unwrap());
        }
    }
}
