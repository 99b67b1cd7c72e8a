//! Configuration loading and factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use screening_core::engine::{AssessmentEngine, EngineConfig};
use screening_core::fallback::{BankFallback, FallbackProvider, MockScoreRange, SyntheticFallback};
use screening_core::parser::parse_bank;
use screening_core::policy::REAPPLY_COOLDOWN_WEEKS;
use screening_core::scoring::ScoreThresholds;
use screening_core::selector::StratumTargets;
use screening_core::traits::{AssessmentStore, NoopNotifier, Notifier};
use screening_store::{FileStore, MemoryStore};

use crate::email::EmailNotifier;
use crate::log::LogNotifier;

/// Environment variable that overrides the email API key.
pub const EMAIL_API_KEY_ENV: &str = "SCREENING_EMAIL_API_KEY";

/// Where results, events and the catalog live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local store, optionally seeded from a bank file.
    Memory {
        #[serde(default)]
        bank: Option<PathBuf>,
    },
    /// Directory with `questions.toml` and JSON-lines logs.
    File {
        #[serde(default = "default_store_dir")]
        dir: PathBuf,
    },
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./screening-data")
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            dir: default_store_dir(),
        }
    }
}

/// How candidates are told about their result.
///
/// Note: Custom Debug impl masks the API key to keep it out of logs.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotifierConfig {
    #[default]
    Log,
    Email {
        api_key: String,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    Disabled,
}

impl std::fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotifierConfig::Log => f.write_str("Log"),
            NotifierConfig::Email {
                api_key: _,
                from,
                base_url,
            } => f
                .debug_struct("Email")
                .field("api_key", &"***")
                .field("from", from)
                .field("base_url", base_url)
                .finish(),
            NotifierConfig::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Degraded-path strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FallbackConfig {
    Synthetic {
        #[serde(default = "default_min_score")]
        min_score: u8,
        #[serde(default = "default_max_score")]
        max_score: u8,
    },
    Bank {
        path: PathBuf,
        #[serde(default = "default_min_score")]
        min_score: u8,
        #[serde(default = "default_max_score")]
        max_score: u8,
    },
}

fn default_min_score() -> u8 {
    MockScoreRange::default().min
}
fn default_max_score() -> u8 {
    MockScoreRange::default().max
}

impl Default for FallbackConfig {
    fn default() -> Self {
        FallbackConfig::Synthetic {
            min_score: default_min_score(),
            max_score: default_max_score(),
        }
    }
}

impl FallbackConfig {
    pub fn scores(&self) -> MockScoreRange {
        match self {
            FallbackConfig::Synthetic {
                min_score,
                max_score,
            }
            | FallbackConfig::Bank {
                min_score,
                max_score,
                ..
            } => MockScoreRange {
                min: *min_score,
                max: *max_score,
            },
        }
    }
}

/// Top-level screening configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Pass/reject thresholds.
    #[serde(default)]
    pub scoring: ScoreThresholds,
    /// Questions per difficulty stratum.
    #[serde(default)]
    pub selection: StratumTargets,
    /// Lock period after a reject, in days.
    #[serde(default = "default_cooldown_days")]
    pub reapply_cooldown_days: i64,
    /// Bound on a single store call, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_cooldown_days() -> i64 {
    REAPPLY_COOLDOWN_WEEKS * 7
}
fn default_store_timeout_ms() -> u64 {
    5000
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            notifier: NotifierConfig::default(),
            fallback: FallbackConfig::default(),
            scoring: ScoreThresholds::default(),
            selection: StratumTargets::default(),
            reapply_cooldown_days: default_cooldown_days(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl ScreeningConfig {
    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            targets: self.selection,
            thresholds: self.scoring,
            reapply_cooldown: chrono::Duration::days(self.reapply_cooldown_days),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

fn resolve(config: &mut ScreeningConfig) {
    match &mut config.store {
        StoreConfig::Memory { bank } => *bank = bank.as_deref().map(resolve_path),
        StoreConfig::File { dir } => *dir = resolve_path(dir),
    }
    if let NotifierConfig::Email {
        api_key,
        from,
        base_url,
    } = &mut config.notifier
    {
        *api_key = resolve_env_vars(api_key);
        *from = from.as_deref().map(resolve_env_vars);
        *base_url = base_url.as_deref().map(resolve_env_vars);
    }
    if let FallbackConfig::Bank { path, .. } = &mut config.fallback {
        *path = resolve_path(path);
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `screening.toml` in the current directory
/// 2. `~/.config/screening/config.toml`
///
/// `SCREENING_EMAIL_API_KEY` overrides the key of an email notifier.
pub fn load_config() -> Result<ScreeningConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ScreeningConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("screening.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ScreeningConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ScreeningConfig::default(),
    };

    resolve(&mut config);

    if let Ok(key) = std::env::var(EMAIL_API_KEY_ENV) {
        if let NotifierConfig::Email { api_key, .. } = &mut config.notifier {
            *api_key = key;
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("screening"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn AssessmentStore>> {
    match config {
        StoreConfig::Memory { bank } => {
            let questions = match bank {
                Some(path) => parse_bank(path)?.questions,
                None => Vec::new(),
            };
            Ok(Arc::new(MemoryStore::new(questions)))
        }
        StoreConfig::File { dir } => Ok(Arc::new(FileStore::open(dir)?)),
    }
}

/// Create a notifier instance from its configuration.
pub fn create_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match config {
        NotifierConfig::Log => Ok(Arc::new(LogNotifier)),
        NotifierConfig::Email {
            api_key,
            from,
            base_url,
        } => {
            if api_key.is_empty() {
                anyhow::bail!("email notifier needs an api_key (or {EMAIL_API_KEY_ENV})");
            }
            Ok(Arc::new(EmailNotifier::new(
                api_key,
                from.clone(),
                base_url.clone(),
            )?))
        }
        NotifierConfig::Disabled => Ok(Arc::new(NoopNotifier)),
    }
}

/// Create the fallback strategy from its configuration.
pub fn create_fallback(config: &FallbackConfig) -> Result<Arc<dyn FallbackProvider>> {
    match config {
        FallbackConfig::Synthetic { .. } => Ok(Arc::new(SyntheticFallback::new(config.scores()))),
        FallbackConfig::Bank { path, .. } => {
            Ok(Arc::new(BankFallback::load(path, config.scores())?))
        }
    }
}

/// Wire a complete engine from configuration.
pub fn build_engine(config: &ScreeningConfig) -> Result<AssessmentEngine> {
    let store = create_store(&config.store)?;
    let notifier = create_notifier(&config.notifier)?;
    let fallback = create_fallback(&config.fallback)?;
    tracing::debug!(
        "engine: store={}, notifier={}, fallback={}",
        store.name(),
        notifier.name(),
        fallback.name()
    );
    Ok(AssessmentEngine::new(
        store,
        notifier,
        fallback,
        config.engine_config(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SCREENING_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SCREENING_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SCREENING_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_SCREENING_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = ScreeningConfig::default();
        assert_eq!(config.reapply_cooldown_days, 42);
        assert_eq!(config.store_timeout_ms, 5000);
        assert_eq!(config.notifier, NotifierConfig::Log);
        assert_eq!(config.selection.total(), 10);

        let engine = config.engine_config();
        assert_eq!(engine.reapply_cooldown, chrono::Duration::weeks(6));
        assert_eq!(engine.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
reapply_cooldown_days = 30
store_timeout_ms = 250

[store]
type = "file"
dir = "/var/lib/screening"

[notifier]
type = "email"
api_key = "re-test"
from = "Hiring <hr@example.com>"

[fallback]
type = "bank"
path = "fallback.toml"
min_score = 50

[scoring]
pass_at = 75

[selection]
easy = 5
"#;
        let config: ScreeningConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store,
            StoreConfig::File {
                dir: PathBuf::from("/var/lib/screening")
            }
        );
        assert!(matches!(config.notifier, NotifierConfig::Email { .. }));
        assert_eq!(config.fallback.scores(), MockScoreRange { min: 50, max: 85 });
        assert_eq!(config.scoring.pass_at, 75);
        assert_eq!(config.scoring.reject_at, 40);
        assert_eq!(config.selection.easy, 5);
        assert_eq!(config.selection.hard, 3);
        assert_eq!(config.engine_config().store_timeout, Duration::from_millis(250));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = NotifierConfig::Email {
            api_key: "re-secret".into(),
            from: None,
            base_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("re-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn load_from_explicit_path_resolves_env() {
        std::env::set_var("_SCREENING_TEST_KEY", "re-from-env");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screening.toml");
        std::fs::write(
            &path,
            r#"
[notifier]
type = "email"
api_key = "${_SCREENING_TEST_KEY}"
"#,
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        match config.notifier {
            NotifierConfig::Email { api_key, .. } => {
                assert!(api_key == "re-from-env" || std::env::var(EMAIL_API_KEY_ENV).is_ok())
            }
            other => panic!("expected email notifier, got {other:?}"),
        }
        std::env::remove_var("_SCREENING_TEST_KEY");
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/screening.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn email_without_key_is_rejected() {
        let config = NotifierConfig::Email {
            api_key: String::new(),
            from: None,
            base_url: None,
        };
        assert!(create_notifier(&config).is_err());
        assert_eq!(create_notifier(&NotifierConfig::Disabled).unwrap().name(), "noop");
    }

    #[tokio::test]
    async fn memory_store_from_bank() {
        let dir = tempfile::tempdir().unwrap();
        let bank = dir.path().join("bank.toml");
        std::fs::write(
            &bank,
            r#"
[bank]
id = "b"
name = "B"

[[questions]]
id = 1
category = "reasoning"
difficulty = "hard"
prompt = "?"
correct = "A"

[questions.options]
A = "yes"
B = "no"
"#,
        )
        .unwrap();

        let store = create_store(&StoreConfig::Memory { bank: Some(bank) }).unwrap();
        assert_eq!(store.name(), "memory");
        assert_eq!(store.list_questions().await.unwrap().len(), 1);
    }

    #[test]
    fn engine_builds_from_memory_config() {
        let config = ScreeningConfig {
            store: StoreConfig::Memory { bank: None },
            ..Default::default()
        };
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.config().targets, StratumTargets::default());
    }
}
