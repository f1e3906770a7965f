//! Daemon settings
//!
//! Sources, later wins: struct defaults, optional TOML file, `TRENDLINE_*`
//! environment variables (`__` separates nested keys, e.g.
//! `TRENDLINE_SCHEDULER__BATCH_SIZE=20`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use trendline_api_rpc::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use trendline_core::application::constants::{
    BASE_LANGUAGE, DEFAULT_LANGUAGES, GRACEFUL_SHUTDOWN_TIMEOUT,
};
use trendline_core::application::SchedulerConfig;
use trendline_infra_llm::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use trendline_infra_sqlite::StorageLayout;

const ENV_PREFIX: &str = "TRENDLINE";
const DEFAULT_DB_PATH: &str = "~/.trendline/trendline.db";
const DEFAULT_CONFIG_FILE: &str = "trendline.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    /// Trend analysis through the completion provider
    Provider,
    /// Local randomized synthesis, no provider calls
    Synthetic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Model used for trend analysis
    pub analysis_model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            analysis_model: "gpt-4".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub host: String,
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: 20,
            rate_limit_per_sec: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub mode: AnalyzerMode,
    pub batch_size: u32,
    pub refresh_period_days: u64,
    pub item_delay_ms: u64,
    pub idle_interval_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        let defaults = SchedulerConfig::default();
        Self {
            enabled: true,
            mode: AnalyzerMode::Provider,
            batch_size: defaults.batch_size,
            refresh_period_days: defaults.refresh_period.as_secs() / 86_400,
            item_delay_ms: defaults.item_delay.as_millis() as u64,
            idle_interval_secs: defaults.idle_interval.as_secs(),
            error_backoff_secs: defaults.error_backoff.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub layout: String,
    pub languages: Vec<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            layout: StorageLayout::Single.as_str().to_string(),
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub seed_path: Option<String>,
    pub log_format: LogFormat,
    pub log_dir: Option<String>,
    pub llm: LlmSettings,
    pub rpc: RpcSettings,
    pub scheduler: SchedulerSettings,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DB_PATH.to_string(),
            redis_url: None,
            seed_path: None,
            log_format: LogFormat::Pretty,
            log_dir: None,
            llm: LlmSettings::default(),
            rpc: RpcSettings::default(),
            scheduler: SchedulerSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `TRENDLINE_CONFIG` (or `./trendline.toml` when present) and the process environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(format!("{}_CONFIG", ENV_PREFIX))
            .ok()
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        let mut settings = Self::from_sources(file.as_deref(), None)?;
        if settings.llm.api_key.is_none() {
            settings.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        Ok(settings)
    }

    /// `env` replaces the process environment when given
    pub fn from_sources(file: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("storage.languages")
                .source(env),
        );

        let mut settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.llm.api_key = settings.llm.api_key.filter(|k| !k.trim().is_empty());
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        self.storage_layout()?;
        if self.scheduler.batch_size == 0 {
            anyhow::bail!("scheduler.batch_size must be at least 1");
        }
        if self.scheduler.refresh_period_days == 0 {
            anyhow::bail!("scheduler.refresh_period_days must be at least 1");
        }
        for language in &self.storage.languages {
            trendline_infra_sqlite::validate_language(language)
                .with_context(|| format!("storage.languages contains '{}'", language))?;
        }
        Ok(())
    }

    pub fn storage_layout(&self) -> Result<StorageLayout> {
        self.storage
            .layout
            .parse::<StorageLayout>()
            .context("Invalid storage.layout")
    }

    /// Tilde-expanded database location
    pub fn database_url(&self) -> String {
        shellexpand::tilde(&self.database_url).into_owned()
    }

    /// Provider mode needs a credential; without one the synthesizer runs
    pub fn effective_mode(&self) -> AnalyzerMode {
        match (self.scheduler.mode, &self.llm.api_key) {
            (AnalyzerMode::Provider, None) => AnalyzerMode::Synthetic,
            (mode, _) => mode,
        }
    }

    /// Upper bound for the refresh pass to reach a terminal status on shutdown.
    /// An in-flight item may still be waiting on one analysis call.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs) + GRACEFUL_SHUTDOWN_TIMEOUT
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let mut languages = self.storage.languages.clone();
        if !languages.iter().any(|l| l == BASE_LANGUAGE) {
            languages.insert(0, BASE_LANGUAGE.to_string());
        }

        SchedulerConfig {
            refresh_period: Duration::from_secs(self.scheduler.refresh_period_days * 86_400),
            batch_size: self.scheduler.batch_size,
            item_delay: Duration::from_millis(self.scheduler.item_delay_ms),
            idle_interval: Duration::from_secs(self.scheduler.idle_interval_secs),
            error_backoff: Duration::from_secs(self.scheduler.error_backoff_secs),
            languages,
        }
    }
}
