//! # Application Configuration
//!
//! Loads the CLI configuration in layers: programmatic defaults, an optional
//! `config.yml` whose `${VAR}` references are expanded from the environment, and
//! `SEO_AUDIT_...` environment overrides (nested keys use `__`, e.g.
//! `SEO_AUDIT_FETCH__TIMEOUT_SECS`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat, Value as ConfigValue};
use regex::Regex;
use seo_audit::{
    constants::{
        DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PREVIEW_CHARS, DEFAULT_USER_AGENT,
        DEFAULT_VALIDATION_ATTEMPTS, REPORTS_DIR,
    },
    providers::factory::ProviderConfig,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// The provider every stage uses unless configured otherwise.
pub const DEFAULT_PROVIDER_KEY: &str = "gemini_default";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    #[error("Configuration error: {0}")]
    General(String),
    /// Indicates a required configuration file was not found.
    #[error("{0}")]
    NotFound(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The strategy that turns fetched HTML into page signals.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Regex,
    Dom,
}

/// Settings for the single page fetch of the audit.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default)]
    pub extractor: ExtractorKind,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            preview_chars: default_preview_chars(),
            extractor: ExtractorKind::default(),
        }
    }
}

/// Which entry of `providers` each stage talks to.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StageProviders {
    #[serde(default = "default_provider_key")]
    pub page_auditor: String,
    #[serde(default = "default_provider_key")]
    pub serp_analyst: String,
    #[serde(default = "default_provider_key")]
    pub optimization_advisor: String,
}

impl Default for StageProviders {
    fn default() -> Self {
        Self {
            page_auditor: default_provider_key(),
            serp_analyst: default_provider_key(),
            optimization_advisor: default_provider_key(),
        }
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// The user audits run as; it also names the session.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default = "default_validation_attempts")]
    pub validation_attempts: usize,
    /// A map of named, reusable AI provider configurations.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub stages: StageProviders,
    /// The provider key used for grounded web search. Must be a Gemini provider.
    #[serde(default = "default_provider_key")]
    pub search: String,
}

impl AppConfig {
    /// The directory reports are written to. A relative `reports_dir` is taken
    /// relative to the directory holding the running executable.
    pub fn resolved_reports_dir(&self) -> PathBuf {
        let dir = Path::new(&self.reports_dir);
        if dir.is_absolute() {
            return dir.to_path_buf();
        }
        match env::current_exe() {
            Ok(exe) => exe
                .parent()
                .map(|parent| parent.join(dir))
                .unwrap_or_else(|| dir.to_path_buf()),
            Err(e) => {
                warn!(
                    "Cannot locate the executable ({e}); '{}' is relative to the working directory.",
                    self.reports_dir
                );
                dir.to_path_buf()
            }
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

fn default_provider_key() -> String {
    DEFAULT_PROVIDER_KEY.to_string()
}

fn default_reports_dir() -> String {
    REPORTS_DIR.to_string()
}

fn default_log_file() -> String {
    "seo-audit.log".to_string()
}

fn default_user_id() -> String {
    "demo_user".to_string()
}

fn default_validation_attempts() -> usize {
    DEFAULT_VALIDATION_ATTEMPTS
}

/// The Gemini key from the environment, accepting either common variable name.
fn gemini_api_key_from_env() -> Option<String> {
    ["GOOGLE_API_KEY", "GEMINI_API_KEY"]
        .into_iter()
        .filter_map(|name| env::var(name).ok())
        .find(|key| !key.is_empty())
}

/// The built-in `gemini_default` provider entry.
fn build_default_providers() -> HashMap<String, ConfigValue> {
    let mut gemini = HashMap::new();
    gemini.insert("provider".to_string(), ConfigValue::from("gemini"));
    gemini.insert("model_name".to_string(), ConfigValue::from(DEFAULT_MODEL));
    if let Some(key) = gemini_api_key_from_env() {
        gemini.insert("api_key".to_string(), ConfigValue::from(key));
    }

    let mut providers = HashMap::new();
    providers.insert(DEFAULT_PROVIDER_KEY.to_string(), ConfigValue::from(gemini));
    providers
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
pub fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration.
///
/// With `config_path_override` the file must exist. Otherwise `config.yml` next
/// to this crate's manifest is used when present, and defaults alone when not.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("providers", build_default_providers())?;

    // Layer 2: Config file (optional unless explicitly requested).
    let config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{}/config.yml", env!("CARGO_MANIFEST_DIR")),
    };
    match read_and_substitute(&config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => info!("No config file at '{config_path}'; using defaults."),
    }

    let settings = builder
        // Layer 3: Prefixed environment variables for overrides.
        .add_source(
            Environment::with_prefix("SEO_AUDIT")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
