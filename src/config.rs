use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::adapter::ColumnConvention;
use crate::store::remote::RemoteStoreSettings;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_SIMULATED_LATENCY_MS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Which record store serves a table
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StoreBackend {
    Remote,
    #[default]
    InMemory,
}

/// Record store configuration
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RecordStoreConfig {
    /// Backend used for every table not listed in `fallback_tables`
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the hosted record store (required for `remote`)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub public_key: Option<String>,

    /// Per-request timeout against the remote store (1s - 120s)
    #[serde(default = "default_store_timeout_secs")]
    #[validate(range(min = 1, max = 120))]
    pub request_timeout_secs: u64,

    /// Listing cap (1 - 100)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,

    /// Tables served by the in-memory store even when the backend is remote
    #[serde(default)]
    pub fallback_tables: Vec<String>,

    /// Artificial delay of the in-memory store, in milliseconds
    #[serde(default = "default_simulated_latency_ms")]
    #[validate(range(max = 10_000))]
    pub simulated_latency_ms: u64,

    /// Seed in-memory tables with demo records at startup
    #[serde(default = "default_true_bool")]
    pub seed_fallback: bool,

    /// Column naming convention per table, overriding the schema default
    #[serde(default)]
    pub conventions: HashMap<String, ColumnConvention>,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            base_url: None,
            project_id: None,
            public_key: None,
            request_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            fallback_tables: Vec::new(),
            simulated_latency_ms: DEFAULT_SIMULATED_LATENCY_MS,
            seed_fallback: true,
            conventions: HashMap::new(),
        }
    }
}

impl RecordStoreConfig {
    /// Backend serving `table`
    pub fn backend_for(&self, table: &str) -> StoreBackend {
        if self.fallback_tables.iter().any(|t| t == table) {
            StoreBackend::InMemory
        } else {
            self.backend
        }
    }

    pub fn convention_for(&self, table: &str) -> Option<ColumnConvention> {
        self.conventions.get(table).copied()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn remote_settings(&self) -> Option<RemoteStoreSettings> {
        let base_url = self.base_url.as_deref()?.trim();
        if base_url.is_empty() {
            return None;
        }
        Some(RemoteStoreSettings {
            base_url: base_url.to_string(),
            project_id: self.project_id.clone(),
            public_key: self.public_key.clone(),
            timeout: self.request_timeout(),
        })
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whole-request timeout applied by the HTTP layer (1s - 300s)
    #[serde(default = "default_http_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,

    /// CORS: comma-separated list of allowed origins; permissive when unset
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    #[validate]
    pub record_store: RecordStoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            environment: DEFAULT_ENV.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            request_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            cors_allowed_origins: None,
            record_store: RecordStoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Allowed CORS origins, trimmed and without empties
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Validates derive rules and the cross-field constraints.
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.validate_additional_constraints()
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let store = &self.record_store;

        if store.backend == StoreBackend::Remote {
            match store.base_url.as_deref().map(str::trim) {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(url) if !url.is_empty() => {
                    let mut err = ValidationError::new("record_store_base_url_scheme");
                    err.message = Some("record_store.base_url must start with http:// or https://".into());
                    errors.add("record_store_base_url", err);
                }
                _ => {
                    let mut err = ValidationError::new("record_store_base_url_required");
                    err.message = Some(
                        "Set APP__RECORD_STORE__BASE_URL when record_store.backend is remote".into(),
                    );
                    errors.add("record_store_base_url", err);
                }
            }
        }

        if self.is_production() && store.backend == StoreBackend::InMemory {
            let mut err = ValidationError::new("record_store_backend_in_memory");
            err.message =
                Some("The in-memory record store holds demo data and must not back production".into());
            errors.add("record_store_backend", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_true_bool() -> bool {
    true
}

fn default_store_timeout_secs() -> u64 {
    DEFAULT_STORE_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_simulated_latency_ms() -> u64 {
    DEFAULT_SIMULATED_LATENCY_MS
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("farmstead_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::new(filter_directive);
    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*, nested keys separated by `__`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// [`load_config`] with an explicit config directory.
pub fn load_config_from(dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            dir.display()
        );
    }

    let config = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(dir.join("default")).required(false))
        .add_source(File::from(dir.join(&run_env)).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("record_store.fallback_tables"),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate_all().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!(
        backend = %app_config.record_store.backend,
        fallback_tables = ?app_config.record_store.fallback_tables,
        "Configuration loaded successfully"
    );
    Ok(app_config)
}
