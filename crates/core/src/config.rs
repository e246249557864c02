use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::tables::{DEFAULT_TIME_DAMAGE_PER_YEAR, DEFAULT_WEAR_RATE};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub lifecycle: LifecycleConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Scoring knobs fed into `DurabilityTables`. Maps are keyed by material name and category id.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleConfig {
    pub default_wear_rate: f64,
    pub time_damage_per_year: f64,
    pub maintenance_bonus_per_event: f64,
    pub material_factors: BTreeMap<String, f64>,
    pub category_wear_rates: BTreeMap<String, f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://wardrobe.db".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_wear_rate: DEFAULT_WEAR_RATE,
            time_damage_per_year: DEFAULT_TIME_DAMAGE_PER_YEAR,
            maintenance_bonus_per_event: 0.0,
            material_factors: BTreeMap::new(),
            category_wear_rates: BTreeMap::new(),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("wardrobe.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(lifecycle) = patch.lifecycle {
            if let Some(rate) = lifecycle.default_wear_rate {
                self.lifecycle.default_wear_rate = rate;
            }
            if let Some(damage) = lifecycle.time_damage_per_year {
                self.lifecycle.time_damage_per_year = damage;
            }
            if let Some(bonus) = lifecycle.maintenance_bonus_per_event {
                self.lifecycle.maintenance_bonus_per_event = bonus;
            }
            if let Some(material_factors) = lifecycle.material_factors {
                self.lifecycle.material_factors.extend(material_factors);
            }
            if let Some(category_wear_rates) = lifecycle.category_wear_rates {
                self.lifecycle.category_wear_rates.extend(category_wear_rates);
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("WARDROBE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("WARDROBE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("WARDROBE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("WARDROBE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("WARDROBE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("WARDROBE_SERVER_PORT") {
            self.server.port = parse_u16("WARDROBE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("WARDROBE_LOGGING_LEVEL").or_else(|| read_env("WARDROBE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("WARDROBE_LOGGING_FORMAT").or_else(|| read_env("WARDROBE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("WARDROBE_LIFECYCLE_DEFAULT_WEAR_RATE") {
            self.lifecycle.default_wear_rate =
                parse_f64("WARDROBE_LIFECYCLE_DEFAULT_WEAR_RATE", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_LIFECYCLE_TIME_DAMAGE_PER_YEAR") {
            self.lifecycle.time_damage_per_year =
                parse_f64("WARDROBE_LIFECYCLE_TIME_DAMAGE_PER_YEAR", &value)?;
        }
        if let Some(value) = read_env("WARDROBE_LIFECYCLE_MAINTENANCE_BONUS_PER_EVENT") {
            self.lifecycle.maintenance_bonus_per_event =
                parse_f64("WARDROBE_LIFECYCLE_MAINTENANCE_BONUS_PER_EVENT", &value)?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        validate_lifecycle(&self.lifecycle)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("wardrobe.toml"), PathBuf::from("config/wardrobe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_lifecycle(lifecycle: &LifecycleConfig) -> Result<(), ConfigError> {
    let scalars = [
        ("lifecycle.default_wear_rate", lifecycle.default_wear_rate),
        ("lifecycle.time_damage_per_year", lifecycle.time_damage_per_year),
        ("lifecycle.maintenance_bonus_per_event", lifecycle.maintenance_bonus_per_event),
    ];
    for (key, value) in scalars {
        ensure_non_negative(key, value)?;
    }

    for (material, factor) in &lifecycle.material_factors {
        ensure_non_negative(&format!("lifecycle.material_factors.{material}"), *factor)?;
    }
    for (category_id, rate) in &lifecycle.category_wear_rates {
        ensure_non_negative(&format!("lifecycle.category_wear_rates.{category_id}"), *rate)?;
    }

    Ok(())
}

fn ensure_non_negative(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must be a finite, non-negative number")))
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    lifecycle: Option<LifecyclePatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct LifecyclePatch {
    default_wear_rate: Option<f64>,
    time_damage_per_year: Option<f64>,
    maintenance_bonus_per_event: Option<f64>,
    material_factors: Option<BTreeMap<String, f64>>,
    category_wear_rates: Option<BTreeMap<String, f64>>,
}
