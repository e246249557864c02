use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use wardrobe_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "database.url",
        &config.database.url,
        source("database.url", &["WARDROBE_DATABASE_URL"]),
    ));
    lines.push(render_line(
        "database.max_connections",
        &config.database.max_connections.to_string(),
        source("database.max_connections", &["WARDROBE_DATABASE_MAX_CONNECTIONS"]),
    ));
    lines.push(render_line(
        "database.timeout_secs",
        &config.database.timeout_secs.to_string(),
        source("database.timeout_secs", &["WARDROBE_DATABASE_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["WARDROBE_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["WARDROBE_SERVER_PORT"]),
    ));
    lines.push(render_line(
        "server.graceful_shutdown_secs",
        &config.server.graceful_shutdown_secs.to_string(),
        source("server.graceful_shutdown_secs", &["WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["WARDROBE_LOGGING_LEVEL", "WARDROBE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        config.logging.format.as_str(),
        source("logging.format", &["WARDROBE_LOGGING_FORMAT", "WARDROBE_LOG_FORMAT"]),
    ));

    lines.push(render_line(
        "lifecycle.default_wear_rate",
        &config.lifecycle.default_wear_rate.to_string(),
        source("lifecycle.default_wear_rate", &["WARDROBE_LIFECYCLE_DEFAULT_WEAR_RATE"]),
    ));
    lines.push(render_line(
        "lifecycle.time_damage_per_year",
        &config.lifecycle.time_damage_per_year.to_string(),
        source("lifecycle.time_damage_per_year", &["WARDROBE_LIFECYCLE_TIME_DAMAGE_PER_YEAR"]),
    ));
    lines.push(render_line(
        "lifecycle.maintenance_bonus_per_event",
        &config.lifecycle.maintenance_bonus_per_event.to_string(),
        source(
            "lifecycle.maintenance_bonus_per_event",
            &["WARDROBE_LIFECYCLE_MAINTENANCE_BONUS_PER_EVENT"],
        ),
    ));
    lines.push(render_line(
        "lifecycle.material_factors",
        &render_table(config.lifecycle.material_factors.iter()),
        source("lifecycle.material_factors", &[]),
    ));
    lines.push(render_line(
        "lifecycle.category_wear_rates",
        &render_table(config.lifecycle.category_wear_rates.iter()),
        source("lifecycle.category_wear_rates", &[]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wardrobe.toml"), PathBuf::from("config/wardrobe.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn render_table<'a>(entries: impl Iterator<Item = (&'a String, &'a f64)>) -> String {
    let rendered: Vec<String> = entries.map(|(key, value)| format!("{key}={value}")).collect();
    if rendered.is_empty() {
        "<built-in>".to_string()
    } else {
        format!("{{{}}}", rendered.join(", "))
    }
}
