use crate::app_config::{AppConfig, Environment};
use crate::metrics::Metric;
use crate::status::DEFAULT_REQUIRED_METRICS;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let sem_dashboard_url = require("SHOPINTEL_SEM_DASHBOARD_URL")?;
    let trends_dashboard_url = require("SHOPINTEL_TRENDS_DASHBOARD_URL")?;

    let env = parse_environment(&or_default("SHOPINTEL_ENV", "development"))?;

    let log_level = or_default("SHOPINTEL_LOG_LEVEL", "info");
    let shops_path = PathBuf::from(or_default("SHOPINTEL_SHOPS_PATH", "./config/shops.yaml"));

    let db_max_connections = parse_u32("SHOPINTEL_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SHOPINTEL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SHOPINTEL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let webdriver_url = or_default("SHOPINTEL_WEBDRIVER_URL", "http://127.0.0.1:4444");
    let browser_nav_timeout_secs = parse_u64("SHOPINTEL_BROWSER_NAV_TIMEOUT_SECS", "30")?;
    let max_concurrent_shops = parse_usize("SHOPINTEL_MAX_CONCURRENT_SHOPS", "1")?;
    let inter_shop_delay_ms = parse_u64("SHOPINTEL_INTER_SHOP_DELAY_MS", "500")?;

    let required_metrics = parse_required_metrics(lookup("SHOPINTEL_REQUIRED_METRICS").ok())?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        shops_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        webdriver_url,
        sem_dashboard_url,
        trends_dashboard_url,
        browser_nav_timeout_secs,
        max_concurrent_shops,
        inter_shop_delay_ms,
        required_metrics,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHOPINTEL_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parses the comma-separated required-metric override, falling back to
/// [`DEFAULT_REQUIRED_METRICS`] when unset. An empty override is rejected:
/// it would make every shop `completed` on sight.
fn parse_required_metrics(raw: Option<String>) -> Result<Vec<Metric>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_REQUIRED_METRICS.to_vec());
    };

    let metrics = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            name.parse::<Metric>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "SHOPINTEL_REQUIRED_METRICS".to_string(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if metrics.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHOPINTEL_REQUIRED_METRICS".to_string(),
            reason: "required metric set must not be empty".to_string(),
        });
    }

    Ok(metrics)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
