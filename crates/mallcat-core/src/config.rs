use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Reads `MALLCAT_*` settings, loading a `.env` file first if one exists.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Reads `MALLCAT_*` settings from the process environment only.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Builds an [`AppConfig`] from a variable lookup; tests pass a map here.
///
/// Every setting has a default, so an empty environment yields a usable
/// config. Decoupled from the real environment so tests can pass a map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let log_level = or_default("MALLCAT_LOG_LEVEL", "info");
    let malls_path = PathBuf::from(or_default("MALLCAT_MALLS_PATH", "./config/malls.yaml"));
    let catalog_path = PathBuf::from(or_default(
        "MALLCAT_CATALOG_PATH",
        "./src/data/products.json",
    ));
    let output_dir = PathBuf::from(or_default("MALLCAT_OUTPUT_DIR", "./scripts/output"));
    let backup_dir = lookup("MALLCAT_BACKUP_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let scraper_request_timeout_secs = parse_u64("MALLCAT_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("MALLCAT_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms =
        parse_u64("MALLCAT_SCRAPER_INTER_REQUEST_DELAY_MS", "1000")?;
    let scraper_max_retries = parse_u32("MALLCAT_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_ms =
        parse_u64("MALLCAT_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;
    let summary_sample_size = parse_usize("MALLCAT_SUMMARY_SAMPLE_SIZE", "5")?;

    Ok(AppConfig {
        log_level,
        malls_path,
        catalog_path,
        output_dir,
        backup_dir,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        summary_sample_size,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
