use std::path::{Path, PathBuf};

/// Runtime settings for a `mallcat` invocation, read from the environment.
///
/// Per-mall selector tables are not part of this struct; they live in the
/// YAML file at [`AppConfig::malls_path`] and are loaded with
/// [`crate::load_malls`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub malls_path: PathBuf,
    /// Shared catalog (`products.json`) that registration merges into.
    pub catalog_path: PathBuf,
    /// Directory for raw scrape output, summaries, and HTML snapshots.
    pub output_dir: PathBuf,
    /// Where `products-backup-<epoch-ms>.json` files go. `None` means the
    /// directory containing the catalog.
    pub backup_dir: Option<PathBuf>,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_inter_request_delay_ms: u64,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_ms: u64,
    /// Number of sample records included in run summaries.
    pub summary_sample_size: usize,
}

impl AppConfig {
    /// Resolved backup directory: the configured one, or the catalog's parent.
    #[must_use]
    pub fn resolved_backup_dir(&self) -> PathBuf {
        self.backup_dir.clone().unwrap_or_else(|| {
            self.catalog_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        })
    }
}
