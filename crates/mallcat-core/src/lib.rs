pub mod app_config;
pub mod config;
pub mod malls;
pub mod products;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use malls::{
    load_malls, CategoryPage, MallConfig, MallsFile, PaginationConfig, PriceConvention,
    SelectorConfig,
};
pub use products::{normalize_name, MallRef, ProductRecord};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read malls file {path}: {source}")]
    MallsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse malls file: {0}")]
    MallsFileParse(#[from] serde_yaml::Error),

    #[error("invalid malls config: {0}")]
    Validation(String),
}
