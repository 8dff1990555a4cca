use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod gaps;
pub mod metrics;
pub mod record;
pub mod shops;
pub mod status;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use gaps::compute_gaps;
pub use metrics::{Metric, MetricFamily, MetricValue};
pub use record::AnalyticsRecord;
pub use shops::{load_shops, normalize_domain, ShopConfig, ShopsFile};
pub use status::{derive_status, ScrapingStatus, DEFAULT_REQUIRED_METRICS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read shops file {path}: {source}")]
    ShopsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse shops file: {0}")]
    ShopsFileParse(#[from] serde_yaml::Error),

    #[error("invalid shops config: {0}")]
    Validation(String),
}
