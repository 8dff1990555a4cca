use std::path::PathBuf;

use crate::metrics::Metric;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub shops_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// WebDriver endpoint the browser sessions are created against.
    pub webdriver_url: String,
    /// SEM analytics dashboard origin, e.g. `https://sem.example`.
    pub sem_dashboard_url: String,
    /// Trend-discovery dashboard origin (live-ads chart, pixel panel).
    pub trends_dashboard_url: String,
    pub browser_nav_timeout_secs: u64,
    /// Worker pool size for batch reconciliation; one browser session each.
    pub max_concurrent_shops: usize,
    /// Politeness delay between shops within one worker.
    pub inter_shop_delay_ms: u64,
    /// Metrics that gate `completed` status. Defaults to
    /// [`crate::status::DEFAULT_REQUIRED_METRICS`].
    pub required_metrics: Vec<Metric>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("shops_path", &self.shops_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("webdriver_url", &self.webdriver_url)
            .field("sem_dashboard_url", &self.sem_dashboard_url)
            .field("trends_dashboard_url", &self.trends_dashboard_url)
            .field("browser_nav_timeout_secs", &self.browser_nav_timeout_secs)
            .field("max_concurrent_shops", &self.max_concurrent_shops)
            .field("inter_shop_delay_ms", &self.inter_shop_delay_ms)
            .field("required_metrics", &self.required_metrics)
            .finish()
    }
}
