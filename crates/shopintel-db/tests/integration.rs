//! Offline unit tests for shopintel-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use shopintel_core::{AppConfig, Environment, ScrapingStatus, DEFAULT_REQUIRED_METRICS};
use shopintel_db::{AnalyticsRow, CollectionRunRow, PoolConfig, ShopRow};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        shops_path: PathBuf::from("./config/shops.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        webdriver_url: "http://127.0.0.1:4444".to_string(),
        sem_dashboard_url: "https://sem.dashboard.test".to_string(),
        trends_dashboard_url: "https://trends.dashboard.test".to_string(),
        browser_nav_timeout_secs: 30,
        max_concurrent_shops: 2,
        inter_shop_delay_ms: 500,
        required_metrics: DEFAULT_REQUIRED_METRICS.to_vec(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`CollectionRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn collection_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = CollectionRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        run_type: "reconcile".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.run_type, "reconcile");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
}

/// Compile-time smoke test for [`ShopRow`].
#[test]
fn shop_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ShopRow {
        id: 42_i64,
        public_id: Uuid::new_v4(),
        shop_name: "Glow Gadgets".to_string(),
        shop_url: "glowgadgets.com".to_string(),
        category: Some("Home & Garden".to_string()),
        monthly_visits: Some(120_000.0),
        monthly_revenue: Some("$50k-$100k".to_string()),
        product_count: Some(230),
        year_founded: Some(2019),
        project_tag: Some("spring-batch".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.shop_url, "glowgadgets.com");
    assert_eq!(row.product_count, Some(230));
}

#[test]
fn analytics_row_status_parses_known_values() {
    use chrono::Utc;

    let row = AnalyticsRow {
        id: 1,
        shop_id: 42,
        organic_traffic: Some(5000.0),
        paid_search_traffic: None,
        bounce_rate: None,
        avg_visit_duration: None,
        conversion_rate: None,
        cpc: None,
        branded_traffic: None,
        percent_branded_traffic: None,
        market_us: None,
        market_uk: None,
        market_de: None,
        market_ca: None,
        market_au: None,
        market_fr: None,
        ads_delta_7d: None,
        ads_delta_30d: None,
        ads_pixel: None,
        unavailable: serde_json::json!({}),
        scraping_status: "partial".to_string(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.status(), ScrapingStatus::Partial);
}
