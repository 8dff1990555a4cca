//! Database operations for the `shop_analytics` table, including the
//! three-state metric encoding.
//!
//! Each metric column is `DOUBLE PRECISION NULL`; the companion `unavailable`
//! JSONB object maps metric names to diagnostic reasons. Together they encode
//! [`MetricValue`] losslessly:
//!
//! - column non-`NULL`                      → `Present`
//! - column `NULL`, name in `unavailable`   → `Unavailable(reason)`
//! - column `NULL`, name absent             → `NotAttempted`
//!
//! This module is the only place that mapping exists; business logic never
//! sees raw columns or sentinel strings.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopintel_core::{AnalyticsRecord, Metric, MetricValue, ScrapingStatus};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type and codec
// ---------------------------------------------------------------------------

/// A row from the `shop_analytics` table, metric columns raw.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyticsRow {
    pub id: i64,
    pub shop_id: i64,
    pub organic_traffic: Option<f64>,
    pub paid_search_traffic: Option<f64>,
    pub bounce_rate: Option<f64>,
    pub avg_visit_duration: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub cpc: Option<f64>,
    pub branded_traffic: Option<f64>,
    pub percent_branded_traffic: Option<f64>,
    pub market_us: Option<f64>,
    pub market_uk: Option<f64>,
    pub market_de: Option<f64>,
    pub market_ca: Option<f64>,
    pub market_au: Option<f64>,
    pub market_fr: Option<f64>,
    pub ads_delta_7d: Option<f64>,
    pub ads_delta_30d: Option<f64>,
    pub ads_pixel: Option<f64>,
    pub unavailable: serde_json::Value,
    pub scraping_status: String,
    pub updated_at: DateTime<Utc>,
}

impl AnalyticsRow {
    fn column(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::OrganicTraffic => self.organic_traffic,
            Metric::PaidSearchTraffic => self.paid_search_traffic,
            Metric::BounceRate => self.bounce_rate,
            Metric::AvgVisitDuration => self.avg_visit_duration,
            Metric::ConversionRate => self.conversion_rate,
            Metric::Cpc => self.cpc,
            Metric::BrandedTraffic => self.branded_traffic,
            Metric::PercentBrandedTraffic => self.percent_branded_traffic,
            Metric::MarketUs => self.market_us,
            Metric::MarketUk => self.market_uk,
            Metric::MarketDe => self.market_de,
            Metric::MarketCa => self.market_ca,
            Metric::MarketAu => self.market_au,
            Metric::MarketFr => self.market_fr,
            Metric::AdsDelta7d => self.ads_delta_7d,
            Metric::AdsDelta30d => self.ads_delta_30d,
            Metric::AdsPixel => self.ads_pixel,
        }
    }

    /// Decodes the raw columns back into the tagged-union record.
    #[must_use]
    pub fn decode(&self) -> AnalyticsRecord {
        let mut record = AnalyticsRecord::empty();
        for metric in Metric::ALL {
            let value = match self.column(metric) {
                Some(v) => MetricValue::Present(v),
                None => match self
                    .unavailable
                    .get(metric.as_str())
                    .and_then(serde_json::Value::as_str)
                {
                    Some(reason) => MetricValue::Unavailable(reason.to_owned()),
                    None => MetricValue::NotAttempted,
                },
            };
            record.set(metric, value);
        }
        record
    }

    /// Parses `scraping_status`, defaulting unknown legacy values to `pending`
    /// so they are revisited rather than dropped.
    #[must_use]
    pub fn status(&self) -> ScrapingStatus {
        self.scraping_status
            .parse()
            .unwrap_or(ScrapingStatus::Pending)
    }
}

/// Builds the `unavailable` JSONB object for a record: metric name →
/// diagnostic reason, for exactly the fields in the `Unavailable` state.
fn encode_unavailable(record: &AnalyticsRecord) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = record
        .iter()
        .filter_map(|(metric, value)| {
            value
                .unavailable_reason()
                .map(|reason| (metric.as_str().to_owned(), serde_json::Value::from(reason)))
        })
        .collect();
    serde_json::Value::Object(map)
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Fetches the analytics row for a shop, or `None` if no extractor has ever
/// written one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_analytics(pool: &PgPool, shop_id: i64) -> Result<Option<AnalyticsRow>, DbError> {
    let row = sqlx::query_as::<_, AnalyticsRow>(
        "SELECT id, shop_id, organic_traffic, paid_search_traffic, bounce_rate, \
                avg_visit_duration, conversion_rate, cpc, branded_traffic, \
                percent_branded_traffic, market_us, market_uk, market_de, market_ca, \
                market_au, market_fr, ads_delta_7d, ads_delta_30d, ads_pixel, \
                unavailable, scraping_status, updated_at \
         FROM shop_analytics \
         WHERE shop_id = $1",
    )
    .bind(shop_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Writes the merged record and its derived status in a single upsert keyed
/// on `shop_id`, so readers never observe a half-merged snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_analytics(
    pool: &PgPool,
    shop_id: i64,
    record: &AnalyticsRecord,
    status: ScrapingStatus,
) -> Result<(), DbError> {
    let unavailable = encode_unavailable(record);

    sqlx::query(
        "INSERT INTO shop_analytics \
           (shop_id, organic_traffic, paid_search_traffic, bounce_rate, avg_visit_duration, \
            conversion_rate, cpc, branded_traffic, percent_branded_traffic, market_us, \
            market_uk, market_de, market_ca, market_au, market_fr, ads_delta_7d, \
            ads_delta_30d, ads_pixel, unavailable, scraping_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20) \
         ON CONFLICT (shop_id) DO UPDATE SET \
             organic_traffic         = EXCLUDED.organic_traffic, \
             paid_search_traffic     = EXCLUDED.paid_search_traffic, \
             bounce_rate             = EXCLUDED.bounce_rate, \
             avg_visit_duration      = EXCLUDED.avg_visit_duration, \
             conversion_rate         = EXCLUDED.conversion_rate, \
             cpc                     = EXCLUDED.cpc, \
             branded_traffic         = EXCLUDED.branded_traffic, \
             percent_branded_traffic = EXCLUDED.percent_branded_traffic, \
             market_us               = EXCLUDED.market_us, \
             market_uk               = EXCLUDED.market_uk, \
             market_de               = EXCLUDED.market_de, \
             market_ca               = EXCLUDED.market_ca, \
             market_au               = EXCLUDED.market_au, \
             market_fr               = EXCLUDED.market_fr, \
             ads_delta_7d            = EXCLUDED.ads_delta_7d, \
             ads_delta_30d           = EXCLUDED.ads_delta_30d, \
             ads_pixel               = EXCLUDED.ads_pixel, \
             unavailable             = EXCLUDED.unavailable, \
             scraping_status         = EXCLUDED.scraping_status, \
             updated_at              = NOW()",
    )
    .bind(shop_id)
    .bind(record.organic_traffic.value())
    .bind(record.paid_search_traffic.value())
    .bind(record.bounce_rate.value())
    .bind(record.avg_visit_duration.value())
    .bind(record.conversion_rate.value())
    .bind(record.cpc.value())
    .bind(record.branded_traffic.value())
    .bind(record.percent_branded_traffic.value())
    .bind(record.market_us.value())
    .bind(record.market_uk.value())
    .bind(record.market_de.value())
    .bind(record.market_ca.value())
    .bind(record.market_au.value())
    .bind(record.market_fr.value())
    .bind(record.ads_delta_7d.value())
    .bind(record.ads_delta_30d.value())
    .bind(record.ads_pixel.value())
    .bind(unavailable)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Per-status shop counts for the `report` command.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCount {
    pub scraping_status: String,
    pub shops: i64,
}

/// Returns the number of shops in each scraping status. Shops with no
/// analytics row yet are reported under `pending`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_shops_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, DbError> {
    let rows = sqlx::query_as::<_, StatusCount>(
        "SELECT COALESCE(a.scraping_status, 'pending') AS scraping_status, \
                COUNT(*) AS shops \
         FROM shops s \
         LEFT JOIN shop_analytics a ON a.shop_id = s.id \
         GROUP BY COALESCE(a.scraping_status, 'pending') \
         ORDER BY scraping_status",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
