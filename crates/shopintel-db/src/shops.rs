//! Database operations for the `shops` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use shopintel_core::ShopConfig;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `shops` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShopRow {
    pub id: i64,
    pub public_id: Uuid,
    pub shop_name: String,
    /// Normalized domain; unique.
    pub shop_url: String,
    pub category: Option<String>,
    pub monthly_visits: Option<f64>,
    pub monthly_revenue: Option<String>,
    pub product_count: Option<i32>,
    pub year_founded: Option<i32>,
    pub project_tag: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns a single shop by its normalized domain, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_shop_by_domain(pool: &PgPool, domain: &str) -> Result<Option<ShopRow>, DbError> {
    let row = sqlx::query_as::<_, ShopRow>(
        "SELECT id, public_id, shop_name, shop_url, category, monthly_visits, \
                monthly_revenue, product_count, year_founded, project_tag, \
                created_at, updated_at \
         FROM shops \
         WHERE shop_url = $1",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all tracked shops, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_shops(pool: &PgPool) -> Result<Vec<ShopRow>, DbError> {
    let rows = sqlx::query_as::<_, ShopRow>(
        "SELECT id, public_id, shop_name, shop_url, category, monthly_visits, \
                monthly_revenue, product_count, year_founded, project_tag, \
                created_at, updated_at \
         FROM shops \
         ORDER BY shop_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns shops whose analytics snapshot is absent or not yet `completed`,
/// ordered by name. These are the candidates for a reconciliation pass;
/// `failed` shops are included since failure is retryable.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_shops_needing_reconcile(pool: &PgPool) -> Result<Vec<ShopRow>, DbError> {
    let rows = sqlx::query_as::<_, ShopRow>(
        "SELECT s.id, s.public_id, s.shop_name, s.shop_url, s.category, s.monthly_visits, \
                s.monthly_revenue, s.product_count, s.year_founded, s.project_tag, \
                s.created_at, s.updated_at \
         FROM shops s \
         LEFT JOIN shop_analytics a ON a.shop_id = s.id \
         WHERE a.id IS NULL OR a.scraping_status <> 'completed' \
         ORDER BY s.shop_name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a shop or back-fills an existing one, keyed on the normalized
/// domain. Returns the full row.
///
/// Descriptive attributes are never overwritten once stored: on conflict,
/// each column keeps its existing non-null value and only absorbs the new
/// one where the existing is null (or empty, for the name).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_shop(pool: &PgPool, shop: &ShopConfig) -> Result<ShopRow, DbError> {
    upsert_shop_on(pool, shop).await
}

pub(crate) async fn upsert_shop_on<'e, E>(
    executor: E,
    shop: &ShopConfig,
) -> Result<ShopRow, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let public_id = Uuid::new_v4();
    let domain = shop.domain();

    let row = sqlx::query_as::<_, ShopRow>(
        "INSERT INTO shops \
           (public_id, shop_name, shop_url, category, monthly_visits, monthly_revenue, \
            product_count, year_founded, project_tag) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (shop_url) DO UPDATE SET \
             shop_name       = CASE WHEN shops.shop_name = '' THEN EXCLUDED.shop_name \
                                    ELSE shops.shop_name END, \
             category        = COALESCE(shops.category, EXCLUDED.category), \
             monthly_visits  = COALESCE(shops.monthly_visits, EXCLUDED.monthly_visits), \
             monthly_revenue = COALESCE(shops.monthly_revenue, EXCLUDED.monthly_revenue), \
             product_count   = COALESCE(shops.product_count, EXCLUDED.product_count), \
             year_founded    = COALESCE(shops.year_founded, EXCLUDED.year_founded), \
             project_tag     = COALESCE(shops.project_tag, EXCLUDED.project_tag), \
             updated_at      = NOW() \
         RETURNING id, public_id, shop_name, shop_url, category, monthly_visits, \
                   monthly_revenue, product_count, year_founded, project_tag, \
                   created_at, updated_at",
    )
    .bind(public_id)
    .bind(&shop.name)
    .bind(&domain)
    .bind(&shop.category)
    .bind(shop.monthly_visits)
    .bind(&shop.monthly_revenue)
    .bind(shop.product_count)
    .bind(shop.year_founded)
    .bind(&shop.project_tag)
    .fetch_one(executor)
    .await?;

    Ok(row)
}
