//! Transactional catalog import from the shops YAML file.

use shopintel_core::ShopConfig;
use sqlx::PgPool;

use crate::shops::upsert_shop_on;
use crate::DbError;

/// Upsert shops from config into the database.
///
/// Returns the number of shops processed (inserted or back-filled).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_shops(pool: &PgPool, shops: &[ShopConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for shop in shops {
        upsert_shop_on(&mut *tx, shop).await?;
        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
