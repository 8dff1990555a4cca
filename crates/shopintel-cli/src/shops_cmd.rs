//! Catalog commands: seed from YAML, list tracked shops.

use std::path::PathBuf;

use shopintel_core::AppConfig;

/// Validate the shops file and upsert its entries.
///
/// Existing shops are back-filled, never overwritten (the database layer
/// keeps stored descriptive values).
///
/// # Errors
///
/// Returns an error if the file is invalid or the transactional seed fails.
pub(crate) async fn run_shops_seed(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(|| config.shops_path.clone());
    let shops_file = shopintel_core::load_shops(&path)?;

    let count = shopintel_db::seed_shops(pool, &shops_file.shops).await?;
    println!("seeded {count} shops from {}", path.display());
    Ok(())
}

/// Print all tracked shops.
///
/// # Errors
///
/// Returns an error if the listing query fails.
pub(crate) async fn run_shops_list(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let shops = shopintel_db::list_shops(pool).await?;
    if shops.is_empty() {
        println!("no shops tracked; run `shopintel shops seed` first");
        return Ok(());
    }

    println!("{:>5}  {:<32}  {:<28}  {}", "id", "domain", "name", "category");
    for shop in &shops {
        println!(
            "{:>5}  {:<32}  {:<28}  {}",
            shop.id,
            shop.shop_url,
            shop.shop_name,
            shop.category.as_deref().unwrap_or("-")
        );
    }
    println!("{} shops total", shops.len());
    Ok(())
}
