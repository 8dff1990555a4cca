//! Status breakdown and run history reporting.

fn format_time(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map_or_else(|| "-".to_owned(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// Print either the overall status breakdown plus recent runs, or the
/// per-shop results of one run.
///
/// # Errors
///
/// Returns an error if a reporting query fails.
pub(crate) async fn run_report(pool: &sqlx::PgPool, run: Option<i64>) -> anyhow::Result<()> {
    if let Some(run_id) = run {
        let rows = shopintel_db::list_collection_run_shops(pool, run_id).await?;
        if rows.is_empty() {
            println!("no per-shop results recorded for run {run_id}");
            return Ok(());
        }
        println!("{:>8}  {:<10}  {:>7}  {}", "shop_id", "status", "metrics", "error");
        for row in rows {
            println!(
                "{:>8}  {:<10}  {:>7}  {}",
                row.shop_id,
                row.status,
                row.records_processed,
                row.error_message.as_deref().unwrap_or("-")
            );
        }
        return Ok(());
    }

    let counts = shopintel_db::count_shops_by_status(pool).await?;
    println!("shops by scraping status:");
    for count in &counts {
        println!("  {:<10}  {}", count.scraping_status, count.shops);
    }

    let runs = shopintel_db::list_collection_runs(pool, 10).await?;
    if runs.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:>5}  {:<10}  {:<10}  {:>7}  {:<17}  {}",
        "run", "type", "status", "metrics", "started", "error"
    );
    for run in runs {
        println!(
            "{:>5}  {:<10}  {:<10}  {:>7}  {:<17}  {}",
            run.id,
            run.run_type,
            run.status,
            run.records_processed,
            format_time(run.started_at),
            run.error_message.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_time_renders_minute_precision() {
        let ts = chrono::Utc.with_ymd_and_hms(2026, 8, 5, 14, 30, 9).unwrap();
        assert_eq!(format_time(Some(ts)), "2026-08-05 14:30");
    }

    #[test]
    fn format_time_renders_dash_for_absent() {
        assert_eq!(format_time(None), "-");
    }
}
