//! Batch reconciliation: a bounded worker pool where every worker owns its
//! own browser session and drains a shared shop queue.
//!
//! Workers check the abort flag at the top of the per-shop loop, so
//! cancellation and batch aborts take effect between shops; extractions are
//! short and bounded by their own timeouts. A dead browser session aborts
//! the whole batch instead of marking shops failed one by one — a single
//! session problem must not mass-produce false `failed` statuses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use shopintel_core::{normalize_domain, AppConfig, Metric};
use shopintel_db::ShopRow;
use shopintel_scraper::{reconcile_record, ExtractorConfig, WebDriverSession};

use crate::fail_run_best_effort;

/// Everything a worker needs, cloned once per worker.
#[derive(Clone)]
struct WorkerContext {
    pool: sqlx::PgPool,
    extractor: ExtractorConfig,
    webdriver_url: String,
    nav_timeout_secs: u64,
    inter_shop_delay_ms: u64,
    required: Vec<Metric>,
    run_id: i64,
}

/// Aggregated result of one worker (and, merged, of the whole run).
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub metrics_filled: i64,
    /// First session-level failure observed, if any; aborts the batch.
    pub auth_failure: Option<String>,
}

impl RunSummary {
    fn merge(&mut self, other: RunSummary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.metrics_filled += other.metrics_filled;
        if self.auth_failure.is_none() {
            self.auth_failure = other.auth_failure;
        }
    }
}

/// Load the shops to process for a reconcile run.
///
/// If `domain_filter` is `Some`, fetches that single shop (by normalized
/// domain) and returns an error if not found. Otherwise returns all shops
/// whose snapshot is missing or not `completed`, truncated to `limit`.
async fn load_shops_for_reconcile(
    pool: &sqlx::PgPool,
    domain_filter: Option<&str>,
    limit: Option<usize>,
) -> anyhow::Result<Vec<ShopRow>> {
    if let Some(raw) = domain_filter {
        let domain = normalize_domain(raw);
        let shop = shopintel_db::get_shop_by_domain(pool, &domain)
            .await?
            .ok_or_else(|| anyhow::anyhow!("shop '{domain}' not found; seed the catalog first"))?;
        return Ok(vec![shop]);
    }

    let mut shops = shopintel_db::list_shops_needing_reconcile(pool).await?;
    if let Some(limit) = limit {
        shops.truncate(limit);
    }
    Ok(shops)
}

/// Run one reconciliation pass over the eligible shops.
///
/// # Errors
///
/// Returns an error if the run cannot be created, the batch is aborted by a
/// session-level failure, or every shop fails. Per-shop failures are logged
/// and recorded on the run, not propagated.
pub(crate) async fn run_reconcile(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    domain_filter: Option<&str>,
    dry_run: bool,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let shops = load_shops_for_reconcile(pool, domain_filter, limit).await?;
    if shops.is_empty() {
        println!("no shops need reconciliation; skipping run creation");
        return Ok(());
    }

    if dry_run {
        let domains: Vec<&str> = shops.iter().map(|s| s.shop_url.as_str()).collect();
        println!(
            "dry-run: would reconcile {} shops: [{}]",
            shops.len(),
            domains.join(", ")
        );
        return Ok(());
    }

    let run = shopintel_db::create_collection_run(pool, "reconcile", "cli").await?;
    if let Err(e) = shopintel_db::start_collection_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "reconcile", format!("{e:#}")).await;
        return Err(e.into());
    }

    let shop_count = shops.len();
    let worker_count = config.max_concurrent_shops.clamp(1, shop_count);
    let queue = Arc::new(Mutex::new(shops.into_iter().collect::<VecDeque<_>>()));
    let abort = Arc::new(AtomicBool::new(false));

    let abort_on_signal = Arc::clone(&abort);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; workers stop after their current shop");
            abort_on_signal.store(true, Ordering::SeqCst);
        }
    });

    let context = WorkerContext {
        pool: pool.clone(),
        extractor: ExtractorConfig::from_app_config(config),
        webdriver_url: config.webdriver_url.clone(),
        nav_timeout_secs: config.browser_nav_timeout_secs,
        inter_shop_delay_ms: config.inter_shop_delay_ms,
        required: config.required_metrics.clone(),
        run_id: run.id,
    };

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let context = context.clone();
        let queue = Arc::clone(&queue);
        let abort = Arc::clone(&abort);
        handles.push(tokio::spawn(worker_loop(worker_id, context, queue, abort)));
    }

    let mut summary = RunSummary::default();
    for handle in handles {
        match handle.await {
            Ok(worker_summary) => summary.merge(worker_summary),
            Err(e) => tracing::error!(error = %e, "reconcile worker panicked"),
        }
    }

    if let Some(reason) = &summary.auth_failure {
        let message = format!("batch aborted on session failure: {reason}");
        fail_run_best_effort(pool, run.id, "reconcile", message.clone()).await;
        anyhow::bail!("{message}");
    }

    let processed = summary.succeeded + summary.failed;
    if processed > 0 && summary.failed == processed {
        let message = format!("all {processed} shops failed reconciliation");
        fail_run_best_effort(pool, run.id, "reconcile", message.clone()).await;
        anyhow::bail!("{message}");
    }

    let total = i32::try_from(summary.metrics_filled).unwrap_or(i32::MAX);
    if let Err(err) = shopintel_db::complete_collection_run(pool, run.id, total).await {
        let message = format!("{err:#}");
        fail_run_best_effort(pool, run.id, "reconcile", message).await;
        return Err(err.into());
    }

    println!(
        "reconciled {} shops ({} failed) out of {shop_count}, filled {} metrics",
        summary.succeeded, summary.failed, summary.metrics_filled
    );
    Ok(())
}

/// One worker: connect a session, drain the queue, stop on abort.
async fn worker_loop(
    worker_id: usize,
    context: WorkerContext,
    queue: Arc<Mutex<VecDeque<ShopRow>>>,
    abort: Arc<AtomicBool>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    let mut session =
        match WebDriverSession::connect(&context.webdriver_url, context.nav_timeout_secs).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(worker_id, error = %e, "worker could not open a browser session");
                abort.store(true, Ordering::SeqCst);
                summary.auth_failure = Some(e.to_string());
                return summary;
            }
        };

    loop {
        if abort.load(Ordering::SeqCst) {
            tracing::debug!(worker_id, "abort flag set; worker stopping");
            break;
        }

        let Some(shop) = queue.lock().await.pop_front() else {
            break;
        };

        match reconcile_shop(&mut session, &context, &shop).await {
            Ok(filled) => {
                summary.succeeded += 1;
                summary.metrics_filled += i64::from(filled);
            }
            Err(ShopFailure::Shop) => summary.failed += 1,
            Err(ShopFailure::Fatal(reason)) => {
                abort.store(true, Ordering::SeqCst);
                summary.auth_failure = Some(reason);
                break;
            }
        }

        if context.inter_shop_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(context.inter_shop_delay_ms)).await;
        }
    }

    if let Err(e) = session.close().await {
        tracing::debug!(worker_id, error = %e, "failed to close browser session");
    }
    summary
}

enum ShopFailure {
    /// Dead session; the batch must abort.
    Fatal(String),
    /// This shop only; already logged and recorded on the run.
    Shop,
}

/// Load → reconcile → persist for one shop.
///
/// Returns the number of metrics filled. A persistence failure leaves the
/// pass uncommitted: the shop is counted failed and stays eligible for the
/// next run, rather than being treated as reconciled.
async fn reconcile_shop(
    session: &mut WebDriverSession,
    context: &WorkerContext,
    shop: &ShopRow,
) -> Result<i32, ShopFailure> {
    let existing = match shopintel_db::get_analytics(&context.pool, shop.id).await {
        Ok(row) => row
            .map(|r| r.decode())
            .unwrap_or_else(shopintel_core::AnalyticsRecord::empty),
        Err(e) => {
            let message = format!("failed to load analytics: {e}");
            tracing::error!(shop = %shop.shop_url, error = %e, "skipping shop");
            record_shop_failure(context, shop, &message).await;
            return Err(ShopFailure::Shop);
        }
    };

    let outcome = match reconcile_record(
        session,
        &context.extractor,
        &shop.shop_url,
        existing,
        &context.required,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) if e.is_fatal() => return Err(ShopFailure::Fatal(e.to_string())),
        Err(e) => {
            let message = e.to_string();
            tracing::error!(shop = %shop.shop_url, error = %message, "reconciliation pass failed");
            record_shop_failure(context, shop, &message).await;
            return Err(ShopFailure::Shop);
        }
    };

    if let Err(e) =
        shopintel_db::upsert_analytics(&context.pool, shop.id, &outcome.record, outcome.status)
            .await
    {
        let message = format!("failed to persist analytics: {e}");
        tracing::error!(shop = %shop.shop_url, error = %e, "pass not committed");
        record_shop_failure(context, shop, &message).await;
        return Err(ShopFailure::Shop);
    }

    let filled = i32::try_from(outcome.filled).unwrap_or(i32::MAX);
    if let Err(e) = shopintel_db::upsert_collection_run_shop(
        &context.pool,
        context.run_id,
        shop.id,
        "succeeded",
        Some(filled),
        None,
    )
    .await
    {
        tracing::warn!(shop = %shop.shop_url, error = %e, "failed to record shop result");
    }

    Ok(filled)
}

/// Record a `"failed"` status in `collection_run_shops` on a best-effort
/// basis.
async fn record_shop_failure(context: &WorkerContext, shop: &ShopRow, message: &str) {
    if let Err(e) = shopintel_db::upsert_collection_run_shop(
        &context.pool,
        context.run_id,
        shop.id,
        "failed",
        None,
        Some(message),
    )
    .await
    {
        tracing::error!(
            run_id = context.run_id,
            shop = %shop.shop_url,
            error = %e,
            "failed to record shop failure"
        );
    }
}
