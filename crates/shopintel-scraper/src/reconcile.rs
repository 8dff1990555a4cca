//! One reconciliation pass for one shop: gap analysis → targeted extraction
//! → monotonic merge → status derivation.
//!
//! Persistence stays with the caller; this module never touches the store.
//! The pass is deliberately retry-free — failures are recorded per metric
//! and picked up again by the gap analysis of a later pass.

use shopintel_core::{
    compute_gaps, derive_status, AnalyticsRecord, Metric, MetricFamily, MetricValue,
    ScrapingStatus,
};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::extract::{extract_family, ExtractorConfig};

/// Result of one pass over one shop.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The merged record; the caller persists it in one upsert.
    pub record: AnalyticsRecord,
    /// Derived status, including the failed side-branch.
    pub status: ScrapingStatus,
    /// The gap set this pass attempted, in [`Metric::ALL`] order.
    pub attempted: Vec<Metric>,
    /// Metrics that gained a present value this pass.
    pub filled: usize,
    /// Families whose report view could not be reached at all.
    pub navigation_failures: usize,
}

/// Runs one reconciliation pass for `domain` against `existing`.
///
/// Metrics already present are neither re-extracted nor overwritten; an
/// empty gap set short-circuits before any browser work, which is what makes
/// repeated passes over a mostly-complete catalog cheap. Each needed family
/// extractor runs exactly once. Extraction failures are folded into the
/// record as `Unavailable` — only a dead session ([`ScrapeError::is_fatal`])
/// escalates, because it invalidates the whole batch rather than one shop.
///
/// # Errors
///
/// Returns [`ScrapeError::Authentication`] when the browser session is dead;
/// all other extraction failures are absorbed into the outcome.
pub async fn reconcile_record<S: BrowserSession>(
    session: &mut S,
    config: &ExtractorConfig,
    domain: &str,
    existing: AnalyticsRecord,
    required: &[Metric],
) -> Result<ReconcileOutcome, ScrapeError> {
    let gaps = compute_gaps(&existing);
    let mut record = existing;

    if gaps.is_empty() {
        let status = derive_status(&record, required);
        tracing::debug!(domain, "no gaps; skipping browser work");
        return Ok(ReconcileOutcome {
            record,
            status,
            attempted: Vec::new(),
            filled: 0,
            navigation_failures: 0,
        });
    }

    let families = group_by_family(&gaps);
    let family_count = families.len();
    let mut filled = 0usize;
    let mut navigation_failures = 0usize;

    for (family, wanted) in families {
        match extract_family(session, config, domain, family, &wanted).await {
            Ok(values) => {
                for (metric, value) in values {
                    let is_present = value.is_present();
                    if record.merge(metric, value) && is_present {
                        filled += 1;
                    }
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                navigation_failures += 1;
                tracing::warn!(
                    domain,
                    family = ?family,
                    error = %err,
                    "report view unreachable; recording metrics as unavailable"
                );
                let reason = err.to_string();
                for metric in wanted {
                    record.merge(metric, MetricValue::Unavailable(reason.clone()));
                }
            }
        }
    }

    let mut status = derive_status(&record, required);
    // Total source-level failure: every view this pass died before reading a
    // single value and the record holds nothing from earlier passes either.
    if navigation_failures == family_count && record.present_count(&Metric::ALL) == 0 {
        status = ScrapingStatus::Failed;
    }

    tracing::info!(
        domain,
        attempted = gaps.len(),
        filled,
        navigation_failures,
        status = %status,
        "reconciliation pass finished"
    );

    Ok(ReconcileOutcome {
        record,
        status,
        attempted: gaps,
        filled,
        navigation_failures,
    })
}

/// Buckets the gap set by report view, preserving [`Metric::ALL`] order both
/// across and within families.
fn group_by_family(gaps: &[Metric]) -> Vec<(MetricFamily, Vec<Metric>)> {
    let mut families: Vec<(MetricFamily, Vec<Metric>)> = Vec::new();
    for metric in gaps {
        let family = metric.family();
        match families.iter_mut().find(|(f, _)| *f == family) {
            Some((_, bucket)) => bucket.push(*metric),
            None => families.push((family, vec![*metric])),
        }
    }
    families
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
