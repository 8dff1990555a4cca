//! Completion status derived from a merged metric set.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::metrics::Metric;
use crate::record::AnalyticsRecord;

/// Lifecycle of a shop's analytics snapshot.
///
/// `pending → partial → completed`, with `partial` revisited by independent
/// reconciliation passes until every required metric is present. `failed` is
/// a side-branch assigned by the orchestrator when a pass could not reach the
/// source at all; it is retryable, not terminal -- gap analysis works off
/// field states, so a later pass re-attempts and recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapingStatus {
    Pending,
    Partial,
    Completed,
    Failed,
}

impl ScrapingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ScrapingStatus::Pending => "pending",
            ScrapingStatus::Partial => "partial",
            ScrapingStatus::Completed => "completed",
            ScrapingStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ScrapingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown scraping status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ScrapingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScrapingStatus::Pending),
            "partial" => Ok(ScrapingStatus::Partial),
            "completed" => Ok(ScrapingStatus::Completed),
            "failed" => Ok(ScrapingStatus::Failed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// The default required set: the eight overview, advertising, and branded
/// metrics. Market shares and ads-trend figures are collected but do not
/// gate completion. Overridable via `SHOPINTEL_REQUIRED_METRICS`.
pub const DEFAULT_REQUIRED_METRICS: [Metric; 8] = [
    Metric::OrganicTraffic,
    Metric::PaidSearchTraffic,
    Metric::BounceRate,
    Metric::AvgVisitDuration,
    Metric::ConversionRate,
    Metric::Cpc,
    Metric::BrandedTraffic,
    Metric::PercentBrandedTraffic,
];

/// Derives the data-driven completion status of a merged record.
///
/// - `Completed` iff every metric in `required` is present.
/// - `Pending` iff no field of the record (required or not) has ever been
///   attempted.
/// - `Partial` otherwise.
///
/// `Failed` is never derived here; only the orchestrator assigns it, on
/// total source-level failure of a pass.
#[must_use]
pub fn derive_status(record: &AnalyticsRecord, required: &[Metric]) -> ScrapingStatus {
    if !required.is_empty() && record.present_count(required) == required.len() {
        return ScrapingStatus::Completed;
    }
    if record.attempted_any() {
        ScrapingStatus::Partial
    } else {
        ScrapingStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricValue;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ScrapingStatus::Pending,
            ScrapingStatus::Partial,
            ScrapingStatus::Completed,
            ScrapingStatus::Failed,
        ] {
            let parsed: ScrapingStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn empty_record_is_pending() {
        let status = derive_status(&AnalyticsRecord::empty(), &DEFAULT_REQUIRED_METRICS);
        assert_eq!(status, ScrapingStatus::Pending);
    }

    #[test]
    fn all_required_present_is_completed() {
        let mut record = AnalyticsRecord::empty();
        for metric in DEFAULT_REQUIRED_METRICS {
            record.set(metric, MetricValue::Present(1.0));
        }
        let status = derive_status(&record, &DEFAULT_REQUIRED_METRICS);
        assert_eq!(status, ScrapingStatus::Completed);
    }

    #[test]
    fn unavailable_attempt_alone_is_partial() {
        let mut record = AnalyticsRecord::empty();
        record.set(
            Metric::OrganicTraffic,
            MetricValue::Unavailable("timeout".into()),
        );
        let status = derive_status(&record, &DEFAULT_REQUIRED_METRICS);
        assert_eq!(status, ScrapingStatus::Partial);
    }

    #[test]
    fn optional_metric_alone_is_partial_not_completed() {
        let mut record = AnalyticsRecord::empty();
        record.set(Metric::MarketUs, MetricValue::Present(0.36));
        let status = derive_status(&record, &DEFAULT_REQUIRED_METRICS);
        assert_eq!(status, ScrapingStatus::Partial);
    }

    /// Totality over every subset of the required set: exactly one of the
    /// three data-driven states, and `Completed` iff the subset is full.
    #[test]
    fn derive_status_is_total_over_required_subsets() {
        let required = DEFAULT_REQUIRED_METRICS;
        for mask in 0u32..(1 << required.len()) {
            let mut record = AnalyticsRecord::empty();
            for (i, metric) in required.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    record.set(*metric, MetricValue::Present(1.0));
                } else {
                    record.set(*metric, MetricValue::Unavailable("no data".into()));
                }
            }

            let status = derive_status(&record, &required);
            if mask == (1 << required.len()) - 1 {
                assert_eq!(status, ScrapingStatus::Completed, "mask {mask:#b}");
            } else {
                assert_eq!(status, ScrapingStatus::Partial, "mask {mask:#b}");
            }
        }
    }

    #[test]
    fn required_set_override_changes_completion() {
        let required = [Metric::OrganicTraffic, Metric::BounceRate];
        let mut record = AnalyticsRecord::empty();
        record.set(Metric::OrganicTraffic, MetricValue::Present(5000.0));
        record.set(Metric::BounceRate, MetricValue::Present(0.42));

        assert_eq!(
            derive_status(&record, &required),
            ScrapingStatus::Completed
        );
        assert_eq!(
            derive_status(&record, &DEFAULT_REQUIRED_METRICS),
            ScrapingStatus::Partial
        );
    }
}
