//! Gap analysis: which metrics a reconciliation pass still needs.

use crate::metrics::Metric;
use crate::record::AnalyticsRecord;

/// Returns the metrics whose value is `NotAttempted` or `Unavailable`, in
/// [`Metric::ALL`] order.
///
/// A `Present` value -- including a legitimate zero -- is never a gap, which
/// is why the normalizer must never turn a failure into `Present(0.0)`. Raw
/// text equal to a legacy failure sentinel (`"na"`, `"null"`, empty string)
/// never reaches the record as `Present` either: the normalizer maps it to
/// `Unavailable`, so such fields stay in the gap set across passes.
#[must_use]
pub fn compute_gaps(record: &AnalyticsRecord) -> Vec<Metric> {
    record
        .iter()
        .filter(|(_, value)| value.is_gap())
        .map(|(metric, _)| metric)
        .collect()
}
