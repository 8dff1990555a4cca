//! Metric extractors, one module per dashboard report view.
//!
//! Every extractor navigates to its view for the shop's domain, tries an
//! ordered list of fallback selectors, reads raw text, and delegates to the
//! normalizer. A family extracts all of its wanted metrics from a single
//! navigation.

pub(crate) mod ads;
pub(crate) mod advertising;
pub(crate) mod branded;
pub(crate) mod markets;
pub(crate) mod overview;

use shopintel_core::{AppConfig, Metric, MetricFamily, MetricValue};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;

/// Dashboard origins the extractors build their report URLs from; carved off
/// [`AppConfig`] so the scraper layer does not drag process configuration
/// around.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub sem_dashboard_url: String,
    pub trends_dashboard_url: String,
}

impl ExtractorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            sem_dashboard_url: config.sem_dashboard_url.trim_end_matches('/').to_owned(),
            trends_dashboard_url: config.trends_dashboard_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// Extracts every wanted metric of one family with a single navigation.
///
/// Returns one `(metric, value)` pair per wanted metric. Per-metric problems
/// (missing selector, unparseable text) come back as `Unavailable` values;
/// an `Err` means the whole view was unreachable and the caller decides how
/// to record that for each wanted metric.
///
/// # Errors
///
/// Propagates navigation and transport failures from the browser session.
pub(crate) async fn extract_family<S: BrowserSession>(
    session: &mut S,
    config: &ExtractorConfig,
    domain: &str,
    family: MetricFamily,
    wanted: &[Metric],
) -> Result<Vec<(Metric, MetricValue)>, ScrapeError> {
    match family {
        MetricFamily::Overview => overview::extract(session, config, domain, wanted).await,
        MetricFamily::Advertising => advertising::extract(session, config, domain, wanted).await,
        MetricFamily::Branded => branded::extract(session, config, domain, wanted).await,
        MetricFamily::Markets => markets::extract(session, config, domain, wanted).await,
        MetricFamily::AdsTrend => ads::extract(session, config, domain, wanted).await,
    }
}

/// Shared single-value read: first matching selector's text through the
/// normalizer, or `Unavailable` when no selector matched.
pub(in crate::extract) async fn read_metric<S: BrowserSession>(
    session: &mut S,
    metric: Metric,
    selectors: &[&str],
    kind: crate::normalize::FieldKind,
) -> Result<MetricValue, ScrapeError> {
    let raw = crate::browser::read_first_text(session, selectors).await?;
    let value = match raw {
        Some(text) => crate::normalize::normalize(Some(&text), kind),
        None => {
            tracing::debug!(metric = %metric, "no selector matched");
            let err = ScrapeError::SelectorNotFound {
                context: metric.to_string(),
                selector_count: selectors.len(),
            };
            MetricValue::Unavailable(err.to_string())
        }
    };
    Ok(value)
}
