//! Branded traffic volume and share from the SEM dashboard's branded
//! keywords view.

use shopintel_core::{Metric, MetricValue};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::extract::{read_metric, ExtractorConfig};
use crate::normalize::FieldKind;

const BRANDED_TRAFFIC_SELECTORS: &[&str] = &[
    "[data-test='branded-traffic-value']",
    ".branded-panel .traffic-value",
    "#branded-summary .value",
];

const PERCENT_BRANDED_SELECTORS: &[&str] = &[
    "[data-test='branded-share-value']",
    ".branded-panel .traffic-share",
    "#branded-summary .share",
];

pub(crate) fn view_url(config: &ExtractorConfig, domain: &str) -> String {
    format!(
        "{}/analytics/organic/branded/?q={domain}",
        config.sem_dashboard_url
    )
}

pub(in crate::extract) async fn extract<S: BrowserSession>(
    session: &mut S,
    config: &ExtractorConfig,
    domain: &str,
    wanted: &[Metric],
) -> Result<Vec<(Metric, MetricValue)>, ScrapeError> {
    session.goto(&view_url(config, domain)).await?;

    let mut out = Vec::with_capacity(wanted.len());
    for metric in wanted {
        let (selectors, kind) = match metric {
            Metric::BrandedTraffic => (BRANDED_TRAFFIC_SELECTORS, FieldKind::Magnitude),
            Metric::PercentBrandedTraffic => (PERCENT_BRANDED_SELECTORS, FieldKind::Percentage),
            other => {
                tracing::debug!(metric = %other, "not a branded metric; skipping");
                continue;
            }
        };
        let value = read_metric(session, *metric, selectors, kind).await?;
        out.push((*metric, value));
    }

    Ok(out)
}
