//! Organic/paid traffic, bounce rate, and visit duration from the SEM
//! dashboard's domain-overview view.

use shopintel_core::{Metric, MetricValue};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::extract::{read_metric, ExtractorConfig};
use crate::normalize::FieldKind;

const ORGANIC_TRAFFIC_SELECTORS: &[&str] = &[
    "[data-test='organic-traffic-value']",
    ".overview-organic .metric-value",
    "#organic-search-summary .value",
];

const PAID_TRAFFIC_SELECTORS: &[&str] = &[
    "[data-test='paid-traffic-value']",
    ".overview-paid .metric-value",
    "#paid-search-summary .value",
];

const BOUNCE_RATE_SELECTORS: &[&str] = &[
    "[data-test='bounce-rate-value']",
    ".engagement-panel .bounce-rate",
    "#engagement-summary td:nth-child(3)",
];

const VISIT_DURATION_SELECTORS: &[&str] = &[
    "[data-test='visit-duration-value']",
    ".engagement-panel .avg-duration",
    "#engagement-summary td:nth-child(4)",
];

pub(crate) fn view_url(config: &ExtractorConfig, domain: &str) -> String {
    format!("{}/analytics/overview/?q={domain}", config.sem_dashboard_url)
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
            Metric::OrganicTraffic => (ORGANIC_TRAFFIC_SELECTORS, FieldKind::Magnitude),
            Metric::PaidSearchTraffic => (PAID_TRAFFIC_SELECTORS, FieldKind::Magnitude),
            Metric::BounceRate => (BOUNCE_RATE_SELECTORS, FieldKind::Percentage),
            Metric::AvgVisitDuration => (VISIT_DURATION_SELECTORS, FieldKind::Duration),
            other => {
                tracing::debug!(metric = %other, "not an overview metric; skipping");
                continue;
            }
        };
        let value = read_metric(session, *metric, selectors, kind).await?;
        out.push((*metric, value));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::scripted::ScriptedSession;

    fn config() -> ExtractorConfig {
        ExtractorConfig {
            sem_dashboard_url: "https://sem.dashboard.test".to_owned(),
            trends_dashboard_url: "https://trends.dashboard.test".to_owned(),
        }
    }

    #[tokio::test]
    async fn extracts_wanted_metrics_from_one_navigation() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(&url, "[data-test='organic-traffic-value']", "1.2K");
        session.insert_text(&url, "[data-test='bounce-rate-value']", "42%");

        let wanted = [Metric::OrganicTraffic, Metric::BounceRate];
        let values = extract(&mut session, &config, "glowgadgets.com", &wanted)
            .await
            .unwrap();

        assert_eq!(session.goto_calls, 1);
        assert_eq!(
            values,
            vec![
                (Metric::OrganicTraffic, MetricValue::Present(1200.0)),
                (Metric::BounceRate, MetricValue::Present(0.42)),
            ]
        );
    }

    #[tokio::test]
    async fn falls_back_to_secondary_selector() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(&url, ".overview-organic .metric-value", "609094");

        let values = extract(
            &mut session,
            &config,
            "glowgadgets.com",
            &[Metric::OrganicTraffic],
        )
        .await
        .unwrap();

        assert_eq!(
            values,
            vec![(Metric::OrganicTraffic, MetricValue::Present(609_094.0))]
        );
    }

    #[tokio::test]
    async fn missing_selector_yields_unavailable_not_zero() {
        let config = config();
        let mut session = ScriptedSession::new();

        let values = extract(
            &mut session,
            &config,
            "glowgadgets.com",
            &[Metric::PaidSearchTraffic],
        )
        .await
        .unwrap();

        assert_eq!(values.len(), 1);
        let (metric, value) = &values[0];
        assert_eq!(*metric, Metric::PaidSearchTraffic);
        assert!(matches!(value, MetricValue::Unavailable(_)));
    }

    #[tokio::test]
    async fn navigation_timeout_propagates_to_caller() {
        let config = config();
        let url = view_url(&config, "slow.example");
        let mut session = ScriptedSession::new();
        session.fail_navigation(&url);

        let result = extract(&mut session, &config, "slow.example", &[Metric::BounceRate]).await;
        assert!(matches!(
            result,
            Err(ScrapeError::NavigationTimeout { .. })
        ));
    }
}
