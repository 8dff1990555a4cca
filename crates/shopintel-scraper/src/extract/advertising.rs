//! Conversion rate and CPC from the SEM dashboard's advertising research view.

use shopintel_core::{Metric, MetricValue};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;
use crate::extract::{read_metric, ExtractorConfig};
use crate::normalize::FieldKind;

const CONVERSION_RATE_SELECTORS: &[&str] = &[
    "[data-test='conversion-rate-value']",
    ".advertising-panel .conversion-rate",
    "#adv-summary .conv-value",
];

const CPC_SELECTORS: &[&str] = &[
    "[data-test='cpc-value']",
    ".advertising-panel .avg-cpc",
    "#adv-summary .cpc-value",
];

pub(crate) fn view_url(config: &ExtractorConfig, domain: &str) -> String {
    format!(
        "{}/analytics/advertising/?q={domain}",
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
            Metric::ConversionRate => (CONVERSION_RATE_SELECTORS, FieldKind::Percentage),
            Metric::Cpc => (CPC_SELECTORS, FieldKind::Currency),
            other => {
                tracing::debug!(metric = %other, "not an advertising metric; skipping");
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
    async fn extracts_conversion_rate_and_cpc() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(&url, "[data-test='conversion-rate-value']", "2.8%");
        session.insert_text(&url, "[data-test='cpc-value']", "$1.25");

        let wanted = [Metric::ConversionRate, Metric::Cpc];
        let values = extract(&mut session, &config, "glowgadgets.com", &wanted)
            .await
            .unwrap();

        assert_eq!(session.goto_calls, 1);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].0, Metric::ConversionRate);
        assert!((values[0].1.value().unwrap() - 0.028).abs() < 1e-12);
        assert_eq!(values[1].1, MetricValue::Present(1.25));
    }

    #[tokio::test]
    async fn source_sentinel_becomes_unavailable() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(&url, "[data-test='cpc-value']", "n/a");

        let values = extract(&mut session, &config, "glowgadgets.com", &[Metric::Cpc])
            .await
            .unwrap();

        assert!(matches!(values[0].1, MetricValue::Unavailable(_)));
    }
}
