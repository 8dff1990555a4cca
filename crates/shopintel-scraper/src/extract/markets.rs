//! Country-market traffic split from the SEM dashboard's geo distribution
//! table.
//!
//! The completeness policy distinguishes "this country has no traffic" from
//! "the page failed to load": a market absent from the observed table is
//! recorded as zero only when at least one country row parsed at all. An
//! empty or unreadable table yields `Unavailable` for all six markets.

use regex::Regex;

use shopintel_core::{Metric, MetricValue};

use crate::browser::{read_first_text, BrowserSession};
use crate::error::ScrapeError;
use crate::extract::ExtractorConfig;
use crate::normalize::{normalize, FieldKind};

const GEO_TABLE_SELECTORS: &[&str] = &[
    "[data-test='geo-distribution-table']",
    ".geo-panel table tbody",
    "#geo-distribution .country-rows",
];

pub(crate) fn view_url(config: &ExtractorConfig, domain: &str) -> String {
    format!("{}/analytics/geo/?q={domain}", config.sem_dashboard_url)
}

pub(in crate::extract) async fn extract<S: BrowserSession>(
    session: &mut S,
    config: &ExtractorConfig,
    domain: &str,
    wanted: &[Metric],
) -> Result<Vec<(Metric, MetricValue)>, ScrapeError> {
    session.goto(&view_url(config, domain)).await?;

    let raw = read_first_text(session, GEO_TABLE_SELECTORS).await?;
    let Some(text) = raw else {
        tracing::debug!(domain, "geo table not found");
        return Ok(unavailable_for(wanted, "geo table not found"));
    };

    let shares = parse_country_rows(&text);
    if shares.is_empty() {
        tracing::debug!(domain, "geo table present but no country rows parsed");
        let err = ScrapeError::Normalization {
            metric: "country market split".to_owned(),
            raw: text.chars().take(80).collect(),
            reason: "no country rows parsed".to_owned(),
        };
        return Ok(unavailable_for(wanted, &err.to_string()));
    }

    let values = wanted
        .iter()
        .map(|market| {
            let share = shares
                .iter()
                .find(|(row_market, _)| row_market == market)
                .map(|(_, share)| *share)
                // Table was non-empty; an absent market genuinely has no
                // measured traffic.
                .unwrap_or(0.0);
            (*market, MetricValue::Present(share))
        })
        .collect();

    Ok(values)
}

fn unavailable_for(wanted: &[Metric], reason: &str) -> Vec<(Metric, MetricValue)> {
    wanted
        .iter()
        .map(|m| (*m, MetricValue::Unavailable(reason.to_owned())))
        .collect()
}

/// Parses `"US 36.2%"`-style rows out of the table text, keeping only rows
/// whose country code maps to a tracked market and whose percentage
/// normalizes cleanly.
fn parse_country_rows(text: &str) -> Vec<(Metric, f64)> {
    // Country code at line start, percentage anywhere after it. The table
    // renders one country per line with assorted junk (flags, visit counts)
    // in between.
    let row = Regex::new(r"(?m)^\s*([A-Za-z]{2})\b.*?(-?\d+(?:[.,]\d+)?\s*%)").expect("valid regex");

    row.captures_iter(text)
        .filter_map(|cap| {
            let market = Metric::for_country(cap.get(1)?.as_str())?;
            let share = normalize(Some(cap.get(2)?.as_str()), FieldKind::Percentage).value()?;
            Some((market, share))
        })
        .collect()
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
    async fn single_us_row_sets_us_share_and_zeroes_others() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(&url, "[data-test='geo-distribution-table']", "US 36%");

        let values = extract(&mut session, &config, "glowgadgets.com", &Metric::MARKETS)
            .await
            .unwrap();

        let get = |m: Metric| {
            values
                .iter()
                .find(|(metric, _)| *metric == m)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get(Metric::MarketUs), MetricValue::Present(0.36));
        assert_eq!(get(Metric::MarketDe), MetricValue::Present(0.0));
        assert_eq!(get(Metric::MarketFr), MetricValue::Present(0.0));
    }

    #[tokio::test]
    async fn missing_table_yields_unavailable_for_all_markets() {
        let config = config();
        let mut session = ScriptedSession::new();

        let values = extract(&mut session, &config, "glowgadgets.com", &Metric::MARKETS)
            .await
            .unwrap();

        assert_eq!(values.len(), Metric::MARKETS.len());
        for (metric, value) in values {
            assert!(
                matches!(value, MetricValue::Unavailable(_)),
                "{metric} should be unavailable"
            );
        }
    }

    #[tokio::test]
    async fn unreadable_table_yields_unavailable_not_zero() {
        let config = config();
        let url = view_url(&config, "glowgadgets.com");
        let mut session = ScriptedSession::new();
        session.insert_text(
            &url,
            "[data-test='geo-distribution-table']",
            "loading geographic data…",
        );

        let values = extract(&mut session, &config, "glowgadgets.com", &Metric::MARKETS)
            .await
            .unwrap();

        for (_, value) in values {
            assert!(matches!(value, MetricValue::Unavailable(_)));
        }
    }

    #[test]
    fn parse_country_rows_reads_multi_line_table() {
        let text = "US \u{1f1fa}\u{1f1f8} 120,400 visits 36.2%\n\
                    GB 44,100 visits 12%\n\
                    JP 30,000 visits 9%\n\
                    DE 21,900 visits 6,5%";
        let rows = parse_country_rows(text);

        assert_eq!(rows.len(), 3, "JP is untracked and must be dropped");
        assert!(rows
            .iter()
            .any(|(m, v)| *m == Metric::MarketUs && (v - 0.362).abs() < 1e-12));
        assert!(rows
            .iter()
            .any(|(m, v)| *m == Metric::MarketUk && (v - 0.12).abs() < 1e-12));
        assert!(rows
            .iter()
            .any(|(m, v)| *m == Metric::MarketDe && (v - 0.065).abs() < 1e-12));
    }

    #[test]
    fn parse_country_rows_ignores_junk_lines() {
        let rows = parse_country_rows("Country Share\nOther 4%\n");
        assert!(rows.is_empty());
    }
}
