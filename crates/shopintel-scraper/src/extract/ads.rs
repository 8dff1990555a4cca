//! Live-ads trend deltas and tracking-pixel detection from the trends
//! dashboard.
//!
//! The ads chart exposes its daily live-ad counts as a plain value series;
//! the deltas are the sign-preserving fractional change of the latest count
//! against the count 7 and 30 days earlier.

use shopintel_core::{Metric, MetricValue};

use crate::browser::{read_first_text, BrowserSession};
use crate::error::ScrapeError;
use crate::extract::ExtractorConfig;
use crate::normalize::is_sentinel;

const SERIES_SELECTORS: &[&str] = &[
    "[data-test='ads-trend-series']",
    ".ads-chart [data-series]",
    "#ads-trend .series-values",
];

const PIXEL_SELECTORS: &[&str] = &[
    "[data-test='pixel-status']",
    ".pixel-panel .status",
    "#tracking-pixels .summary",
];

const SEVEN_DAY_WINDOW: usize = 7;
const THIRTY_DAY_WINDOW: usize = 30;

pub(crate) fn view_url(config: &ExtractorConfig, domain: &str) -> String {
    format!("{}/shops/{domain}/ads", config.trends_dashboard_url)
}

pub(in crate::extract) async fn extract<S: BrowserSession>(
    session: &mut S,
    config: &ExtractorConfig,
    domain: &str,
    wanted: &[Metric],
) -> Result<Vec<(Metric, MetricValue)>, ScrapeError> {
    session.goto(&view_url(config, domain)).await?;

    let wants_deltas = wanted
        .iter()
        .any(|m| matches!(m, Metric::AdsDelta7d | Metric::AdsDelta30d));
    let series = if wants_deltas {
        read_first_text(session, SERIES_SELECTORS)
            .await?
            .map(|text| parse_series(&text))
    } else {
        None
    };

    let mut out = Vec::with_capacity(wanted.len());
    for metric in wanted {
        let value = match metric {
            Metric::AdsDelta7d => delta_from(series.as_deref(), SEVEN_DAY_WINDOW),
            Metric::AdsDelta30d => delta_from(series.as_deref(), THIRTY_DAY_WINDOW),
            Metric::AdsPixel => {
                let raw = read_first_text(session, PIXEL_SELECTORS).await?;
                pixel_value(raw.as_deref())
            }
            other => {
                tracing::debug!(metric = %other, "not an ads-trend metric; skipping");
                continue;
            }
        };
        out.push((*metric, value));
    }

    Ok(out)
}

fn delta_from(series: Option<&[f64]>, window: usize) -> MetricValue {
    match series {
        None => MetricValue::Unavailable("ads trend series not found".to_owned()),
        Some(series) => trend_delta(series, window),
    }
}

/// Fractional change of the newest count against the count `window` entries
/// earlier. Sign-preserving; a shrinking ad count yields a negative delta.
fn trend_delta(series: &[f64], window: usize) -> MetricValue {
    if series.len() <= window {
        return MetricValue::Unavailable(format!(
            "trend series too short for a {window}-day window ({} points)",
            series.len()
        ));
    }

    let latest = series[series.len() - 1];
    let baseline = series[series.len() - 1 - window];
    if baseline == 0.0 {
        // A zero baseline has no defined relative change; do not fake one.
        return MetricValue::Unavailable(format!("zero baseline {window} days ago"));
    }

    MetricValue::Present((latest - baseline) / baseline)
}

/// Daily counts in the order rendered: oldest first.
fn parse_series(text: &str) -> Vec<f64> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<f64>().ok())
        .collect()
}

/// The pixel panel either lists detected trackers or states the absence
/// explicitly; only a missing or failed panel is `Unavailable`.
fn pixel_value(raw: Option<&str>) -> MetricValue {
    let Some(raw) = raw else {
        return MetricValue::Unavailable("pixel panel not found".to_owned());
    };
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return MetricValue::Unavailable("pixel panel empty".to_owned());
    }
    if is_sentinel(&lower) {
        return MetricValue::Unavailable(format!("source sentinel: \"{}\"", raw.trim()));
    }
    if lower.contains("no pixel") || lower.contains("not detected") {
        return MetricValue::Present(0.0);
    }
    MetricValue::Present(1.0)
}
