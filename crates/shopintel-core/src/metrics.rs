//! Metric names and the three-state value cell shared by every analytics field.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One named analytics figure tracked per shop.
///
/// Variants map 1:1 to columns on the `shop_analytics` table; [`Metric::as_str`]
/// returns the column name. Percent-like metrics are stored as fractions of
/// one, durations as total seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    OrganicTraffic,
    PaidSearchTraffic,
    BounceRate,
    AvgVisitDuration,
    ConversionRate,
    Cpc,
    BrandedTraffic,
    PercentBrandedTraffic,
    MarketUs,
    MarketUk,
    MarketDe,
    MarketCa,
    MarketAu,
    MarketFr,
    AdsDelta7d,
    AdsDelta30d,
    AdsPixel,
}

/// Report view a metric is read from.
///
/// Gaps are grouped by family so each view is navigated at most once per
/// reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    /// SEM dashboard, domain overview view.
    Overview,
    /// SEM dashboard, advertising research view.
    Advertising,
    /// SEM dashboard, branded keywords view.
    Branded,
    /// SEM dashboard, geo distribution table.
    Markets,
    /// Trends dashboard, live-ads chart and pixel panel.
    AdsTrend,
}

impl Metric {
    /// Every tracked metric, in `shop_analytics` column order.
    pub const ALL: [Metric; 17] = [
        Metric::OrganicTraffic,
        Metric::PaidSearchTraffic,
        Metric::BounceRate,
        Metric::AvgVisitDuration,
        Metric::ConversionRate,
        Metric::Cpc,
        Metric::BrandedTraffic,
        Metric::PercentBrandedTraffic,
        Metric::MarketUs,
        Metric::MarketUk,
        Metric::MarketDe,
        Metric::MarketCa,
        Metric::MarketAu,
        Metric::MarketFr,
        Metric::AdsDelta7d,
        Metric::AdsDelta30d,
        Metric::AdsPixel,
    ];

    /// The six tracked country markets, in column order.
    pub const MARKETS: [Metric; 6] = [
        Metric::MarketUs,
        Metric::MarketUk,
        Metric::MarketDe,
        Metric::MarketCa,
        Metric::MarketAu,
        Metric::MarketFr,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Metric::OrganicTraffic => "organic_traffic",
            Metric::PaidSearchTraffic => "paid_search_traffic",
            Metric::BounceRate => "bounce_rate",
            Metric::AvgVisitDuration => "avg_visit_duration",
            Metric::ConversionRate => "conversion_rate",
            Metric::Cpc => "cpc",
            Metric::BrandedTraffic => "branded_traffic",
            Metric::PercentBrandedTraffic => "percent_branded_traffic",
            Metric::MarketUs => "market_us",
            Metric::MarketUk => "market_uk",
            Metric::MarketDe => "market_de",
            Metric::MarketCa => "market_ca",
            Metric::MarketAu => "market_au",
            Metric::MarketFr => "market_fr",
            Metric::AdsDelta7d => "ads_delta_7d",
            Metric::AdsDelta30d => "ads_delta_30d",
            Metric::AdsPixel => "ads_pixel",
        }
    }

    #[must_use]
    pub const fn family(self) -> MetricFamily {
        match self {
            Metric::OrganicTraffic
            | Metric::PaidSearchTraffic
            | Metric::BounceRate
            | Metric::AvgVisitDuration => MetricFamily::Overview,
            Metric::ConversionRate | Metric::Cpc => MetricFamily::Advertising,
            Metric::BrandedTraffic | Metric::PercentBrandedTraffic => MetricFamily::Branded,
            Metric::MarketUs
            | Metric::MarketUk
            | Metric::MarketDe
            | Metric::MarketCa
            | Metric::MarketAu
            | Metric::MarketFr => MetricFamily::Markets,
            Metric::AdsDelta7d | Metric::AdsDelta30d | Metric::AdsPixel => MetricFamily::AdsTrend,
        }
    }

    /// Maps an observed country code from the geo table to its tracked market.
    ///
    /// Both `UK` and `GB` are accepted for the United Kingdom; anything not in
    /// the tracked six returns `None`.
    #[must_use]
    pub fn for_country(code: &str) -> Option<Metric> {
        match code.trim().to_ascii_uppercase().as_str() {
            "US" => Some(Metric::MarketUs),
            "UK" | "GB" => Some(Metric::MarketUk),
            "DE" => Some(Metric::MarketDe),
            "CA" => Some(Metric::MarketCa),
            "AU" => Some(Metric::MarketAu),
            "FR" => Some(Metric::MarketFr),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown metric name: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMetric(s.to_owned()))
    }
}

/// Three-state cell for one analytics field.
///
/// `Present(0.0)` is a legitimate observation and is never conflated with
/// `Unavailable`. `Unavailable` records an extraction that was attempted but
/// yielded nothing, with a diagnostic reason; `NotAttempted` means no
/// extractor has ever run for the field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MetricValue {
    Present(f64),
    Unavailable(String),
    #[default]
    NotAttempted,
}

impl MetricValue {
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, MetricValue::Present(_))
    }

    /// True when a reconciliation pass should (re-)attempt this field.
    #[must_use]
    pub const fn is_gap(&self) -> bool {
        !self.is_present()
    }

    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            MetricValue::Present(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            MetricValue::Unavailable(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_round_trip() {
        for metric in Metric::ALL {
            let parsed: Metric = metric.as_str().parse().unwrap();
            assert_eq!(parsed, metric);
        }
    }

    #[test]
    fn unknown_metric_name_fails() {
        let err = "page_rank".parse::<Metric>().unwrap_err();
        assert_eq!(err.0, "page_rank");
    }

    #[test]
    fn uk_and_gb_map_to_same_market() {
        assert_eq!(Metric::for_country("UK"), Some(Metric::MarketUk));
        assert_eq!(Metric::for_country("gb"), Some(Metric::MarketUk));
    }

    #[test]
    fn untracked_country_maps_to_none() {
        assert_eq!(Metric::for_country("JP"), None);
        assert_eq!(Metric::for_country(""), None);
    }

    #[test]
    fn every_market_is_in_markets_family() {
        for market in Metric::MARKETS {
            assert_eq!(market.family(), MetricFamily::Markets);
        }
    }

    #[test]
    fn present_zero_is_not_a_gap() {
        assert!(!MetricValue::Present(0.0).is_gap());
        assert!(MetricValue::Present(0.0).is_present());
    }

    #[test]
    fn unavailable_and_not_attempted_are_gaps() {
        assert!(MetricValue::Unavailable("selector not found".into()).is_gap());
        assert!(MetricValue::NotAttempted.is_gap());
    }
}
