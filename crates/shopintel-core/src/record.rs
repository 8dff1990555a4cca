//! The per-shop analytics snapshot and its monotonic merge.

use crate::metrics::{Metric, MetricValue};

/// Current SEM/traffic snapshot for one shop.
///
/// One typed field per [`Metric`]; every field is a three-state
/// [`MetricValue`]. The high field count is inherent to the domain -- each
/// field directly corresponds to a column on `shop_analytics` and cannot be
/// meaningfully collapsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyticsRecord {
    pub organic_traffic: MetricValue,
    pub paid_search_traffic: MetricValue,
    pub bounce_rate: MetricValue,
    pub avg_visit_duration: MetricValue,
    pub conversion_rate: MetricValue,
    pub cpc: MetricValue,
    pub branded_traffic: MetricValue,
    pub percent_branded_traffic: MetricValue,
    pub market_us: MetricValue,
    pub market_uk: MetricValue,
    pub market_de: MetricValue,
    pub market_ca: MetricValue,
    pub market_au: MetricValue,
    pub market_fr: MetricValue,
    pub ads_delta_7d: MetricValue,
    pub ads_delta_30d: MetricValue,
    pub ads_pixel: MetricValue,
}

impl AnalyticsRecord {
    /// A record with every field `NotAttempted` -- the state of a shop no
    /// extractor has ever visited.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> &MetricValue {
        match metric {
            Metric::OrganicTraffic => &self.organic_traffic,
            Metric::PaidSearchTraffic => &self.paid_search_traffic,
            Metric::BounceRate => &self.bounce_rate,
            Metric::AvgVisitDuration => &self.avg_visit_duration,
            Metric::ConversionRate => &self.conversion_rate,
            Metric::Cpc => &self.cpc,
            Metric::BrandedTraffic => &self.branded_traffic,
            Metric::PercentBrandedTraffic => &self.percent_branded_traffic,
            Metric::MarketUs => &self.market_us,
            Metric::MarketUk => &self.market_uk,
            Metric::MarketDe => &self.market_de,
            Metric::MarketCa => &self.market_ca,
            Metric::MarketAu => &self.market_au,
            Metric::MarketFr => &self.market_fr,
            Metric::AdsDelta7d => &self.ads_delta_7d,
            Metric::AdsDelta30d => &self.ads_delta_30d,
            Metric::AdsPixel => &self.ads_pixel,
        }
    }

    fn slot(&mut self, metric: Metric) -> &mut MetricValue {
        match metric {
            Metric::OrganicTraffic => &mut self.organic_traffic,
            Metric::PaidSearchTraffic => &mut self.paid_search_traffic,
            Metric::BounceRate => &mut self.bounce_rate,
            Metric::AvgVisitDuration => &mut self.avg_visit_duration,
            Metric::ConversionRate => &mut self.conversion_rate,
            Metric::Cpc => &mut self.cpc,
            Metric::BrandedTraffic => &mut self.branded_traffic,
            Metric::PercentBrandedTraffic => &mut self.percent_branded_traffic,
            Metric::MarketUs => &mut self.market_us,
            Metric::MarketUk => &mut self.market_uk,
            Metric::MarketDe => &mut self.market_de,
            Metric::MarketCa => &mut self.market_ca,
            Metric::MarketAu => &mut self.market_au,
            Metric::MarketFr => &mut self.market_fr,
            Metric::AdsDelta7d => &mut self.ads_delta_7d,
            Metric::AdsDelta30d => &mut self.ads_delta_30d,
            Metric::AdsPixel => &mut self.ads_pixel,
        }
    }

    /// Overwrites a field unconditionally. Decoding from storage uses this;
    /// reconciliation must go through [`AnalyticsRecord::merge`].
    pub fn set(&mut self, metric: Metric, value: MetricValue) {
        *self.slot(metric) = value;
    }

    /// Merges one extracted value into the record.
    ///
    /// Presence is monotonic: a `Present` field is only ever replaced by
    /// another `Present` value. `Unavailable` lands only on fields that hold
    /// no value yet, so "tried and failed" stays distinguishable from "never
    /// tried" without destroying data. `NotAttempted` input is ignored.
    ///
    /// Returns `true` when the field was written.
    pub fn merge(&mut self, metric: Metric, value: MetricValue) -> bool {
        match value {
            MetricValue::NotAttempted => false,
            MetricValue::Present(_) => {
                *self.slot(metric) = value;
                true
            }
            MetricValue::Unavailable(_) => {
                let slot = self.slot(metric);
                if slot.is_present() {
                    false
                } else {
                    *slot = value;
                    true
                }
            }
        }
    }

    /// Iterates every field in [`Metric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricValue)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.get(*m)))
    }

    #[must_use]
    pub fn present_count(&self, metrics: &[Metric]) -> usize {
        metrics.iter().filter(|m| self.get(**m).is_present()).count()
    }

    /// True when at least one field has ever been attempted, successfully
    /// or not.
    #[must_use]
    pub fn attempted_any(&self) -> bool {
        self.iter().any(|(_, v)| !matches!(v, MetricValue::NotAttempted))
    }
}
