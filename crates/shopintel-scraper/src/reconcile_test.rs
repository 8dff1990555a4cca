use shopintel_core::DEFAULT_REQUIRED_METRICS;

use super::*;
use crate::browser::scripted::ScriptedSession;
use crate::extract::{ads, advertising, branded, markets, overview};

const DOMAIN: &str = "glowgadgets.com";

fn config() -> ExtractorConfig {
    ExtractorConfig {
        sem_dashboard_url: "https://sem.dashboard.test".to_owned(),
        trends_dashboard_url: "https://trends.dashboard.test".to_owned(),
    }
}

/// Thirty-one daily counts so both trend windows resolve.
fn long_series() -> String {
    let mut points = vec!["10"; 31];
    points[0] = "8";
    points[30] = "12";
    points.join(" ")
}

/// Scripts every report view with healthy content, so a pass over an empty
/// record fills all seventeen metrics.
fn fully_scripted(config: &ExtractorConfig) -> ScriptedSession {
    let mut session = ScriptedSession::new();

    let url = overview::view_url(config, DOMAIN);
    session.insert_text(&url, "[data-test='organic-traffic-value']", "5K");
    session.insert_text(&url, "[data-test='paid-traffic-value']", "1.1K");
    session.insert_text(&url, "[data-test='bounce-rate-value']", "42%");
    session.insert_text(&url, "[data-test='visit-duration-value']", "2:30");

    let url = advertising::view_url(config, DOMAIN);
    session.insert_text(&url, "[data-test='conversion-rate-value']", "2.8%");
    session.insert_text(&url, "[data-test='cpc-value']", "$1.25");

    let url = branded::view_url(config, DOMAIN);
    session.insert_text(&url, "[data-test='branded-traffic-value']", "3.4K");
    session.insert_text(&url, "[data-test='branded-share-value']", "18%");

    let url = markets::view_url(config, DOMAIN);
    session.insert_text(
        &url,
        "[data-test='geo-distribution-table']",
        "US 36%\nGB 12%\nDE 10%",
    );

    let url = ads::view_url(config, DOMAIN);
    session.insert_text(&url, "[data-test='ads-trend-series']", &long_series());
    session.insert_text(&url, "[data-test='pixel-status']", "Facebook Pixel");

    session
}

fn all_view_urls(config: &ExtractorConfig) -> [String; 5] {
    [
        overview::view_url(config, DOMAIN),
        advertising::view_url(config, DOMAIN),
        branded::view_url(config, DOMAIN),
        markets::view_url(config, DOMAIN),
        ads::view_url(config, DOMAIN),
    ]
}

#[tokio::test]
async fn first_pass_fills_everything_and_completes() {
    let config = config();
    let mut session = fully_scripted(&config);

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        AnalyticsRecord::empty(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert_eq!(outcome.status, ScrapingStatus::Completed);
    assert_eq!(outcome.attempted.len(), Metric::ALL.len());
    assert_eq!(outcome.filled, Metric::ALL.len());
    assert_eq!(outcome.navigation_failures, 0);
    // One navigation per report view, not per metric.
    assert_eq!(session.goto_calls, 5);
    assert!(compute_gaps(&outcome.record).is_empty());
}

#[tokio::test]
async fn second_pass_with_no_gaps_does_zero_browser_work() {
    let config = config();
    let mut session = fully_scripted(&config);

    let first = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        AnalyticsRecord::empty(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    let goto_after_first = session.goto_calls;
    let find_after_first = session.find_calls;

    let second = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        first.record.clone(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert_eq!(session.goto_calls, goto_after_first);
    assert_eq!(session.find_calls, find_after_first);
    assert_eq!(second.record, first.record);
    assert_eq!(second.status, ScrapingStatus::Completed);
    assert!(second.attempted.is_empty());
}

#[tokio::test]
async fn present_fields_are_excluded_and_never_clobbered() {
    let config = config();
    // The page renders 5K for organic traffic, but the stored value is 4321.
    // A pass must neither re-read nor refresh it: the field is present, so
    // the gap set excludes it entirely.
    let mut session = fully_scripted(&config);

    let mut existing = AnalyticsRecord::empty();
    existing.set(Metric::OrganicTraffic, MetricValue::Present(4321.0));

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        existing,
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert!(!outcome.attempted.contains(&Metric::OrganicTraffic));
    assert_eq!(outcome.record.organic_traffic, MetricValue::Present(4321.0));
}

/// Organic already present, bounce rate previously failed, everything else
/// untouched. One pass where every extractor succeeds must land on
/// `completed`.
#[tokio::test]
async fn partial_record_completes_after_successful_pass() {
    let config = config();
    let mut session = fully_scripted(&config);

    let mut existing = AnalyticsRecord::empty();
    existing.set(Metric::OrganicTraffic, MetricValue::Present(5000.0));
    existing.set(
        Metric::BounceRate,
        MetricValue::Unavailable("selector not found".to_owned()),
    );

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        existing,
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert!(!outcome.attempted.contains(&Metric::OrganicTraffic));
    assert!(outcome.attempted.contains(&Metric::BounceRate));
    assert_eq!(outcome.record.organic_traffic, MetricValue::Present(5000.0));
    assert_eq!(outcome.record.bounce_rate, MetricValue::Present(0.42));
    assert_eq!(outcome.status, ScrapingStatus::Completed);
}

#[tokio::test]
async fn dead_session_escalates_instead_of_recording_failures() {
    let config = config();
    let mut session = ScriptedSession::new();
    session.fail_authentication();

    let result = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        AnalyticsRecord::empty(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await;

    assert!(
        matches!(result, Err(ScrapeError::Authentication { .. })),
        "expected Authentication, got: {result:?}"
    );
}

#[tokio::test]
async fn one_unreachable_view_does_not_sink_the_pass() {
    let config = config();
    let mut session = fully_scripted(&config);
    session.fail_navigation(&overview::view_url(&config, DOMAIN));

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        AnalyticsRecord::empty(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert_eq!(outcome.navigation_failures, 1);
    assert_eq!(outcome.status, ScrapingStatus::Partial);
    assert!(
        matches!(&outcome.record.bounce_rate, MetricValue::Unavailable(reason) if reason.contains("timed out"))
    );
    // The other views still delivered.
    assert_eq!(outcome.record.cpc, MetricValue::Present(1.25));
    assert!(outcome.filled > 0);
}

#[tokio::test]
async fn total_navigation_failure_marks_failed_but_stays_retryable() {
    let config = config();
    let mut session = ScriptedSession::new();
    for url in all_view_urls(&config) {
        session.fail_navigation(&url);
    }

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        AnalyticsRecord::empty(),
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    assert_eq!(outcome.status, ScrapingStatus::Failed);
    assert_eq!(outcome.navigation_failures, 5);
    assert_eq!(outcome.filled, 0);
    // Every field recorded the attempt, yet all remain gaps for a later pass.
    assert_eq!(compute_gaps(&outcome.record).len(), Metric::ALL.len());
}

#[tokio::test]
async fn earlier_data_downgrades_total_failure_to_partial() {
    let config = config();
    let mut session = ScriptedSession::new();
    for url in all_view_urls(&config) {
        session.fail_navigation(&url);
    }

    let mut existing = AnalyticsRecord::empty();
    existing.set(Metric::OrganicTraffic, MetricValue::Present(5000.0));

    let outcome = reconcile_record(
        &mut session,
        &config,
        DOMAIN,
        existing,
        &DEFAULT_REQUIRED_METRICS,
    )
    .await
    .unwrap();

    // The source is flapping, but the shop demonstrably exists; keep the
    // partial data and let later passes fill the rest.
    assert_eq!(outcome.status, ScrapingStatus::Partial);
    assert_eq!(outcome.record.organic_traffic, MetricValue::Present(5000.0));
}
