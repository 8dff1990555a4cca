//! Metric extraction and reconciliation against the SEM and trends
//! dashboards.
//!
//! The crate is deliberately persistence-free: [`reconcile_record`] takes an
//! existing snapshot and a browser session and returns the merged snapshot;
//! callers own loading and the atomic upsert.

pub mod browser;
pub mod error;
mod extract;
pub mod normalize;
pub mod reconcile;

pub use browser::webdriver::WebDriverSession;
pub use browser::BrowserSession;
pub use error::ScrapeError;
pub use extract::ExtractorConfig;
pub use normalize::{normalize, FieldKind};
pub use reconcile::{reconcile_record, ReconcileOutcome};
