use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no element matched any of {selector_count} selectors for {context}")]
    SelectorNotFound {
        context: String,
        selector_count: usize,
    },

    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("normalization failed for {metric}: {reason} (raw: \"{raw}\")")]
    Normalization {
        metric: String,
        raw: String,
        reason: String,
    },

    #[error("browser session could not be established: {reason}")]
    Authentication { reason: String },

    #[error("HTTP error talking to the WebDriver endpoint: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected WebDriver response for {context}: {reason}")]
    Protocol { context: String, reason: String },
}

impl ScrapeError {
    /// True when the error invalidates the whole batch rather than one
    /// metric: a dead session cannot extract anything for any shop, and
    /// recording it per-metric would mass-produce false `failed` statuses.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, ScrapeError::Authentication { .. })
    }
}
