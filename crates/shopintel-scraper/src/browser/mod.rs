//! Browser Automation Collaborator interface.
//!
//! The extractors only need three capabilities from a live browser: navigate,
//! locate with ordered fallbacks, read rendered text. Anything that provides
//! them can drive a reconciliation pass; production uses the WebDriver
//! binding, tests use a scripted in-memory session.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod scripted;

use crate::error::ScrapeError;

/// Capability set supplied to every metric extractor.
///
/// One session is exclusively owned by one worker. Methods take `&mut self`
/// because extractors share a single tab and depend on prior navigation
/// state; the type system rules out the shared-singleton session reuse that
/// plagues scraper codebases.
#[allow(async_fn_in_trait)]
pub trait BrowserSession {
    /// Opaque handle to a located DOM element.
    type Element;

    /// Navigates the session's tab to `url`.
    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Tries each selector in order and returns the first match, or `None`
    /// when nothing matched. The caller decides whether that is an error;
    /// the dashboards change markup often enough that a single selector
    /// fails silently.
    async fn find(&mut self, selectors: &[&str])
        -> Result<Option<Self::Element>, ScrapeError>;

    /// Reads the rendered text of a located element.
    async fn read_text(&mut self, element: &Self::Element) -> Result<String, ScrapeError>;
}

/// Locates the first matching selector and reads its text in one step.
pub(crate) async fn read_first_text<S: BrowserSession>(
    session: &mut S,
    selectors: &[&str],
) -> Result<Option<String>, ScrapeError> {
    match session.find(selectors).await? {
        Some(element) => Ok(Some(session.read_text(&element).await?)),
        None => Ok(None),
    }
}
