//! Scripted in-memory session for extractor and orchestrator tests.

use std::collections::{HashMap, HashSet};

use crate::browser::BrowserSession;
use crate::error::ScrapeError;

/// Fake [`BrowserSession`] backed by canned page content.
///
/// Pages map a URL to `(selector, text)` pairs; `find` walks the fallback
/// list against the page most recently navigated to. Call counters let tests
/// assert exactly how much browser work a pass performed.
#[derive(Default)]
pub(crate) struct ScriptedSession {
    pages: HashMap<String, Vec<(String, String)>>,
    timeout_urls: HashSet<String>,
    auth_failure: bool,
    current: Option<String>,
    pub goto_calls: usize,
    pub find_calls: usize,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` as the content of `selector` on `url`.
    pub fn insert_text(&mut self, url: &str, selector: &str, text: &str) {
        self.pages
            .entry(url.to_owned())
            .or_default()
            .push((selector.to_owned(), text.to_owned()));
    }

    /// Makes navigation to `url` fail with a timeout.
    pub fn fail_navigation(&mut self, url: &str) {
        self.timeout_urls.insert(url.to_owned());
    }

    /// Makes every navigation fail as a dead-session problem.
    pub fn fail_authentication(&mut self) {
        self.auth_failure = true;
    }
}

impl BrowserSession for ScriptedSession {
    // The canned text itself; read_text just clones it.
    type Element = String;

    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.goto_calls += 1;
        if self.auth_failure {
            return Err(ScrapeError::Authentication {
                reason: "session expired".to_owned(),
            });
        }
        if self.timeout_urls.contains(url) {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: 30,
            });
        }
        self.current = Some(url.to_owned());
        Ok(())
    }

    async fn find(&mut self, selectors: &[&str]) -> Result<Option<String>, ScrapeError> {
        self.find_calls += 1;
        let Some(current) = &self.current else {
            return Ok(None);
        };
        let Some(entries) = self.pages.get(current) else {
            return Ok(None);
        };
        for selector in selectors {
            if let Some((_, text)) = entries.iter().find(|(s, _)| s == selector) {
                return Ok(Some(text.clone()));
            }
        }
        Ok(None)
    }

    async fn read_text(&mut self, element: &String) -> Result<String, ScrapeError> {
        Ok(element.clone())
    }
}
