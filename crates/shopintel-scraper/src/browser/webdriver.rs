//! W3C WebDriver wire-protocol binding of [`BrowserSession`].
//!
//! Speaks plain HTTP against a local chromedriver/geckodriver or a Selenium
//! grid. Dashboard logins are expected to live in the browser profile the
//! endpoint launches with; this client only navigates and reads.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::browser::BrowserSession;
use crate::error::ScrapeError;

/// W3C element identifier key in `find elements` responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Debug, Deserialize)]
struct WdEnvelope<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct WdNewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct WdErrorValue {
    error: String,
    message: String,
}

/// One exclusively-owned WebDriver session.
#[derive(Debug)]
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
    nav_timeout_secs: u64,
}

impl WebDriverSession {
    /// Creates a fresh session against `base_url` with the given page-load
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Authentication`] when the endpoint is
    /// unreachable or refuses to create a session — a dead endpoint
    /// invalidates the whole batch, not a single metric.
    pub async fn connect(base_url: &str, nav_timeout_secs: u64) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            // Slightly above the page-load timeout so WebDriver's own timeout
            // error reaches us instead of a raw transport cut-off.
            .timeout(Duration::from_secs(nav_timeout_secs.saturating_add(5)))
            .build()
            .map_err(|e| ScrapeError::Authentication {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let base_url = base_url.trim_end_matches('/').to_owned();
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "timeouts": { "pageLoad": nav_timeout_secs * 1000 }
                }
            }
        });

        let response = client
            .post(format!("{base_url}/session"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScrapeError::Authentication {
                reason: format!("webdriver endpoint unreachable: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<WdEnvelope<WdErrorValue>>()
                .await
                .map(|e| format!("{}: {}", e.value.error, e.value.message))
                .unwrap_or_else(|_| "no error detail".to_owned());
            return Err(ScrapeError::Authentication {
                reason: format!("session rejected with HTTP {status}: {detail}"),
            });
        }

        let session = response
            .json::<WdEnvelope<WdNewSession>>()
            .await
            .map_err(|e| ScrapeError::Authentication {
                reason: format!("malformed new-session response: {e}"),
            })?;

        Ok(Self {
            client,
            base_url,
            session_id: session.value.session_id,
            nav_timeout_secs,
        })
    }

    /// Deletes the remote session. Best effort; the endpoint reaps orphaned
    /// sessions on its own timeout anyway.
    pub async fn close(self) -> Result<(), ScrapeError> {
        self.client
            .delete(self.command_url(""))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ScrapeError::Protocol {
                context: "delete session".to_owned(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn command_url(&self, suffix: &str) -> String {
        format!("{}/session/{}{suffix}", self.base_url, self.session_id)
    }

    /// Decodes a WebDriver response, mapping protocol-level errors.
    async fn decode(
        response: reqwest::Response,
        context: &str,
    ) -> Result<serde_json::Value, ScrapeError> {
        let status = response.status();
        let body: serde_json::Value = response.json().await?;

        if status.is_success() {
            return Ok(body);
        }

        let error = body
            .pointer("/value/error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");
        let message = body
            .pointer("/value/message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");

        Err(ScrapeError::Protocol {
            context: context.to_owned(),
            reason: format!("{error}: {message}"),
        })
    }
}

impl BrowserSession for WebDriverSession {
    type Element = String;

    async fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        let response = self
            .client
            .post(self.command_url("/url"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::NavigationTimeout {
                        url: url.to_owned(),
                        timeout_secs: self.nav_timeout_secs,
                    }
                } else {
                    ScrapeError::Http(e)
                }
            })?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if status.is_success() {
            return Ok(());
        }

        let error = body
            .pointer("/value/error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");

        if error == "timeout" {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_owned(),
                timeout_secs: self.nav_timeout_secs,
            });
        }

        let message = body
            .pointer("/value/message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        Err(ScrapeError::Protocol {
            context: format!("navigate to {url}"),
            reason: format!("{error}: {message}"),
        })
    }

    async fn find(&mut self, selectors: &[&str]) -> Result<Option<String>, ScrapeError> {
        for selector in selectors {
            let response = self
                .client
                .post(self.command_url("/elements"))
                .json(&json!({ "using": "css selector", "value": selector }))
                .send()
                .await?;

            let body = Self::decode(response, "find elements").await?;
            let first_id = body
                .pointer("/value")
                .and_then(serde_json::Value::as_array)
                .and_then(|elements| elements.first())
                .and_then(|element| element.get(ELEMENT_KEY))
                .and_then(serde_json::Value::as_str);

            if let Some(id) = first_id {
                return Ok(Some(id.to_owned()));
            }
        }

        Ok(None)
    }

    async fn read_text(&mut self, element: &String) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(self.command_url(&format!("/element/{element}/text")))
            .send()
            .await?;

        let body = Self::decode(response, "read element text").await?;
        let text = body
            .pointer("/value")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ScrapeError::Protocol {
                context: "read element text".to_owned(),
                reason: "value is not a string".to_owned(),
            })?;

        Ok(text.to_owned())
    }
}

#[cfg(test)]
#[path = "webdriver_test.rs"]
mod tests;
