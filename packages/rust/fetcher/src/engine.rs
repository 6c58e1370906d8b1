//! Single-document fetcher for URL-based tools.
//!
//! One GET per call: browser-like headers, bounded redirects, optional
//! deadline, status and body-length checks, then HTML cleaning.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::{debug, info, instrument, warn};
use url::Url;

use playground_shared::{DocumentLimits, FetchConfig, FetchedDocument, PlaygroundError, Result};

use crate::clean::clean_html;
use crate::guard::{PublicResolver, is_blocked_target};

/// Fetches and cleans remote documents.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    config: FetchConfig,
    client: Client,
}

impl DocumentFetcher {
    /// Create a fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("accept", &config.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("accept_language", &config.accept_language)?,
        );

        let block_private = config.block_private_hosts;
        let max_redirects = config.max_redirects;
        let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                attempt.error("too many redirects")
            } else if block_private && is_blocked_target(attempt.url()) {
                attempt.error("redirect to a private or non-HTTP address")
            } else {
                attempt.follow()
            }
        });

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect_policy);
        if block_private {
            builder = builder.dns_resolver(Arc::new(PublicResolver));
        }

        let client = builder
            .build()
            .map_err(|e| PlaygroundError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Fetch `url` and reduce it to a [`FetchedDocument`] within `limits`.
    #[instrument(skip_all, fields(url = %url, max_chars = limits.max_chars))]
    pub async fn fetch(&self, url: &Url, limits: &DocumentLimits) -> Result<FetchedDocument> {
        if self.config.block_private_hosts && is_blocked_target(url) {
            warn!("SSRF protection: blocked");
            return Err(PlaygroundError::fetch(format!(
                "refusing to fetch private or non-HTTP address {url}"
            )));
        }

        debug!("fetching document");

        let mut request = self.client.get(url.as_str());
        if let Some(timeout) = limits.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, limits.timeout))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "document fetch returned non-success status");
            return Err(PlaygroundError::http_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&e, limits.timeout))?;

        let body_chars = body.chars().count();
        if body_chars < self.config.min_body_chars {
            warn!(body_chars, "document body too short");
            return Err(PlaygroundError::fetch("Page content is too short or empty"));
        }

        let page = clean_html(&body, limits.max_chars);

        info!(
            status = status.as_u16(),
            raw_chars = body_chars,
            text_chars = page.text.chars().count(),
            "document fetched"
        );

        Ok(FetchedDocument {
            source_url: url.clone(),
            status: status.as_u16(),
            title: page.title,
            body_text: page.text,
            fetched_at: Utc::now(),
        })
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| PlaygroundError::config(format!("invalid fetch.{field} header: {e}")))
}

/// Map a transport-level failure to a fetch error.
fn transport_error(err: &reqwest::Error, timeout: Option<Duration>) -> PlaygroundError {
    if err.is_timeout() {
        match timeout {
            Some(t) => PlaygroundError::fetch(format!("request timed out after {t:?}")),
            None => PlaygroundError::fetch("request timed out"),
        }
    } else if err.is_redirect() {
        PlaygroundError::fetch(format!("redirect rejected: {err}"))
    } else {
        PlaygroundError::fetch(format!("request failed: {err}"))
    }
}
