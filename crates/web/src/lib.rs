//! # seo-audit-web: Page Fetching
//!
//! The HTTP side of the page audit: one GET with a browser-like user agent and a
//! bounded timeout, with the body handed to a [`PageExtractor`]. Implements the
//! `seo_audit` [`ContentFetcher`] port.

use async_trait::async_trait;
use seo_audit::{
    constants::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PREVIEW_CHARS, DEFAULT_USER_AGENT},
    fetch::{ContentFetcher, ScrapedContent},
    types::{HeadingItem, HeadingTag},
    AuditError,
};
use seo_audit_html::{
    ExtractError, ExtractOptions, Heading, PageExtractor, PageSignals, RegexExtractor,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest slice of an error body quoted in a failure message.
const MAX_ERROR_BODY_CHARS: usize = 200;

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum WebFetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to extract page signals: {0}")]
    Extract(#[from] ExtractError),
}

impl WebFetchError {
    /// Tags the failure with the URL it happened on.
    pub fn into_audit_error(self, url: &str) -> AuditError {
        AuditError::FetchFailed {
            url: url.to_string(),
            detail: self.to_string(),
        }
    }
}

// --- Settings ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub preview_chars: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

// --- Fetcher ---

#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    client: reqwest::Client,
    extractor: Arc<dyn PageExtractor>,
}

impl HttpContentFetcher {
    /// Creates a fetcher using the [`RegexExtractor`].
    pub fn new(settings: &FetchSettings) -> Result<Self, WebFetchError> {
        let extractor = RegexExtractor::new(ExtractOptions {
            preview_chars: settings.preview_chars,
            ..Default::default()
        })?;
        Self::with_extractor(settings, Arc::new(extractor))
    }

    pub fn with_extractor(
        settings: &FetchSettings,
        extractor: Arc<dyn PageExtractor>,
    ) -> Result<Self, WebFetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(WebFetchError::ClientBuild)?;
        Ok(Self { client, extractor })
    }

    /// Fetches `url` once and extracts its signals.
    pub async fn fetch_signals(&self, url: &str) -> Result<PageSignals, WebFetchError> {
        info!("[fetch] GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebFetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }
        let html = response.text().await?;
        debug!("[fetch] {} bytes from {url}", html.len());
        Ok(self.extractor.extract(url, &html)?)
    }
}

fn heading_item(heading: Heading) -> Option<HeadingItem> {
    let tag = match heading.level {
        1 => HeadingTag::H1,
        2 => HeadingTag::H2,
        3 => HeadingTag::H3,
        4 => HeadingTag::H4,
        _ => return None,
    };
    Some(HeadingItem {
        tag,
        text: heading.text,
    })
}

/// Maps extracted signals onto the record the page auditor reads.
pub fn to_scraped_content(url: &str, signals: PageSignals) -> ScrapedContent {
    ScrapedContent {
        url: url.to_string(),
        title: signals.title,
        meta_description: signals.meta_description,
        word_count: signals.word_count,
        preview: signals.preview,
        headings: signals.headings.into_iter().filter_map(heading_item).collect(),
        internal_links: signals.internal_links,
        external_links: signals.external_links,
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Result<ScrapedContent, AuditError> {
        match self.fetch_signals(url).await {
            Ok(signals) => Ok(to_scraped_content(url, signals)),
            Err(e) => {
                warn!("[fetch] {url}: {e}");
                Err(e.into_audit_error(url))
            }
        }
    }
}
