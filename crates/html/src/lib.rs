//! # seo-audit-html: Page Signal Extraction
//!
//! Turns the raw HTML of one page into the signals an on-page audit needs:
//! title, meta description, visible text statistics, headings and link counts.
//!
//! Extraction is a strategy behind [`PageExtractor`]. [`RegexExtractor`] is the
//! lightweight default; [`DomExtractor`] parses the document with `scraper` and
//! copes better with malformed or unusual markup.

mod dom;
mod regex_extractor;

pub use dom::DomExtractor;
pub use regex_extractor::RegexExtractor;

use std::fmt::Debug;
use thiserror::Error;
use url::Url;

/// Reported when the page has no `<title>`.
pub const NO_TITLE: &str = "No title found";
/// Reported when the page has no `<meta name="description">`.
pub const NO_META_DESCRIPTION: &str = "No meta description found";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid page URL '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Invalid CSS selector '{selector}': {detail}")]
    Selector { selector: String, detail: String },
}

/// Bounds applied while extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Characters of visible text kept in [`PageSignals::preview`].
    pub preview_chars: usize,
    /// Headings kept, in reading order.
    pub max_headings: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preview_chars: 1000,
            max_headings: 50,
        }
    }
}

/// A heading found on the page. `level` is 1 to 4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub title: String,
    pub meta_description: String,
    /// Visible text with markup removed and whitespace collapsed.
    pub text: String,
    pub word_count: usize,
    pub preview: String,
    pub headings: Vec<Heading>,
    pub internal_links: usize,
    pub external_links: usize,
}

/// Extracts [`PageSignals`] from a fetched page.
pub trait PageExtractor: Send + Sync + Debug {
    /// `page_url` is the URL the HTML was fetched from; relative links resolve against it.
    fn extract(&self, page_url: &str, html: &str) -> Result<PageSignals, ExtractError>;
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `chars` characters of `text`, never splitting a character.
pub fn preview(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkKind {
    Internal,
    External,
}

pub(crate) fn parse_page_url(page_url: &str) -> Result<Url, ExtractError> {
    Url::parse(page_url).map_err(|source| ExtractError::InvalidPageUrl {
        url: page_url.to_string(),
        source,
    })
}

/// Classifies an anchor `href` against the page it appears on.
///
/// Fragments and non-http(s) targets (`mailto:`, `tel:`, `javascript:`) are not links.
pub(crate) fn classify_link(base: &Url, href: &str) -> Option<LinkKind> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let target = base.join(href).ok()?;
    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    let same_host = match (target.host_str(), base.host_str()) {
        (Some(target), Some(base)) => strip_www(target) == strip_www(base),
        _ => false,
    };
    Some(if same_host {
        LinkKind::Internal
    } else {
        LinkKind::External
    })
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Tallies `hrefs` into `(internal, external)` counts.
pub(crate) fn count_links<'a>(
    base: &Url,
    hrefs: impl IntoIterator<Item = &'a str>,
) -> (usize, usize) {
    hrefs
        .into_iter()
        .filter_map(|href| classify_link(base, href))
        .fold((0, 0), |(internal, external), kind| match kind {
            LinkKind::Internal => (internal + 1, external),
            LinkKind::External => (internal, external + 1),
        })
}
