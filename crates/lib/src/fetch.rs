//! # Content Fetching Port
//!
//! The page-audit stage needs the raw signals of one page. How they are obtained
//! (HTTP client, extraction strategy) lives in the `seo-audit-web` crate; this
//! module only defines the contract and the text block handed to the model.

use crate::{errors::AuditError, types::HeadingItem};
use async_trait::async_trait;
use std::fmt::{Debug, Write};

/// Signals extracted from a single fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedContent {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub word_count: usize,
    /// The first N characters of the markup-free text.
    pub preview: String,
    pub headings: Vec<HeadingItem>,
    pub internal_links: usize,
    pub external_links: usize,
}

impl ScrapedContent {
    /// Renders the signals as the formatted text block Stage 1 reasons over.
    pub fn to_prompt_block(&self) -> String {
        let mut block = format!(
            "**SCRAPED CONTENT FOR: {}**\n\n**Title:** {}\n\n**Meta Description:** {}\n\n**Word Count:** {}\n\n",
            self.url, self.title, self.meta_description, self.word_count
        );

        block.push_str("**Headings:**\n");
        if self.headings.is_empty() {
            block.push_str("- none found\n");
        }
        for heading in &self.headings {
            let _ = writeln!(block, "- {}: {}", heading.tag, heading.text);
        }

        let _ = write!(
            block,
            "\n**Links:** {} internal, {} external\n\n**Content Preview:** {}...\n\n**Status:** Successfully scraped",
            self.internal_links, self.external_links, self.preview
        );
        block
    }
}

/// The text Stage 1 receives in place of scraped content when the fetch fails.
pub fn describe_fetch_failure(url: &str, error: &AuditError) -> String {
    match error {
        AuditError::FetchFailed { detail, .. } => format!("Error scraping {url}: {detail}"),
        other => format!("Error scraping {url}: {other}"),
    }
}

/// Performs one best-effort fetch of a page.
#[async_trait]
pub trait ContentFetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<ScrapedContent, AuditError>;
}
