use async_trait::async_trait;
use seo_audit::errors::{AuditError, PromptError};
use seo_audit::fetch::{ContentFetcher, ScrapedContent};
use seo_audit::persist::ReportPersister;
use seo_audit::providers::ai::AiProvider;
use seo_audit::providers::search::SearchProvider;
use seo_audit::stages::REPORT_SECTIONS;
use seo_audit::types::{HeadingItem, HeadingTag, SearchResult};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Unique substrings of each stage's system prompt, for [`MockAiProvider::add_response`].
pub const PAGE_AUDITOR_KEY: &str = "on-page SEO auditor";
pub const SERP_ANALYST_KEY: &str = "SERP analyst";
pub const OPTIMIZATION_ADVISOR_KEY: &str = "senior SEO strategist";
pub const SEARCH_EXECUTOR_KEY: &str = "search executor";

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, VecDeque<String>>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        self.add_responses(key, &[response]);
    }

    /// Pre-programs successive responses for one prompt. The last one repeats.
    pub fn add_responses(&self, key: &str, responses: &[&str]) {
        let mut programmed = self.responses.lock().unwrap();
        programmed.insert(
            key.to_string(),
            responses.iter().map(|r| r.to_string()).collect(),
        );
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose system prompt contains `key`.
    pub fn calls_for(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(system, _)| system.contains(key))
            .count()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let mut responses = self.responses.lock().unwrap();
        for (key, queue) in responses.iter_mut() {
            if system_prompt.contains(key.as_str()) {
                let response = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                if let Some(response) = response {
                    return Ok(response);
                }
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
        )))
    }
}

// --- Mock Content Fetcher ---

#[derive(Clone, Debug)]
pub struct MockFetcher {
    result: Result<ScrapedContent, String>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn ok(content: ScrapedContent) -> Self {
        Self {
            result: Ok(content),
            urls: Arc::default(),
        }
    }

    /// Every fetch fails with `detail`.
    pub fn failing(detail: &str) -> Self {
        Self {
            result: Err(detail.to_string()),
            urls: Arc::default(),
        }
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<ScrapedContent, AuditError> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.result {
            Ok(content) => Ok(ScrapedContent {
                url: url.to_string(),
                ..content.clone()
            }),
            Err(detail) => Err(AuditError::FetchFailed {
                url: url.to_string(),
                detail: detail.clone(),
            }),
        }
    }
}

// --- Mock Search Provider ---

#[derive(Clone, Debug)]
pub struct MockSearchProvider {
    result: Result<Vec<SearchResult>, String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearchProvider {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            result: Ok(results),
            queries: Arc::default(),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            result: Err(detail.to_string()),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AuditError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone().map_err(|detail| AuditError::SearchFailed {
            query: query.to_string(),
            detail,
        })
    }
}

// --- Mock Persisters ---

/// Keeps reports in memory and reports a fake path for each.
#[derive(Clone, Debug, Default)]
pub struct RecordingPersister {
    saved: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingPersister {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(url, content)` pairs saved so far.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportPersister for RecordingPersister {
    async fn persist(&self, url: &str, content: &str) -> Result<PathBuf, AuditError> {
        let mut saved = self.saved.lock().unwrap();
        saved.push((url.to_string(), content.to_string()));
        Ok(PathBuf::from(format!("memory/report_{}.md", saved.len())))
    }
}

/// A persister whose every write fails.
#[derive(Clone, Debug, Default)]
pub struct FailingPersister {
    attempts: Arc<Mutex<usize>>,
}

impl FailingPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ReportPersister for FailingPersister {
    async fn persist(&self, _url: &str, _content: &str) -> Result<PathBuf, AuditError> {
        *self.attempts.lock().unwrap() += 1;
        Err(AuditError::PersistFailed("disk is read-only".to_string()))
    }
}

// --- Fixtures ---

/// A scraped page with every signal populated.
pub fn sample_content(url: &str) -> ScrapedContent {
    ScrapedContent {
        url: url.to_string(),
        title: "Handmade Ceramic Mugs | Clayworks".to_string(),
        meta_description: "Shop handmade ceramic mugs, glazed and fired in small batches."
            .to_string(),
        word_count: 420,
        preview: "Handmade ceramic mugs glazed in small batches".to_string(),
        headings: vec![
            HeadingItem {
                tag: HeadingTag::H1,
                text: "Handmade Ceramic Mugs".to_string(),
            },
            HeadingItem {
                tag: HeadingTag::H2,
                text: "Care instructions".to_string(),
            },
        ],
        internal_links: 12,
        external_links: 3,
    }
}

/// A valid page-audit response with the given primary keyword.
pub fn page_audit_json(primary_keyword: &str) -> String {
    json!({
        "audit_results": {
            "title_tag": "Handmade Ceramic Mugs | Clayworks",
            "meta_description": "Shop handmade ceramic mugs, glazed and fired in small batches.",
            "primary_heading": "Handmade Ceramic Mugs",
            "secondary_headings": [{"tag": "h2", "text": "Care instructions"}],
            "word_count": 420,
            "content_summary": "A product category page for handmade mugs.",
            "link_counts": {"internal": 12, "external": 3, "broken": null, "notes": "Healthy internal linking"},
            "technical_findings": ["Meta description is under 160 characters"],
            "content_opportunities": ["Add an FAQ section"]
        },
        "target_keywords": {
            "primary_keyword": primary_keyword,
            "secondary_keywords": ["ceramic coffee mug", "pottery mug"],
            "search_intent": "transactional",
            "supporting_topics": ["glazes", "dishwasher safety"]
        }
    })
    .to_string()
}

/// A SERP-analysis response listing `count` real-looking competitors.
pub fn serp_json(keyword: &str, count: usize) -> String {
    let results: Vec<_> = (1..=count)
        .map(|rank| {
            json!({
                "rank": rank,
                "title": format!("Competitor {rank} - {keyword}"),
                "url": format!("https://competitor{rank}.example.org/{}", keyword.replace(' ', "-")),
                "snippet": format!("Snippet for competitor {rank}."),
                "content_type": "Product page"
            })
        })
        .collect();
    json!({
        "primary_keyword": keyword,
        "top_10_results": results,
        "title_patterns": ["Handmade", "Best"],
        "content_formats": ["Product page", "Listicle"],
        "people_also_ask": ["Are ceramic mugs microwave safe?"],
        "key_themes": ["craftsmanship"],
        "differentiation_opportunities": ["Show the firing process"]
    })
    .to_string()
}

/// `count` raw search results.
pub fn search_results(count: usize) -> Vec<SearchResult> {
    (1..=count)
        .map(|i| SearchResult {
            title: format!("Result {i}"),
            url: format!("https://result{i}.example.org"),
            snippet: format!("Snippet {i}"),
        })
        .collect()
}

/// A report containing every expected section.
pub fn report_markdown() -> String {
    let mut report = String::from("# SEO Audit Report\n\n");
    for section in REPORT_SECTIONS {
        report.push_str(&format!("## {section}\n\nDetails for {section}.\n\n"));
    }
    report
}
