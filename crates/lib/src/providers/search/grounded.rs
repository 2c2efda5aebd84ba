//! Search backed by a model with a web-search grounding tool.
//!
//! The model is asked to run the query and answer with JSON only; the answer is
//! parsed locally into [`SearchResult`] records.

use super::{SearchProvider, MAX_SEARCH_RESULTS};
use crate::{
    errors::AuditError,
    prompts::SEARCH_EXECUTOR_SYSTEM_PROMPT,
    providers::ai::AiProvider,
    response::extract_json_block,
    types::SearchResult,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchPayload {
    Wrapped {
        #[serde(default)]
        results: Vec<SearchResult>,
    },
    Bare(Vec<SearchResult>),
}

#[derive(Debug, Clone)]
pub struct GroundedSearchProvider {
    provider: Box<dyn AiProvider>,
}

impl GroundedSearchProvider {
    /// `provider` should have its search grounding enabled
    /// (e.g. `GeminiProvider::with_google_search`).
    pub fn new(provider: Box<dyn AiProvider>) -> Self {
        Self { provider }
    }
}

/// Parses the executor's JSON answer, keeping at most [`MAX_SEARCH_RESULTS`].
pub fn parse_search_response(response: &str) -> Result<Vec<SearchResult>, String> {
    let json = extract_json_block(response).map_err(|e| e.to_string())?;
    let payload: SearchPayload =
        serde_json::from_str(json).map_err(|e| format!("unparseable search results: {e}"))?;
    let mut results = match payload {
        SearchPayload::Wrapped { results } => results,
        SearchPayload::Bare(results) => results,
    };
    results.retain(|r| !r.url.trim().is_empty() || !r.title.trim().is_empty());
    results.truncate(MAX_SEARCH_RESULTS);
    Ok(results)
}

#[async_trait]
impl SearchProvider for GroundedSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AuditError> {
        info!("[search] Running grounded search for: '{query}'");
        let response = self
            .provider
            .generate(SEARCH_EXECUTOR_SYSTEM_PROMPT, query)
            .await
            .map_err(|e| AuditError::SearchFailed {
                query: query.to_string(),
                detail: e.to_string(),
            })?;
        debug!("<-- Search executor response: {}", response);

        let results = parse_search_response(&response).map_err(|detail| {
            AuditError::SearchFailed {
                query: query.to_string(),
                detail,
            }
        })?;
        info!("[search] {} results for '{query}'.", results.len());
        Ok(results)
    }
}
