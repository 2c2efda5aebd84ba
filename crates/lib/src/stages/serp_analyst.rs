//! Stage 2: search the primary keyword once and analyze the competitive landscape.

use super::{generate_validated, Stage, StageOutput};
use crate::{
    constants::{state_keys, NOT_AVAILABLE},
    errors::{AuditError, StageName},
    prompts::{SERP_ANALYST_SYSTEM_PROMPT, SERP_ANALYST_USER_PROMPT},
    providers::{
        ai::AiProvider,
        search::{SearchProvider, MAX_SEARCH_RESULTS},
    },
    state::{Message, StateStore},
    types::{normalize_serp_results, PageAuditOutput, SearchResult, SerpAnalysis},
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const SEARCH_TOOL: &str = "perform_google_search";

#[derive(Debug, Clone)]
pub struct SerpAnalyst {
    provider: Box<dyn AiProvider>,
    search: Arc<dyn SearchProvider>,
    validation_attempts: usize,
}

impl SerpAnalyst {
    pub fn new(
        provider: Box<dyn AiProvider>,
        search: Arc<dyn SearchProvider>,
        validation_attempts: usize,
    ) -> Self {
        Self {
            provider,
            search,
            validation_attempts,
        }
    }
}

/// Renders the raw results as the numbered JSON list the analyst reads.
fn render_search_results(results: &[SearchResult]) -> String {
    let ranked: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            json!({
                "position": i + 1,
                "title": r.title,
                "url": r.url,
                "snippet": r.snippet,
            })
        })
        .collect();
    serde_json::to_string_pretty(&ranked).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl Stage for SerpAnalyst {
    fn name(&self) -> StageName {
        StageName::SerpAnalyst
    }

    fn output_key(&self) -> &'static str {
        state_keys::SERP_ANALYSIS
    }

    async fn run(
        &self,
        state: &mut StateStore,
        _input: &Message,
    ) -> Result<StageOutput, AuditError> {
        let page_audit: PageAuditOutput = state.get(state_keys::PAGE_AUDIT)?;
        let keyword = page_audit.target_keywords.primary_keyword.trim().to_string();
        if keyword.is_empty() || keyword == NOT_AVAILABLE {
            warn!("[{}] No usable primary keyword; searching for '{keyword}' anyway.", self.name());
        }

        let mut results = match self.search.search(&keyword).await {
            Ok(results) => results,
            Err(e) => {
                warn!("[{}] Search failed, analyzing without results: {e}", self.name());
                vec![]
            }
        };
        results.truncate(MAX_SEARCH_RESULTS);
        info!("[{}] {} search results for '{keyword}'.", self.name(), results.len());

        let rendered = render_search_results(&results);
        state.push_message(Message::tool(SEARCH_TOOL, rendered.clone()))?;

        let user_prompt = SERP_ANALYST_USER_PROMPT
            .replace("{primary_keyword}", &keyword)
            .replace("{search_results}", &rendered);

        let analysis: SerpAnalysis = generate_validated(
            self.provider.as_ref(),
            self.name(),
            SERP_ANALYST_SYSTEM_PROMPT,
            &user_prompt,
            self.validation_attempts,
            |analysis: &mut SerpAnalysis| {
                if analysis.primary_keyword.trim().is_empty() {
                    analysis.primary_keyword = keyword.clone();
                }
                let top = std::mem::take(&mut analysis.top_10_results);
                analysis.top_10_results = normalize_serp_results(&keyword, top);
                analysis.validate()
            },
        )
        .await?;

        let placeholders = analysis.placeholder_count();
        if placeholders > 0 {
            warn!(
                "[{}] Padded the competitor list with {placeholders} placeholder entries.",
                self.name()
            );
        }
        state.put(self.output_key(), &analysis)?;

        let text = serde_json::to_string_pretty(&analysis)
            .map_err(|e| AuditError::State(format!("cannot render SERP analysis: {e}")))?;
        Ok(StageOutput { text })
    }
}
