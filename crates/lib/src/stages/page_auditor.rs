//! Stage 1: fetch the target page once and turn it into a [`PageAuditOutput`].

use super::{generate_validated, Stage, StageOutput};
use crate::{
    constants::state_keys,
    errors::{AuditError, PromptError, StageName},
    fetch::{describe_fetch_failure, ContentFetcher},
    prompts::{PAGE_AUDITOR_SYSTEM_PROMPT, PAGE_AUDITOR_USER_PROMPT},
    providers::ai::AiProvider,
    state::{Message, StateStore},
    types::PageAuditOutput,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};

/// The tool name recorded in the conversation for the fetch call.
const FETCH_TOOL: &str = "simple_web_scraper";

#[derive(Debug, Clone)]
pub struct PageAuditor {
    provider: Box<dyn AiProvider>,
    fetcher: Arc<dyn ContentFetcher>,
    validation_attempts: usize,
}

impl PageAuditor {
    pub fn new(
        provider: Box<dyn AiProvider>,
        fetcher: Arc<dyn ContentFetcher>,
        validation_attempts: usize,
    ) -> Self {
        Self {
            provider,
            fetcher,
            validation_attempts,
        }
    }
}

/// Finds the first http(s) URL in a free-text message. Used only when the
/// state carries no `target_url`.
pub fn extract_url(text: &str) -> Result<Option<String>, PromptError> {
    let re = Regex::new(r#"https?://[^\s<>"']+"#)?;
    Ok(re.find(text).map(|m| {
        m.as_str()
            .trim_end_matches(&['.', ',', ';', ':', ')', ']', '!', '?'][..])
            .to_string()
    }))
}

#[async_trait]
impl Stage for PageAuditor {
    fn name(&self) -> StageName {
        StageName::PageAuditor
    }

    fn output_key(&self) -> &'static str {
        state_keys::PAGE_AUDIT
    }

    async fn run(
        &self,
        state: &mut StateStore,
        input: &Message,
    ) -> Result<StageOutput, AuditError> {
        let url = match state.target_url() {
            Some(url) => url.to_string(),
            None => extract_url(&input.text)?
                .ok_or_else(|| AuditError::State("no URL to audit".to_string()))?,
        };
        info!("[{}] Auditing page: {url}", self.name());

        let scraped = match self.fetcher.fetch(&url).await {
            Ok(content) => content.to_prompt_block(),
            Err(e) => {
                warn!("[{}] Fetch failed, continuing without page data: {e}", self.name());
                describe_fetch_failure(&url, &e)
            }
        };
        state.push_message(Message::tool(FETCH_TOOL, scraped.clone()))?;

        let user_prompt = PAGE_AUDITOR_USER_PROMPT
            .replace("{request}", &input.text)
            .replace("{scraped_content}", &scraped);

        let audit: PageAuditOutput = generate_validated(
            self.provider.as_ref(),
            self.name(),
            PAGE_AUDITOR_SYSTEM_PROMPT,
            &user_prompt,
            self.validation_attempts,
            |audit: &mut PageAuditOutput| {
                audit.fill_sentinels();
                audit.validate()
            },
        )
        .await?;

        info!(
            "[{}] Primary keyword: '{}'",
            self.name(),
            audit.target_keywords.primary_keyword
        );
        state.put(self.output_key(), &audit)?;

        let text = serde_json::to_string_pretty(&audit)
            .map_err(|e| AuditError::State(format!("cannot render page audit: {e}")))?;
        Ok(StageOutput { text })
    }
}
