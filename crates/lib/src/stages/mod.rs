//! # Pipeline Stages
//!
//! Each stage reads what it needs from the shared [`StateStore`], makes a bounded
//! number of tool calls, asks its model for a result and commits exactly one
//! artifact under its output key. A stage that returns `Ok` has committed.

pub mod optimization_advisor;
pub mod page_auditor;
pub mod serp_analyst;

pub use optimization_advisor::{
    missing_report_sections, OptimizationAdvisor, ReportFile, REPORT_SECTIONS,
};
pub use page_auditor::PageAuditor;
pub use serp_analyst::SerpAnalyst;

use crate::{
    errors::{AuditError, StageName},
    prompts::VALIDATION_RETRY_SUFFIX,
    providers::ai::AiProvider,
    response::extract_json_block,
    state::{Message, StateStore},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, warn};

/// What a stage hands back to the coordinator after committing its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput {
    /// The text appended to the conversation under the stage's name.
    pub text: String,
}

#[async_trait]
pub trait Stage: Send + Sync + Debug {
    fn name(&self) -> StageName;

    /// The state key this stage commits before returning `Ok`.
    fn output_key(&self) -> &'static str;

    /// Runs the stage. `input` is the user message for the first stage and the
    /// previous stage's message afterwards.
    async fn run(
        &self,
        state: &mut StateStore,
        input: &Message,
    ) -> Result<StageOutput, AuditError>;
}

/// Calls the model and parses its answer into `T`, running `check` on the parsed value.
///
/// `check` may repair the value in place (sentinels, normalization) before it
/// rejects it. A rejected answer is re-prompted with the validation error until
/// `attempts` calls have been made; the last error is returned as
/// [`AuditError::ValidationFailed`].
pub(crate) async fn generate_validated<T, F>(
    provider: &dyn AiProvider,
    stage: StageName,
    system_prompt: &str,
    user_prompt: &str,
    attempts: usize,
    mut check: F,
) -> Result<T, AuditError>
where
    T: DeserializeOwned,
    F: FnMut(&mut T) -> Result<(), String>,
{
    let attempts = attempts.max(1);
    let mut prompt = user_prompt.to_string();
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        let response = provider.generate(system_prompt, &prompt).await?;
        debug!("<-- {stage} response (attempt {attempt}): {response}");

        match parse_and_check(&response, &mut check) {
            Ok(value) => return Ok(value),
            Err(detail) => {
                warn!("[{stage}] Rejected response on attempt {attempt}/{attempts}: {detail}");
                prompt = format!(
                    "{user_prompt}{}",
                    VALIDATION_RETRY_SUFFIX.replace("{error}", &detail)
                );
                last_error = detail;
            }
        }
    }

    Err(AuditError::validation(stage, last_error))
}

fn parse_and_check<T, F>(response: &str, check: &mut F) -> Result<T, String>
where
    T: DeserializeOwned,
    F: FnMut(&mut T) -> Result<(), String>,
{
    let json = extract_json_block(response).map_err(|e| e.to_string())?;
    let mut value: T = serde_json::from_str(json).map_err(|e| e.to_string())?;
    check(&mut value)?;
    Ok(value)
}
