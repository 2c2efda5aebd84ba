//! Stage 3: write the markdown report from the two structured artifacts and save it.

use super::{Stage, StageOutput};
use crate::{
    constants::state_keys,
    errors::{AuditError, StageName},
    persist::{save_confirmation, ReportPersister},
    prompts::{OPTIMIZATION_ADVISOR_SYSTEM_PROMPT, OPTIMIZATION_ADVISOR_USER_PROMPT},
    providers::ai::AiProvider,
    state::{Message, StateStore},
    types::{PageAuditOutput, SerpAnalysis},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const SAVE_TOOL: &str = "save_audit_report";

/// The section headings a complete report carries, in order.
pub const REPORT_SECTIONS: [&str; 6] = [
    "Executive Summary",
    "Technical & On-Page Findings",
    "Keyword Analysis",
    "Competitive SERP Analysis",
    "Prioritized Recommendations",
    "Next Steps",
];

/// Returns the [`REPORT_SECTIONS`] the report does not mention (case-insensitive).
pub fn missing_report_sections(report: &str) -> Vec<&'static str> {
    let lowered = report.to_lowercase();
    REPORT_SECTIONS
        .iter()
        .copied()
        .filter(|section| !lowered.contains(&section.to_lowercase()))
        .collect()
}

/// The outcome of the save attempt, committed under `report_file`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub path: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OptimizationAdvisor {
    provider: Box<dyn AiProvider>,
    persister: Arc<dyn ReportPersister>,
}

impl OptimizationAdvisor {
    pub fn new(provider: Box<dyn AiProvider>, persister: Arc<dyn ReportPersister>) -> Self {
        Self {
            provider,
            persister,
        }
    }
}

fn to_json<T: Serialize>(key: &str, value: &T) -> Result<String, AuditError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AuditError::State(format!("cannot render '{key}': {e}")))
}

#[async_trait]
impl Stage for OptimizationAdvisor {
    fn name(&self) -> StageName {
        StageName::OptimizationAdvisor
    }

    fn output_key(&self) -> &'static str {
        state_keys::REPORT_FILE
    }

    async fn run(
        &self,
        state: &mut StateStore,
        _input: &Message,
    ) -> Result<StageOutput, AuditError> {
        let page_audit: PageAuditOutput = state.get(state_keys::PAGE_AUDIT)?;
        let serp_analysis: SerpAnalysis = state.get(state_keys::SERP_ANALYSIS)?;
        let target_url = state
            .target_url()
            .map(str::to_string)
            .ok_or_else(|| AuditError::State("target_url is not in shared state".to_string()))?;

        let user_prompt = OPTIMIZATION_ADVISOR_USER_PROMPT
            .replace("{target_url}", &target_url)
            .replace("{page_audit}", &to_json(state_keys::PAGE_AUDIT, &page_audit)?)
            .replace(
                "{serp_analysis}",
                &to_json(state_keys::SERP_ANALYSIS, &serp_analysis)?,
            );

        let report = self
            .provider
            .generate(OPTIMIZATION_ADVISOR_SYSTEM_PROMPT, &user_prompt)
            .await?;
        let report = report.trim().to_string();
        if report.is_empty() {
            return Err(AuditError::validation(self.name(), "the report is empty"));
        }

        let missing = missing_report_sections(&report);
        if !missing.is_empty() {
            warn!("[{}] Report is missing sections: {}", self.name(), missing.join(", "));
        }

        let saved = self.persister.persist(&target_url, &report).await;
        let confirmation = save_confirmation(&saved);
        info!("[{}] {confirmation}", self.name());
        state.push_message(Message::tool(SAVE_TOOL, confirmation))?;

        let record = match saved {
            Ok(path) => ReportFile {
                path: Some(path.display().to_string()),
                error: None,
            },
            Err(e) => ReportFile {
                path: None,
                error: Some(e.to_string()),
            },
        };
        state.put(self.output_key(), &record)?;

        Ok(StageOutput { text: report })
    }
}
