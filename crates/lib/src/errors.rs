use std::fmt;
use thiserror::Error;

/// Errors raised while talking to a hosted language model.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// The stage a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    PageAuditor,
    SerpAnalyst,
    OptimizationAdvisor,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::PageAuditor => "PageAuditorAgent",
            StageName::SerpAnalyst => "SerpAnalystAgent",
            StageName::OptimizationAdvisor => "OptimizationAdvisorAgent",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of an [`AuditError`], for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchFailed,
    ValidationFailed,
    SearchFailed,
    PersistFailed,
    ModelFailed,
    StateFailed,
    ConfigurationFailed,
}

/// The tagged error type of the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to fetch {url}: {detail}")]
    FetchFailed { url: String, detail: String },
    #[error("{stage} output failed schema validation: {detail}")]
    ValidationFailed { stage: StageName, detail: String },
    #[error("Search failed for '{query}': {detail}")]
    SearchFailed { query: String, detail: String },
    #[error("Failed to save report: {0}")]
    PersistFailed(String),
    #[error("Model call failed: {0}")]
    Model(#[from] PromptError),
    #[error("Shared state error: {0}")]
    State(String),
    #[error("Pipeline is misconfigured: {0}")]
    Configuration(String),
}

impl AuditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuditError::FetchFailed { .. } => ErrorKind::FetchFailed,
            AuditError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            AuditError::SearchFailed { .. } => ErrorKind::SearchFailed,
            AuditError::PersistFailed(_) => ErrorKind::PersistFailed,
            AuditError::Model(_) => ErrorKind::ModelFailed,
            AuditError::State(_) => ErrorKind::StateFailed,
            AuditError::Configuration(_) => ErrorKind::ConfigurationFailed,
        }
    }

    pub(crate) fn validation(stage: StageName, detail: impl Into<String>) -> Self {
        AuditError::ValidationFailed {
            stage,
            detail: detail.into(),
        }
    }
}
