//! # Audit Pipeline Coordinator
//!
//! Drives one audit run: resolve the caller's session, build a fresh state store
//! for the target URL, run the stages strictly in order and hand back the final
//! report. Runs for different users proceed concurrently; runs for the same user
//! serialize on that user's session lock.

use crate::{
    constants::{state_keys, DEFAULT_VALIDATION_ATTEMPTS},
    errors::AuditError,
    fetch::ContentFetcher,
    persist::ReportPersister,
    providers::{ai::AiProvider, search::SearchProvider},
    session::{SessionKey, SessionRegistry},
    stages::{OptimizationAdvisor, PageAuditor, ReportFile, SerpAnalyst, Stage},
    state::{Message, StateStore},
    types::{PageAuditOutput, SerpAnalysis},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub run_id: Uuid,
    /// The final stage's markdown report, as shown to the user.
    pub report: String,
    pub page_audit: PageAuditOutput,
    pub serp_analysis: SerpAnalysis,
    /// Where the report was saved, if the save succeeded.
    pub saved_to: Option<PathBuf>,
    /// Why the save failed, if it did.
    pub save_error: Option<String>,
}

#[derive(Debug)]
pub struct SeoAuditPipeline {
    stages: Vec<Box<dyn Stage>>,
    sessions: SessionRegistry,
}

impl SeoAuditPipeline {
    pub fn builder() -> SeoAuditPipelineBuilder {
        SeoAuditPipelineBuilder::new()
    }

    /// Creates a pipeline from an ordered list of stages.
    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Runs a full audit and returns the final report text.
    ///
    /// Failures never escape: any error comes back as `"Error during audit: ..."`.
    pub async fn run(&self, user_id: &str, url: &str) -> String {
        match self.audit(user_id, url).await {
            Ok(outcome) => outcome.report,
            Err(e) => {
                error!("Audit of {url} failed: {e}");
                format!("Error during audit: {e}")
            }
        }
    }

    /// Runs a full audit and returns every artifact it produced.
    pub async fn audit(&self, user_id: &str, url: &str) -> Result<AuditOutcome, AuditError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("audit_run", %run_id, user_id, url);
        self.audit_inner(run_id, user_id, url).instrument(span).await
    }

    async fn audit_inner(
        &self,
        run_id: Uuid,
        user_id: &str,
        url: &str,
    ) -> Result<AuditOutcome, AuditError> {
        if self.stages.is_empty() {
            return Err(AuditError::Configuration(
                "the pipeline has no stages".to_string(),
            ));
        }

        let key = SessionKey::for_user(user_id);
        let session = self
            .sessions
            .get_or_create(&key, || StateStore::for_target(url))
            .await;
        let mut session = session.lock().await;
        info!(
            "Starting audit run #{} in session '{}'.",
            session.runs + 1,
            key.session_id
        );

        let mut state = StateStore::for_target(url);
        let mut message = Message::user(format!("Please audit this URL: {url}"));
        state.push_message(message.clone())?;

        for stage in &self.stages {
            info!("--> Running {}", stage.name());
            let output = stage.run(&mut state, &message).await?;
            if !state.contains(stage.output_key()) {
                return Err(AuditError::State(format!(
                    "{} finished without committing '{}'",
                    stage.name(),
                    stage.output_key()
                )));
            }
            message = Message::model(stage.name().as_str(), output.text);
            state.push_message(message.clone())?;
        }

        let page_audit = state.get(state_keys::PAGE_AUDIT)?;
        let serp_analysis = state.get(state_keys::SERP_ANALYSIS)?;
        let report_file: ReportFile = state.get(state_keys::REPORT_FILE)?;
        session.state = state;
        session.runs += 1;

        info!("Audit run complete.");
        Ok(AuditOutcome {
            run_id,
            report: message.text,
            page_audit,
            serp_analysis,
            saved_to: report_file.path.map(PathBuf::from),
            save_error: report_file.error,
        })
    }
}

/// Assembles the standard three-stage pipeline.
///
/// A per-stage provider overrides the default one set with [`Self::ai_provider`].
#[derive(Debug, Default)]
pub struct SeoAuditPipelineBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    page_auditor_provider: Option<Box<dyn AiProvider>>,
    serp_analyst_provider: Option<Box<dyn AiProvider>>,
    optimization_advisor_provider: Option<Box<dyn AiProvider>>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    search: Option<Arc<dyn SearchProvider>>,
    persister: Option<Arc<dyn ReportPersister>>,
    validation_attempts: Option<usize>,
}

impl SeoAuditPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider used by every stage without its own.
    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    pub fn page_auditor_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.page_auditor_provider = Some(provider);
        self
    }

    pub fn serp_analyst_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.serp_analyst_provider = Some(provider);
        self
    }

    pub fn optimization_advisor_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.optimization_advisor_provider = Some(provider);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn search_provider(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn persister(mut self, persister: Arc<dyn ReportPersister>) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Total model calls a structured stage may make before it fails. Defaults to 1.
    pub fn validation_attempts(mut self, attempts: usize) -> Self {
        self.validation_attempts = Some(attempts);
        self
    }

    pub fn build(self) -> Result<SeoAuditPipeline, AuditError> {
        let missing = |what: &str| AuditError::Configuration(format!("{what} is not set"));
        let provider_for = |own: Option<Box<dyn AiProvider>>, stage: &str| {
            own.or_else(|| self.ai_provider.clone())
                .ok_or_else(|| missing(&format!("the AI provider for {stage}")))
        };

        let attempts = self
            .validation_attempts
            .unwrap_or(DEFAULT_VALIDATION_ATTEMPTS)
            .max(1);
        let page_auditor = PageAuditor::new(
            provider_for(self.page_auditor_provider.clone(), "PageAuditorAgent")?,
            self.fetcher.clone().ok_or_else(|| missing("the content fetcher"))?,
            attempts,
        );
        let serp_analyst = SerpAnalyst::new(
            provider_for(self.serp_analyst_provider.clone(), "SerpAnalystAgent")?,
            self.search.clone().ok_or_else(|| missing("the search provider"))?,
            attempts,
        );
        let optimization_advisor = OptimizationAdvisor::new(
            provider_for(
                self.optimization_advisor_provider.clone(),
                "OptimizationAdvisorAgent",
            )?,
            self.persister.clone().ok_or_else(|| missing("the report persister"))?,
        );

        Ok(SeoAuditPipeline::from_stages(vec![
            Box::new(page_auditor),
            Box::new(serp_analyst),
            Box::new(optimization_advisor),
        ]))
    }
}
